use dioxus::prelude::*;
use fintra_client::api::{
  customers::Account,
  reports::{portfolio_report, PortfolioHolding, PortfolioReport},
};

use crate::{
  components::{
    account_picker::AccountPicker,
    toast::{use_notifier, AlertBanner},
  },
  utils::{browser::download_csv, state::AppState},
};

fn or_dash<T: ToString>(value: Option<T>) -> String {
  value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

#[component]
pub fn Reports() -> Element {
  let app = use_context::<AppState>();
  let notifier = use_notifier();
  let mut report: Signal<Option<PortfolioReport>> = use_signal(|| None);
  let mut loading = use_signal(|| false);

  let load = move |account: Option<Account>| {
    report.set(None);
    let Some(account) = account else { return };
    let dispatcher = app.dispatcher.clone();
    spawn(async move {
      loading.set(true);
      match portfolio_report(&dispatcher, account.account_id).await {
        Ok(r) => report.set(Some(r)),
        Err(e) => notifier.failure(&e, "Could not load the portfolio report"),
      }
      loading.set(false);
    });
  };

  rsx! {
    h1 { "Portfolio Report" },
    AlertBanner { notifier },
    section {
      class: "card",
      AccountPicker { label: "Account", on_change: load }
    },
    if loading() {
      p { "Loading..." }
    },
    {report().map(|r| rsx! { ReportView { report: r } })}
  }
}

#[component]
fn ReportView(report: PortfolioReport) -> Element {
  let owner = report.user_full_name.clone().unwrap_or_default();
  let account_type = report.account_type.clone().unwrap_or_default();
  let pnl = or_dash(report.total_unrealized_pnl);
  let pnl_pct = or_dash(report.total_unrealized_pnl_pct);
  let allocation = report.allocation();
  let exported = report.clone();

  rsx! {
    section {
      class: "card",
      div {
        class: "card-header",
        h2 { "{owner} / account {report.account_id} ({account_type})" },
        button {
          class: "button",
          onclick: move |_| download_csv(&format!("portfolio-{}.csv", exported.account_id), &exported.to_csv()),
          "Export CSV"
        }
      },
      dl {
        class: "details",
        dt { "Free cash" }, dd { "{report.free_cash}" },
        dt { "Blocked cash" }, dd { "{report.blocked_cash}" },
        dt { "Total cash" }, dd { "{report.total_cash}" },
        dt { "Holdings value" }, dd { "{report.holdings_value}" },
        dt { "Portfolio value" }, dd { "{report.portfolio_value}" },
        dt { "Unrealized P/L" }, dd { "{pnl} ({pnl_pct}%)" }
      },
      h3 { "Holdings" },
      table {
        class: "table",
        thead {
          tr {
            th { "Symbol" },
            th { "Free" },
            th { "Blocked" },
            th { "Total" },
            th { "Avg cost" },
            th { "Last close" },
            th { "Market value" },
            th { "P/L" },
            th { "P/L %" }
          }
        },
        tbody {
          for holding in report.holdings.clone() {
            HoldingRow { key: "{holding.equity_id}", holding }
          }
        }
      },
      if !allocation.is_empty() {
        h3 { "Allocation" },
        ul {
          class: "allocation",
          for (symbol, share) in allocation {
            li {
              key: "{symbol}",
              span { class: "result-name", "{symbol}" },
              div { class: "allocation-bar", style: "width: {share}%" },
              span { class: "result-meta", "{share}%" }
            }
          }
        }
      }
    }
  }
}

#[component]
fn HoldingRow(holding: PortfolioHolding) -> Element {
  let pnl_class = match holding.unrealized_pnl {
    Some(p) if p.is_sign_negative() => "price-ask",
    Some(_) => "price-bid",
    None => "",
  };
  rsx! {
    tr {
      td { "{holding.symbol}" },
      td { "{holding.free_qty}" },
      td { "{holding.blocked_qty}" },
      td { "{holding.total_qty}" },
      td { {or_dash(holding.avg_cost)} },
      td { {or_dash(holding.last_close_price)} },
      td { {or_dash(holding.market_value)} },
      td { class: pnl_class, {or_dash(holding.unrealized_pnl)} },
      td { class: pnl_class, {or_dash(holding.unrealized_pnl_pct)} }
    }
  }
}
