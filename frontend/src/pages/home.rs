use dioxus::prelude::*;
use fintra_client::api::{
  equities::{equity_info, equity_prices, search_equities, EquityInfo, EquityPrice},
  system_date::system_date,
};

use crate::{
  components::toast::{use_notifier, AlertBanner},
  utils::state::AppState,
};

const EQUITY_PAGE: u32 = 1000;
const HISTORY_ROWS: usize = 30;

#[component]
pub fn HomePage() -> Element {
  let app = use_context::<AppState>();
  let notifier = use_notifier();
  let name = app.session().current().display_name();
  let mut selected: Signal<Option<String>> = use_signal(|| None);
  let mut history: Signal<Vec<EquityPrice>> = use_signal(Vec::new);
  let mut info: Signal<Option<EquityInfo>> = use_signal(|| None);

  let business_date = use_resource({
    let dispatcher = app.dispatcher.clone();
    move || {
      let dispatcher = dispatcher.clone();
      async move { system_date(&dispatcher).await.ok() }
    }
  });

  let equities = use_resource({
    let dispatcher = app.dispatcher.clone();
    move || {
      let dispatcher = dispatcher.clone();
      async move {
        match search_equities(&dispatcher, "", EQUITY_PAGE, None).await {
          Ok(list) => list,
          Err(e) => {
            notifier.failure(&e, "Could not load stock definitions");
            vec![]
          }
        }
      }
    }
  });

  let show_details = EventHandler::new(move |asset_code: String| {
    let dispatcher = app.dispatcher.clone();
    selected.set(Some(asset_code.clone()));
    info.set(None);
    spawn(async move {
      match equity_info(&dispatcher, &asset_code).await {
        Ok(details) => info.set(Some(details)),
        Err(e) => notifier.failure(&e, "Could not load stock details"),
      }
      match equity_prices(&dispatcher, &asset_code).await {
        Ok(mut prices) => {
          prices.sort_by(|a, b| b.data_date.cmp(&a.data_date));
          prices.truncate(HISTORY_ROWS);
          history.set(prices);
        },
        Err(e) => {
          history.set(vec![]);
          notifier.failure(&e, "Could not load prices");
        }
      }
    });
  });

  let date_label = match business_date() {
    Some(Some(date)) => date.format("%d.%m.%Y").to_string(),
    Some(None) => "unavailable".to_string(),
    None => "...".to_string(),
  };

  rsx! {
    section {
      class: "home-hero",
      h1 { "Welcome, {name}" },
      p { class: "home-date", "Business date: {date_label}" }
    },
    AlertBanner { notifier },
    section {
      class: "card",
      h2 { "Stock definitions" },
      {match equities() {
        None => rsx! { p { "Loading..." } },
        Some(list) => rsx! {
          table {
            class: "table",
            thead {
              tr {
                th { "Code" },
                th { "Name" },
                th { "Market" },
                th { "Close" },
                th { "Change %" },
                th {}
              }
            },
            tbody {
              for equity in list {
                EquityRow { key: "{equity.equity_id}", equity, on_details: show_details }
              }
            }
          }
        }
      }}
    },
    {selected().map(|code| rsx! {
      section {
        class: "card",
        h2 { "{code}" },
        {info().map(|i| {
          let name = i.equity_name.unwrap_or_default();
          let market = i.market.unwrap_or_default();
          let country = i.country.unwrap_or_default();
          let participation = if i.participation { "Yes" } else { "No" };
          rsx! {
            dl {
              class: "details",
              dt { "Name" }, dd { "{name}" },
              dt { "Market" }, dd { "{market}" },
              dt { "Country" }, dd { "{country}" },
              dt { "Participation index" }, dd { "{participation}" }
            }
          }
        })},
        h3 { "Closing prices" },
        table {
          class: "table",
          thead {
            tr {
              th { "Date" },
              th { "Open" },
              th { "High" },
              th { "Low" },
              th { "Close" }
            }
          },
          tbody {
            for price in history() {
              PriceRow { key: "{price.data_date:?}", price }
            }
          }
        }
      }
    })}
  }
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
  value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

#[component]
fn EquityRow(equity: EquityPrice, on_details: EventHandler<String>) -> Element {
  let change = equity.change_pct();
  let trend = match change {
    Some(c) if c.is_sign_negative() => "price-ask",
    Some(_) => "price-bid",
    None => "",
  };
  let code = equity.asset_code.clone();
  let name = equity.equity_name.clone().unwrap_or_default();
  let market = equity.market.clone().unwrap_or_default();
  let close = or_dash(equity.close_price);
  let change = or_dash(change.map(|c| c.round_dp(2)));
  let selected_code = code.clone();

  rsx! {
    tr {
      td { "{code}" },
      td { "{name}" },
      td { "{market}" },
      td { "{close}" },
      td { class: trend, "{change}" },
      td {
        button {
          class: "button",
          onclick: move |_| on_details.call(selected_code.clone()),
          "Details"
        }
      }
    }
  }
}

#[component]
fn PriceRow(price: EquityPrice) -> Element {
  let date = or_dash(price.data_date);
  rsx! {
    tr {
      td { "{date}" },
      td { {or_dash(price.open_price)} },
      td { {or_dash(price.high_price)} },
      td { {or_dash(price.low_price)} },
      td { {or_dash(price.close_price)} }
    }
  }
}
