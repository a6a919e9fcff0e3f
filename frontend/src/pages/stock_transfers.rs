use dioxus::prelude::*;
use fintra_client::{
  api::{
    customers::Account,
    equities::search_equities,
    orders::positive_decimal,
    transfers::{
      external_to_portfolio, other_institutions, portfolio_to_external, portfolio_to_portfolio,
      ExternalToPortfolio, PortfolioToExternal, PortfolioTransfer,
    },
  },
  ApiError, Dispatcher, ValidationError,
};

use crate::{
  components::{
    account_picker::AccountPicker,
    toast::{use_notifier, AlertBanner},
  },
  utils::state::AppState,
};

const EQUITY_LIST_SIZE: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
enum TransferMode {
  Internal,
  Outgoing,
  Incoming,
}

impl TransferMode {
  const ALL: [TransferMode; 3] = [TransferMode::Internal, TransferMode::Outgoing, TransferMode::Incoming];

  fn title(&self) -> &'static str {
    match self {
      Self::Internal => "Portfolio to portfolio",
      Self::Outgoing => "To another institution",
      Self::Incoming => "From another institution",
    }
  }
}

/// Everything the three transfer forms collect, kept as typed.
#[derive(Debug, Clone, Default, PartialEq)]
struct TransferForm {
  from: Option<Account>,
  to: Option<Account>,
  equity_id: Option<u32>,
  quantity: String,
  institution_id: Option<u32>,
  tax_id: String,
  avg_cost: String,
}

impl TransferForm {
  fn quantity(&self) -> Result<u32, ValidationError> {
    self.quantity.trim().parse::<u32>().ok().filter(|q| *q > 0).ok_or(ValidationError::InvalidQuantity)
  }

  fn equity(&self) -> Result<u32, ValidationError> {
    self.equity_id.ok_or(ValidationError::Missing("a stock"))
  }

  fn institution(&self) -> Result<u32, ValidationError> {
    self.institution_id.ok_or(ValidationError::Missing("an institution"))
  }

  fn tax_id(&self) -> Result<u64, ValidationError> {
    self.tax_id.trim().parse().map_err(|_| ValidationError::Missing("an identity or tax number"))
  }

  fn account(account: &Option<Account>, what: &'static str) -> Result<u32, ValidationError> {
    account.as_ref().map(|a| a.account_id).ok_or(ValidationError::Missing(what))
  }
}

async fn send(dispatcher: &Dispatcher, mode: TransferMode, form: &TransferForm) -> Result<(), ApiError> {
  match mode {
    TransferMode::Internal => {
      let transfer = PortfolioTransfer {
        from_account_id: TransferForm::account(&form.from, "a source account")?,
        to_account_id: TransferForm::account(&form.to, "a target account")?,
        equity_id: form.equity()?,
        transfer_quantity: form.quantity()?,
      };
      portfolio_to_portfolio(dispatcher, &transfer).await
    },
    TransferMode::Outgoing => {
      let transfer = PortfolioToExternal {
        from_account_id: TransferForm::account(&form.from, "a source account")?,
        equity_id: form.equity()?,
        transfer_quantity: form.quantity()?,
        other_institution_id: form.institution()?,
        tax_id: form.tax_id()?,
      };
      portfolio_to_external(dispatcher, &transfer).await
    },
    TransferMode::Incoming => {
      let transfer = ExternalToPortfolio {
        to_account_id: TransferForm::account(&form.to, "a target account")?,
        equity_id: form.equity()?,
        other_institution_id: form.institution()?,
        transfer_quantity: form.quantity()?,
        tax_id: form.tax_id()?,
        avg_cost: positive_decimal(&form.avg_cost).ok_or(ValidationError::InvalidPrice)?,
      };
      external_to_portfolio(dispatcher, &transfer).await
    },
  }
}

#[component]
pub fn StockTransfers() -> Element {
  let app = use_context::<AppState>();
  let notifier = use_notifier();
  let mut mode = use_signal(|| TransferMode::Internal);
  let mut form = use_signal(TransferForm::default);
  let mut sending = use_signal(|| false);

  let institutions = use_resource({
    let dispatcher = app.dispatcher.clone();
    move || {
      let dispatcher = dispatcher.clone();
      async move {
        match other_institutions(&dispatcher).await {
          Ok(list) => list,
          Err(e) => {
            notifier.failure(&e, "Could not load institutions");
            vec![]
          }
        }
      }
    }
  });

  // incoming stock is not held yet, so any listed equity may be picked
  let equities = use_resource({
    let dispatcher = app.dispatcher.clone();
    move || {
      let dispatcher = dispatcher.clone();
      async move { search_equities(&dispatcher, "", EQUITY_LIST_SIZE, None).await.unwrap_or_default() }
    }
  });

  let submit = move |evt: FormEvent| {
    evt.prevent_default();
    let dispatcher = app.dispatcher.clone();
    let current = mode();
    let body = form();
    spawn(async move {
      sending.set(true);
      match send(&dispatcher, current, &body).await {
        Ok(()) => {
          notifier.success("Transfer completed");
          form.with_mut(|f| {
            f.quantity.clear();
            f.avg_cost.clear();
          });
        },
        Err(e) => notifier.failure(&e, "Transfer failed"),
      }
      sending.set(false);
    });
  };

  let current = mode();
  let snapshot = form();
  // outgoing transfers can only move what the source account holds
  let choices: Vec<(u32, String)> = match current {
    TransferMode::Incoming => equities()
      .unwrap_or_default()
      .into_iter()
      .map(|e| (e.equity_id, e.asset_code))
      .collect(),
    _ => snapshot.from
      .as_ref()
      .map(|a| a.equities.iter().map(|h| (h.equity_id, format!("{} ({})", h.asset_code, h.total_quantity))).collect())
      .unwrap_or_default(),
  };
  let institution_list = institutions().unwrap_or_default();
  let needs_source = current != TransferMode::Incoming;
  let needs_target = current != TransferMode::Outgoing;
  let external = current != TransferMode::Internal;

  rsx! {
    h1 { "Stock Transfers" },
    AlertBanner { notifier },
    div {
      class: "toggle-group",
      for m in TransferMode::ALL {
        button {
          key: "{m:?}",
          class: if m == current { "button active" } else { "button" },
          onclick: move |_| {
            mode.set(m);
            form.with_mut(|f| {
              // pickers that stay mounted keep their selection
              if m == TransferMode::Incoming { f.from = None; }
              if m == TransferMode::Outgoing { f.to = None; }
              *f = TransferForm { from: f.from.take(), to: f.to.take(), ..TransferForm::default() };
            });
          },
          {m.title()}
        }
      }
    },
    section {
      class: "card",
      form {
        onsubmit: submit,
        if needs_source {
          AccountPicker {
            label: "From",
            on_change: move |a: Option<Account>| {
              let mut f = form.write();
              f.from = a;
              f.equity_id = None;
            }
          }
        },
        if needs_target {
          AccountPicker {
            label: "To",
            on_change: move |a: Option<Account>| form.write().to = a
          }
        },
        div {
          class: "form-group",
          label { class: "form-label", "Stock" },
          select {
            class: "form-input",
            onchange: move |evt| form.write().equity_id = evt.value().parse().ok(),
            option { value: "", selected: snapshot.equity_id.is_none(), "Select a stock" },
            for (id, label) in choices {
              option { key: "{id}", value: "{id}", selected: snapshot.equity_id == Some(id), "{label}" }
            }
          }
        },
        div {
          class: "form-group",
          label { class: "form-label", "Quantity" },
          input {
            class: "form-input",
            r#type: "number",
            min: "1",
            value: "{snapshot.quantity}",
            oninput: move |evt| form.write().quantity = evt.value()
          }
        },
        if external {
          div {
            class: "form-group",
            label { class: "form-label", "Institution" },
            select {
              class: "form-input",
              onchange: move |evt| form.write().institution_id = evt.value().parse().ok(),
              option { value: "", selected: snapshot.institution_id.is_none(), "Select an institution" },
              for inst in institution_list {
                option { key: "{inst.id}", value: "{inst.id}", selected: snapshot.institution_id == Some(inst.id), "{inst.name}" }
              }
            }
          },
          div {
            class: "form-group",
            label { class: "form-label", "Identity / tax number" },
            input {
              class: "form-input",
              inputmode: "numeric",
              value: "{snapshot.tax_id}",
              oninput: move |evt| form.write().tax_id = evt.value()
            }
          }
        },
        if current == TransferMode::Incoming {
          div {
            class: "form-group",
            label { class: "form-label", "Average cost" },
            input {
              class: "form-input",
              r#type: "number",
              step: "0.01",
              value: "{snapshot.avg_cost}",
              oninput: move |evt| form.write().avg_cost = evt.value()
            }
          }
        },
        button {
          r#type: "submit",
          class: "button button-primary",
          disabled: sending(),
          "Transfer"
        }
      }
    }
  }
}
