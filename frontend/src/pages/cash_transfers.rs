use dioxus::prelude::*;
use fintra_client::api::{
  cash::{deposit, transfer, withdraw, CashMovement, CashTransfer},
  customers::Account,
};

use crate::{
  components::{
    account_picker::AccountPicker,
    toast::{use_notifier, AlertBanner},
  },
  utils::state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum CashMode {
  Deposit,
  Withdraw,
  Transfer,
}

impl CashMode {
  const ALL: [CashMode; 3] = [CashMode::Deposit, CashMode::Withdraw, CashMode::Transfer];

  fn title(&self) -> &'static str {
    match self {
      Self::Deposit => "Deposit",
      Self::Withdraw => "Withdraw",
      Self::Transfer => "Transfer",
    }
  }
}

#[component]
pub fn CashTransfers() -> Element {
  let app = use_context::<AppState>();
  let notifier = use_notifier();
  let mut mode = use_signal(|| CashMode::Deposit);
  let mut source: Signal<Option<Account>> = use_signal(|| None);
  let mut target: Signal<Option<Account>> = use_signal(|| None);
  let mut amount = use_signal(String::new);
  let mut sending = use_signal(|| false);

  let submit = move |evt: FormEvent| {
    evt.prevent_default();
    let dispatcher = app.dispatcher.clone();
    let current = mode();
    let from = source.peek().as_ref().map(|a| a.account_id);
    let to = target.peek().as_ref().map(|a| a.account_id);
    let raw = amount();

    spawn(async move {
      sending.set(true);
      let result = match current {
        CashMode::Deposit | CashMode::Withdraw => match CashMovement::parse(from, &raw) {
          Ok(movement) if current == CashMode::Deposit => deposit(&dispatcher, &movement).await,
          Ok(movement) => withdraw(&dispatcher, &movement).await,
          Err(e) => Err(e.into()),
        },
        CashMode::Transfer => match CashTransfer::parse(from, to, &raw) {
          Ok(t) => transfer(&dispatcher, &t).await,
          Err(e) => Err(e.into()),
        },
      };
      match result {
        Ok(()) => {
          notifier.success(format!("{} completed", current.title()));
          amount.set(String::new());
        },
        Err(e) => notifier.failure(&e, &format!("{} failed", current.title())),
      }
      sending.set(false);
    });
  };

  let current = mode();
  let source_label = if current == CashMode::Transfer { "Sender" } else { "Account" };

  rsx! {
    h1 { "Cash Transfers" },
    AlertBanner { notifier },
    div {
      class: "toggle-group",
      for m in CashMode::ALL {
        button {
          key: "{m:?}",
          class: if m == current { "button active" } else { "button" },
          onclick: move |_| {
            mode.set(m);
            amount.set(String::new());
          },
          {m.title()}
        }
      }
    },
    section {
      class: "card",
      form {
        onsubmit: submit,
        AccountPicker {
          label: "{source_label}",
          on_change: move |a: Option<Account>| source.set(a)
        },
        if current == CashMode::Transfer {
          AccountPicker {
            label: "Receiver",
            on_change: move |a: Option<Account>| target.set(a)
          }
        },
        div {
          class: "form-group",
          label { class: "form-label", "Amount" },
          input {
            class: "form-input",
            r#type: "number",
            step: "0.01",
            min: "0",
            value: "{amount}",
            oninput: move |evt| amount.set(evt.value())
          }
        },
        button {
          r#type: "submit",
          class: "button button-primary",
          disabled: sending(),
          {current.title()}
        }
      }
    }
  }
}
