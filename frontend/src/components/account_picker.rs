use dioxus::prelude::*;
use fintra_client::api::customers::{Account, Customer};

use super::customer_search::CustomerSearch;

/// Customer lookup followed by a choice among that customer's accounts.
/// Emits `None` until both are chosen.
#[component]
pub fn AccountPicker(label: String, on_change: EventHandler<Option<Account>>) -> Element {
  let mut customer: Signal<Option<Customer>> = use_signal(|| None);
  let mut account_id: Signal<Option<u32>> = use_signal(|| None);

  let mut pick = move |id: Option<u32>| {
    account_id.set(id);
    let account = customer.peek().as_ref().zip(id).and_then(|(c, id)| c.account(id).cloned());
    on_change.call(account);
  };

  let accounts = customer().map(|c| c.accounts).unwrap_or_default();
  let selected = account_id();

  rsx! {
    fieldset {
      class: "account-picker",
      legend { "{label}" },
      CustomerSearch {
        label: "Customer",
        on_select: move |c: Customer| {
          let first = c.accounts.first().map(|a| a.account_id);
          customer.set(Some(c));
          pick(first);
        }
      },
      if customer.read().is_some() {
        div {
          class: "form-group",
          label { class: "form-label", "Account" },
          if accounts.is_empty() {
            p { class: "hint", "This customer has no accounts." }
          } else {
            select {
              class: "form-input",
              onchange: move |evt| pick(evt.value().parse().ok()),
              for a in accounts {
                option {
                  key: "{a.account_id}",
                  value: "{a.account_id}",
                  selected: selected == Some(a.account_id),
                  {format!("{} - {} ({})", a.account_id, a.account_type, a.free_cash())}
                }
              }
            }
          }
        }
      }
    }
  }
}
