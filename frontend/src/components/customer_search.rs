use std::rc::Rc;
use dioxus::{logger::tracing::warn, prelude::*};
use fintra_client::{
  api::customers::{search_customers, Customer},
  Supersede,
};

use crate::utils::state::AppState;

const MIN_QUERY_LEN: usize = 2;
const RESULT_LIMIT: u32 = 10;

/// Type-ahead customer lookup. Each keystroke supersedes the search before it,
/// so only the latest query can fill the result list.
#[component]
pub fn CustomerSearch(label: String, on_select: EventHandler<Customer>) -> Element {
  let app = use_context::<AppState>();
  let supersede = use_hook(|| Rc::new(Supersede::new()));
  let mut results: Signal<Vec<Customer>> = use_signal(Vec::new);
  let mut query = use_signal(String::new);

  let on_input = {
    let supersede = supersede.clone();
    move |evt: FormEvent| {
      let text = evt.value();
      query.set(text.clone());
      if text.trim().chars().count() < MIN_QUERY_LEN {
        supersede.cancel();
        results.set(vec![]);
        return;
      }
      let token = supersede.begin();
      let dispatcher = app.dispatcher.clone();
      spawn(async move {
        match search_customers(&dispatcher, text.trim(), RESULT_LIMIT, Some(&token)).await {
          Ok(found) => results.set(found),
          Err(e) if e.is_cancelled() => {},
          Err(e) => warn!("customer search failed: {}", e),
        }
      });
    }
  };

  rsx! {
    div {
      class: "form-group customer-search",
      label { class: "form-label", "{label}" },
      input {
        class: "form-input",
        r#type: "search",
        placeholder: "Name, email or identity number",
        value: "{query}",
        oninput: on_input
      },
      if !results.read().is_empty() {
        ul {
          class: "search-results",
          for customer in results() {
            li {
              key: "{customer.customer_id}",
              onclick: {
                let customer = customer.clone();
                let supersede = supersede.clone();
                move |_| {
                  supersede.cancel();
                  query.set(customer.full_name());
                  results.set(vec![]);
                  on_select.call(customer.clone());
                }
              },
              span { class: "result-name", {customer.full_name()} },
              span { class: "result-meta", {customer.identity_number.clone()} }
            }
          }
        }
      }
    }
  }
}
