use dioxus::prelude::*;
use fintra_client::api::customers::{
  create_account, create_customer, customer_accounts, delete_account, get_customer, update_customer,
  Account, Customer, CustomerForm, CORPORATE, INDIVIDUAL,
};

use crate::{
  components::{
    customer_search::CustomerSearch,
    toast::{use_notifier, AlertBanner, Notifier},
  },
  utils::state::AppState,
};

const PERMISSIONS: [(&str, &str); 2] = [("FULL", "Full"), ("PARTICIPATION_ONLY", "Participation Only")];

#[derive(Debug, Clone, PartialEq)]
enum Editor {
  Closed,
  New,
  Edit(u32),
}

#[component]
pub fn Customers() -> Element {
  let app = use_context::<AppState>();
  let notifier = use_notifier();
  let mut selected: Signal<Option<Customer>> = use_signal(|| None);
  let mut accounts: Signal<Vec<Account>> = use_signal(Vec::new);
  let mut editor = use_signal(|| Editor::Closed);
  let mut new_account_type = use_signal(|| INDIVIDUAL.to_string());

  // reloads the selected customer and its accounts after any mutation
  let refresh = use_callback({
    let dispatcher = app.dispatcher.clone();
    move |customer_id: u32| {
      let dispatcher = dispatcher.clone();
      spawn(async move {
        match get_customer(&dispatcher, customer_id).await {
          Ok(customer) => selected.set(Some(customer)),
          Err(e) => notifier.failure(&e, "Could not load customer"),
        }
        match customer_accounts(&dispatcher, customer_id).await {
          Ok(list) => accounts.set(list),
          Err(e) => notifier.failure(&e, "Could not load accounts"),
        }
      });
    }
  });

  let add_account = {
    let dispatcher = app.dispatcher.clone();
    move |_: MouseEvent| {
      let Some(customer_id) = selected.peek().as_ref().map(|c| c.customer_id) else { return };
      let dispatcher = dispatcher.clone();
      spawn(async move {
        match create_account(&dispatcher, customer_id, &new_account_type()).await {
          Ok(_) => {
            notifier.success("Account created");
            refresh.call(customer_id);
          },
          Err(e) => notifier.failure(&e, "Failed to create account"),
        }
      });
    }
  };

  let remove_account = EventHandler::new({
    let dispatcher = app.dispatcher.clone();
    move |account_id: u32| {
      let Some(customer_id) = selected.peek().as_ref().map(|c| c.customer_id) else { return };
      let dispatcher = dispatcher.clone();
      spawn(async move {
        match delete_account(&dispatcher, account_id).await {
          Ok(()) => {
            notifier.success("Account deleted");
            refresh.call(customer_id);
          },
          Err(e) => notifier.failure(&e, "Failed to delete account"),
        }
      });
    }
  });

  let customer = selected();

  rsx! {
    div {
      class: "page-header",
      h1 { "Customers" },
      button {
        class: "button button-primary",
        onclick: move |_| editor.set(Editor::New),
        "New customer"
      }
    },
    AlertBanner { notifier },
    CustomerSearch {
      label: "Search customer",
      on_select: move |c: Customer| {
        editor.set(Editor::Closed);
        refresh.call(c.customer_id);
      }
    },
    if editor() != Editor::Closed {
      CustomerEditor {
        editor: editor(),
        current: customer.clone(),
        notifier,
        on_saved: move |saved: Customer| {
          editor.set(Editor::Closed);
          refresh.call(saved.customer_id);
        },
        on_cancel: move |_| editor.set(Editor::Closed)
      }
    },
    {customer.map(|c| {
      let id = c.customer_id;
      let name = c.full_name();
      let permission = c.trading_permission.clone().unwrap_or_default();
      let trading = if c.trading_enabled { "enabled" } else { "disabled" };
      rsx! {
        section {
          class: "card",
          div {
            class: "card-header",
            h2 { "{name}" },
            button { class: "button", onclick: move |_| editor.set(Editor::Edit(id)), "Edit" }
          },
          dl {
            class: "details",
            dt { "Email" }, dd { "{c.email}" },
            dt { "Identity / tax number" }, dd { "{c.identity_number}" },
            dt { "Trading permission" }, dd { "{permission}" },
            dt { "Trading" }, dd { "{trading}" }
          },
          h3 { "Accounts" },
          table {
            class: "table",
            thead {
              tr { th { "Account" }, th { "Type" }, th { "Free cash" }, th { "Blocked cash" }, th { "Holdings" }, th {} }
            },
            tbody {
              for account in accounts() {
                AccountRow { key: "{account.account_id}", account, on_delete: remove_account }
              }
            }
          },
          div {
            class: "form-inline",
            select {
              class: "form-input",
              value: "{new_account_type}",
              onchange: move |evt| new_account_type.set(evt.value()),
              option { value: INDIVIDUAL, "Individual" },
              option { value: CORPORATE, "Corporate" }
            },
            button { class: "button", onclick: add_account, "Open account" }
          }
        }
      }
    })}
  }
}

#[component]
fn AccountRow(account: Account, on_delete: EventHandler<u32>) -> Element {
  let id = account.account_id;
  let (free, blocked) = account.cash_balance
    .as_ref()
    .map(|b| (b.free_balance.to_string(), b.blocked_balance.to_string()))
    .unwrap_or_default();
  let holdings = account.equities.len();
  rsx! {
    tr {
      td { "{id}" },
      td { "{account.account_type}" },
      td { "{free}" },
      td { "{blocked}" },
      td { "{holdings}" },
      td {
        button { class: "button button-danger", onclick: move |_| on_delete.call(id), "Delete" }
      }
    }
  }
}

fn form_from(customer: Option<&Customer>) -> CustomerForm {
  match customer {
    Some(c) => CustomerForm {
      first_name: c.first_name.clone(),
      last_name: c.last_name.clone(),
      email: c.email.clone(),
      identity_number: c.identity_number.clone(),
      trading_permission: c.trading_permission.clone().unwrap_or_else(|| "FULL".to_string()),
      trading_enabled: Some(c.trading_enabled),
      ..CustomerForm::default()
    },
    None => CustomerForm {
      trading_permission: "FULL".to_string(),
      account_type: Some(INDIVIDUAL.to_string()),
      ..CustomerForm::default()
    },
  }
}

#[component]
fn CustomerEditor(
  editor: Editor,
  current: Option<Customer>,
  notifier: Notifier,
  on_saved: EventHandler<Customer>,
  on_cancel: EventHandler<()>,
) -> Element {
  let app = use_context::<AppState>();
  let editing = match editor {
    Editor::Edit(id) => Some(id),
    _ => None,
  };
  let mut form = use_signal(CustomerForm::default);
  use_effect(use_reactive((&editing, &current), move |(editing, current)| {
    form.set(form_from(current.as_ref().filter(|_| editing.is_some())));
  }));
  let fields = form();
  let corporate = fields.account_type.as_deref() == Some(CORPORATE);

  let save = move |evt: FormEvent| {
    evt.prevent_default();
    let dispatcher = app.dispatcher.clone();
    let mut body = form();
    if body.account_type.as_deref() == Some(CORPORATE) {
      body.last_name = "-".to_string();
    }
    spawn(async move {
      let result = match editing {
        Some(id) => update_customer(&dispatcher, id, &body).await,
        None => create_customer(&dispatcher, &body).await,
      };
      match result {
        Ok(saved) => {
          notifier.success(if editing.is_some() { "Customer updated" } else { "Customer created" });
          on_saved.call(saved);
        },
        Err(e) => notifier.failure(&e, "Failed to save customer"),
      }
    });
  };

  rsx! {
    section {
      class: "card",
      h2 { if editing.is_some() { "Edit customer" } else { "New customer" } },
      form {
        onsubmit: save,
        if editing.is_none() {
          div {
            class: "form-group",
            label { class: "form-label", "Customer type" },
            select {
              class: "form-input",
              onchange: move |evt| form.write().account_type = Some(evt.value()),
              option { value: INDIVIDUAL, "Individual" },
              option { value: CORPORATE, "Corporate" }
            }
          }
        },
        div {
          class: "form-group",
          label { class: "form-label", if corporate { "Company name" } else { "First name" } },
          input {
            class: "form-input",
            value: "{fields.first_name}",
            oninput: move |evt| form.write().first_name = evt.value()
          }
        },
        if !corporate {
          div {
            class: "form-group",
            label { class: "form-label", "Last name" },
            input {
              class: "form-input",
              value: "{fields.last_name}",
              oninput: move |evt| form.write().last_name = evt.value()
            }
          }
        },
        div {
          class: "form-group",
          label { class: "form-label", "Email" },
          input {
            class: "form-input",
            r#type: "email",
            value: "{fields.email}",
            oninput: move |evt| form.write().email = evt.value()
          }
        },
        div {
          class: "form-group",
          label { class: "form-label", if corporate { "Tax number" } else { "Identity number" } },
          input {
            class: "form-input",
            inputmode: "numeric",
            value: "{fields.identity_number}",
            oninput: move |evt| form.write().identity_number = evt.value()
          }
        },
        div {
          class: "form-group",
          label { class: "form-label", "Trading permission" },
          select {
            class: "form-input",
            value: "{fields.trading_permission}",
            onchange: move |evt| form.write().trading_permission = evt.value(),
            for (value, label) in PERMISSIONS {
              option { key: "{value}", value, "{label}" }
            }
          }
        },
        div {
          class: "form-actions",
          button { r#type: "submit", class: "button button-primary", "Save" },
          button { r#type: "button", class: "button", onclick: move |_| on_cancel.call(()), "Cancel" }
        }
      }
    }
  }
}
