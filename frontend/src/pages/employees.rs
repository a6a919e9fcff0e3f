use std::rc::Rc;
use dioxus::{logger::tracing::warn, prelude::*};
use fintra_client::{
  api::{
    customers::Customer,
    users::{
      assign_customers, create_employee, get_employee, search_employees, unassign_all_customers, unassign_customers,
      update_employee, Employee, EmployeePatch, NewEmployee,
    },
  },
  Role, Supersede,
};

use crate::{
  components::{
    customer_search::CustomerSearch,
    toast::{use_notifier, AlertBanner, Notifier},
  },
  utils::state::AppState,
};

const STAFF_PAGE: u32 = 50;
const ROLES: [(Role, &str); 3] = [(Role::Trader, "Trader"), (Role::Analyst, "Analyst"), (Role::Admin, "Admin")];

fn empty_employee() -> NewEmployee {
  NewEmployee {
    email: String::new(),
    password: String::new(),
    first_name: String::new(),
    last_name: String::new(),
    role: Role::Trader,
  }
}

#[component]
pub fn Employees() -> Element {
  let app = use_context::<AppState>();
  let notifier = use_notifier();
  let supersede = use_hook(|| Rc::new(Supersede::new()));
  let mut query = use_signal(String::new);
  let mut staff: Signal<Vec<Employee>> = use_signal(Vec::new);
  let mut creating = use_signal(|| false);
  let mut selected: Signal<Option<u32>> = use_signal(|| None);

  // every reload supersedes the one before it
  let reload = use_callback({
    let dispatcher = app.dispatcher.clone();
    move |search: String| {
      let token = supersede.begin();
      let dispatcher = dispatcher.clone();
      spawn(async move {
        match search_employees(&dispatcher, search.trim(), STAFF_PAGE, Some(&token)).await {
          Ok(found) => staff.set(found),
          Err(e) if e.is_cancelled() => {},
          Err(e) => notifier.failure(&e, "Could not load employees"),
        }
      });
    }
  });

  use_hook(move || reload.call(String::new()));

  let replace = EventHandler::new(move |updated: Employee| {
    staff.with_mut(|list| {
      if let Some(slot) = list.iter_mut().find(|e| e.id == updated.id) {
        *slot = updated;
      }
    });
  });

  let open = EventHandler::new(move |id: u32| selected.set(Some(id)));

  rsx! {
    div {
      class: "page-header",
      h1 { "Employees" },
      button {
        class: "button button-primary",
        onclick: move |_| creating.set(!creating()),
        if creating() { "Close" } else { "New employee" }
      }
    },
    AlertBanner { notifier },
    if creating() {
      EmployeeForm {
        notifier,
        on_created: move |_: Employee| {
          creating.set(false);
          reload.call(query());
        }
      }
    },
    {selected().map(|id| rsx! {
      EmployeeDetail {
        key: "{id}",
        id,
        notifier,
        on_updated: replace,
        on_close: move |_: ()| selected.set(None)
      }
    })},
    div {
      class: "form-group",
      input {
        class: "form-input",
        r#type: "search",
        placeholder: "Search by name or email",
        value: "{query}",
        oninput: move |evt| {
          query.set(evt.value());
          reload.call(evt.value());
        }
      }
    },
    table {
      class: "table",
      thead {
        tr {
          th { "Name" },
          th { "Email" },
          th { "Role" },
          th { "Status" },
          th { "Customers" },
          th {}
        }
      },
      tbody {
        for employee in staff() {
          EmployeeRow { key: "{employee.id}", employee, notifier, on_open: open, on_updated: replace }
        }
      }
    }
  }
}

#[component]
fn EmployeeRow(employee: Employee, notifier: Notifier, on_open: EventHandler<u32>, on_updated: EventHandler<Employee>) -> Element {
  let app = use_context::<AppState>();
  let id = employee.id;
  let name = format!("{} {}", employee.first_name, employee.last_name);
  let customers = employee.customers.iter().map(|c| c.full_name()).collect::<Vec<_>>().join(", ");
  let status = if employee.enabled { "Active" } else { "Disabled" };
  let toggle_label = if employee.enabled { "Disable" } else { "Enable" };
  let patch = EmployeePatch::toggle(&employee);

  let toggle = {
    let dispatcher = app.dispatcher.clone();
    move |_: MouseEvent| {
      let dispatcher = dispatcher.clone();
      let patch = patch.clone();
      spawn(async move {
        match update_employee(&dispatcher, id, &patch).await {
          Ok(updated) => on_updated.call(updated),
          Err(e) => notifier.failure(&e, "Error toggling employee status"),
        }
      });
    }
  };

  rsx! {
    tr {
      td { "{name}" },
      td { "{employee.email}" },
      td { "{employee.role}" },
      td { "{status}" },
      td { "{customers}" },
      td {
        div {
          class: "form-actions",
          button { class: "button", onclick: move |_| on_open.call(id), "Details" },
          button { class: "button", onclick: toggle, "{toggle_label}" }
        }
      }
    }
  }
}

/// Loads one employee, edits their profile and, for traders, the customers
/// assigned to them.
#[component]
fn EmployeeDetail(id: u32, notifier: Notifier, on_updated: EventHandler<Employee>, on_close: EventHandler<()>) -> Element {
  let app = use_context::<AppState>();
  let mut employee: Signal<Option<Employee>> = use_signal(|| None);
  let mut draft = use_signal(EmployeePatch::default);
  let mut saving = use_signal(|| false);

  // keeps the detail panel and the table row in step
  let mut apply = move |updated: Employee| {
    employee.set(Some(updated.clone()));
    on_updated.call(updated);
  };

  use_hook(|| {
    let dispatcher = app.dispatcher.clone();
    spawn(async move {
      match get_employee(&dispatcher, id).await {
        Ok(found) => {
          draft.set(EmployeePatch {
            email: Some(found.email.clone()),
            first_name: Some(found.first_name.clone()),
            last_name: Some(found.last_name.clone()),
            role: Some(found.role),
            ..EmployeePatch::default()
          });
          employee.set(Some(found));
        },
        Err(e) => {
          notifier.failure(&e, "Could not load employee");
          on_close.call(());
        }
      }
    });
  });

  let save = {
    let dispatcher = app.dispatcher.clone();
    move |evt: FormEvent| {
      evt.prevent_default();
      let dispatcher = dispatcher.clone();
      let patch = draft();
      if let Err(e) = patch.validate() {
        notifier.invalid(e);
        return;
      }
      spawn(async move {
        saving.set(true);
        match update_employee(&dispatcher, id, &patch).await {
          Ok(updated) => {
            notifier.success(format!("{} {} updated", updated.first_name, updated.last_name));
            apply(updated);
          },
          Err(e) => notifier.failure(&e, "Failed to update employee"),
        }
        saving.set(false);
      });
    }
  };

  let assign = {
    let dispatcher = app.dispatcher.clone();
    move |customer: Customer| {
      let dispatcher = dispatcher.clone();
      spawn(async move {
        match assign_customers(&dispatcher, id, &[customer.customer_id]).await {
          Ok(updated) => {
            notifier.success(format!("{} assigned", customer.full_name()));
            apply(updated);
          },
          Err(e) => notifier.failure(&e, "Could not assign customer"),
        }
      });
    }
  };

  let remove = EventHandler::new({
    let dispatcher = app.dispatcher.clone();
    move |customer: Customer| {
      let dispatcher = dispatcher.clone();
      spawn(async move {
        match unassign_customers(&dispatcher, id, &[customer.customer_id]).await {
          Ok(updated) => {
            notifier.success(format!("{} unassigned", customer.full_name()));
            apply(updated);
          },
          Err(e) => notifier.failure(&e, "Could not unassign customer"),
        }
      });
    }
  });

  let unassign_all = {
    let dispatcher = app.dispatcher.clone();
    move |_: MouseEvent| {
      let Some(current) = employee() else { return };
      let dispatcher = dispatcher.clone();
      spawn(async move {
        match unassign_all_customers(&dispatcher, id).await {
          Ok(()) => {
            notifier.success("Customers unassigned");
            apply(Employee { customers: vec![], ..current });
          },
          Err(e) => notifier.failure(&e, "Could not unassign customers"),
        }
      });
    }
  };

  let Some(current) = employee() else {
    return rsx! { section { class: "card", p { "Loading employee #{id}..." } } };
  };
  let fields = draft();
  let first_name = fields.first_name.clone().unwrap_or_default();
  let last_name = fields.last_name.clone().unwrap_or_default();
  let email = fields.email.clone().unwrap_or_default();
  let role = fields.role.unwrap_or(current.role);
  let is_trader = current.role == Role::Trader;

  rsx! {
    section {
      class: "card",
      div {
        class: "card-header",
        h2 { "{current.first_name} {current.last_name}" },
        button { class: "button", onclick: move |_| on_close.call(()), "Close" }
      },
      div {
        class: "two-column",
        form {
          onsubmit: save,
          div {
            class: "form-group",
            label { class: "form-label", "First name" },
            input {
              class: "form-input",
              value: "{first_name}",
              oninput: move |evt| draft.write().first_name = Some(evt.value())
            }
          },
          div {
            class: "form-group",
            label { class: "form-label", "Last name" },
            input {
              class: "form-input",
              value: "{last_name}",
              oninput: move |evt| draft.write().last_name = Some(evt.value())
            }
          },
          div {
            class: "form-group",
            label { class: "form-label", "Email" },
            input {
              class: "form-input",
              r#type: "email",
              value: "{email}",
              oninput: move |evt| draft.write().email = Some(evt.value())
            }
          },
          div {
            class: "form-group",
            label { class: "form-label", "Role" },
            select {
              class: "form-input",
              onchange: move |evt| draft.write().role = evt.value().parse::<Role>().ok(),
              for (value, title) in ROLES {
                option { key: "{value}", value: "{value}", selected: role == value, "{title}" }
              }
            }
          },
          button {
            r#type: "submit",
            class: "button button-primary",
            disabled: saving(),
            "Save"
          }
        },
        if is_trader {
          div {
            h3 { "Assigned customers" },
            CustomerSearch { label: "Customer to assign", on_select: assign },
            if current.customers.is_empty() {
              p { class: "hint", "No customers assigned." }
            } else {
              table {
                class: "table",
                tbody {
                  for customer in current.customers.iter().cloned() {
                    AssignedCustomerRow { key: "{customer.customer_id}", customer, on_remove: remove }
                  }
                }
              },
              button { class: "button button-danger", onclick: unassign_all, "Unassign all" }
            }
          }
        }
      }
    }
  }
}

#[component]
fn AssignedCustomerRow(customer: Customer, on_remove: EventHandler<Customer>) -> Element {
  let name = customer.full_name();
  rsx! {
    tr {
      td { "{name}" },
      td { "{customer.email}" },
      td {
        button {
          class: "button button-danger",
          onclick: move |_| on_remove.call(customer.clone()),
          "Remove"
        }
      }
    }
  }
}

#[component]
fn EmployeeForm(notifier: Notifier, on_created: EventHandler<Employee>) -> Element {
  let app = use_context::<AppState>();
  let mut form = use_signal(empty_employee);
  let mut saving = use_signal(|| false);

  let save = move |evt: FormEvent| {
    evt.prevent_default();
    let dispatcher = app.dispatcher.clone();
    let body = form();
    if let Err(e) = body.validate() {
      notifier.invalid(e);
      return;
    }
    spawn(async move {
      saving.set(true);
      match create_employee(&dispatcher, &body).await {
        Ok(created) => {
          notifier.success(format!("{} {} created", created.first_name, created.last_name));
          form.set(empty_employee());
          on_created.call(created);
        },
        Err(e) => {
          warn!("employee creation failed for {}", body.email);
          notifier.failure(&e, "Failed to create employee");
        }
      }
      saving.set(false);
    });
  };

  let fields = form();
  let role = fields.role;

  rsx! {
    section {
      class: "card",
      h2 { "New employee" },
      form {
        onsubmit: save,
        div {
          class: "form-group",
          label { class: "form-label", "First name" },
          input {
            class: "form-input",
            value: "{fields.first_name}",
            oninput: move |evt| form.write().first_name = evt.value()
          }
        },
        div {
          class: "form-group",
          label { class: "form-label", "Last name" },
          input {
            class: "form-input",
            value: "{fields.last_name}",
            oninput: move |evt| form.write().last_name = evt.value()
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
          label { class: "form-label", "Password" },
          input {
            class: "form-input",
            r#type: "password",
            autocomplete: "new-password",
            value: "{fields.password}",
            oninput: move |evt| form.write().password = evt.value()
          }
        },
        div {
          class: "form-group",
          label { class: "form-label", "Role" },
          select {
            class: "form-input",
            onchange: move |evt| {
              if let Ok(r) = evt.value().parse::<Role>() {
                form.write().role = r;
              }
            },
            for (value, title) in ROLES {
              option { key: "{value}", value: "{value}", selected: role == value, "{title}" }
            }
          }
        },
        button {
          r#type: "submit",
          class: "button button-primary",
          disabled: saving(),
          "Create"
        }
      }
    }
  }
}
