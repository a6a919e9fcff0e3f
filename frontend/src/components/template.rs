use dioxus::{logger::tracing::error, prelude::*};
use fintra_client::{api::auth, GuardState, GuardView, RouteGuard};

use crate::{utils::state::AppState, Route};

/// Runs the route guard on every pathname change and renders the matched
/// route only once the guard authorized that exact pathname.
#[component]
pub fn Guarded() -> Element {
  let app = use_context::<AppState>();
  let pathname = use_route::<Route>().to_string();
  let mut guard = use_signal(move || RouteGuard::new(app.session().clone(), app.policy.clone(), app.config.clone()));
  let mut checked: Signal<Option<(String, GuardState)>> = use_signal(|| None);
  let nav = navigator();

  use_effect(use_reactive((&pathname,), move |(pathname,)| {
    let state = guard.write().on_navigate(&pathname).clone();
    if let GuardState::Redirecting(target) = &state {
      match target.parse::<Route>() {
        Ok(to) => { nav.replace(to); },
        Err(_) => error!("redirect target {} is not a route of this app", target),
      }
    }
    checked.set(Some((pathname, state)));
  }));

  // a state left over from the previous pathname counts as still checking
  let view = match checked.read().as_ref() {
    Some((path, state)) if *path == pathname => state.view(),
    _ => GuardView::Placeholder,
  };

  match view {
    GuardView::Outlet => rsx! { Outlet::<Route> {} },
    GuardView::Placeholder => rsx! { div { class: "guard-checking", "Loading..." } },
    GuardView::Blank => rsx! {},
  }
}

fn nav_items() -> Vec<(&'static str, Route)> {
  vec![
    ("Home Page", Route::HomePage {}),
    ("Customers", Route::Customers {}),
    ("Employees", Route::Employees {}),
    ("Quick Buy/Sell", Route::QuickBuySell {}),
    ("Order History", Route::OrderHistory {}),
    ("Stock Transfers", Route::StockTransfers {}),
    ("Cash Transfers", Route::CashTransfers {}),
    ("End of Day", Route::EndOfDay {}),
    ("Reports", Route::Reports {}),
  ]
}

/// Sidebar and header around the signed-in pages.
#[component]
pub fn Shell() -> Element {
  let app = use_context::<AppState>();
  let session = app.session().current();
  let role = session.authorized_role();
  let items: Vec<(&'static str, Route)> = nav_items()
    .into_iter()
    .filter(|(_, route)| app.policy.is_allowed(role, &route.to_string()))
    .collect();
  let name = session.display_name();
  let role_label = role.map(|r| r.to_string()).unwrap_or_default();

  rsx! {
    div {
      class: "shell",
      aside {
        class: "sidebar",
        div { class: "logo", "Fintra" },
        nav {
          class: "nav-links",
          for (title, route) in items {
            Link {
              key: "{title}",
              active_class: "nav-active",
              to: route,
              "{title}"
            }
          }
        }
      },
      div {
        class: "shell-main",
        header {
          class: "shell-header",
          span { class: "user-name", "{name}" },
          span { class: "user-role", "{role_label}" },
          button {
            class: "button",
            onclick: move |_| auth::logout(&app.dispatcher),
            "Log out"
          }
        },
        main {
          class: "page",
          Outlet::<Route> {}
        }
      }
    }
  }
}
