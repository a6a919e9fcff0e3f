#![allow(non_snake_case)]
mod pages;
mod components;
mod utils;

use components::template::{Guarded, Shell};
use dioxus::prelude::*;
use pages::{
  buy_sell::QuickBuySell,
  cash_transfers::CashTransfers,
  customers::Customers,
  employees::Employees,
  end_of_day::EndOfDay,
  home::HomePage,
  login::{ForgotPassword, Login},
  order_history::OrderHistory,
  reports::Reports,
  stock_transfers::StockTransfers,
};
use utils::state::AppState;

#[derive(Routable, PartialEq, Clone)]
#[rustfmt::skip]
pub enum Route {
  #[layout(Guarded)]
    #[route("/")]
    Root {},
    #[route("/login")]
    Login {},
    #[route("/forgot-password")]
    ForgotPassword {},
    #[layout(Shell)]
      #[route("/home-page")]
      HomePage {},
      #[route("/customers")]
      Customers {},
      #[route("/employees")]
      Employees {},
      #[route("/buy-sell/quick-buy-sell")]
      QuickBuySell {},
      #[route("/buy-sell/order-history")]
      OrderHistory {},
      #[route("/operational/cash-transfers")]
      CashTransfers {},
      #[route("/operational/stock-transfers")]
      StockTransfers {},
      #[route("/operational/end-of-day")]
      EndOfDay {},
      #[route("/reports")]
      Reports {},
      #[route("/:..route")]
      PageNotFound { route: Vec<String> },
}

fn main() {
  dioxus::launch(App);
}

fn App() -> Element {
  use_context_provider(AppState::from_browser);
  static CSS: Asset = asset!("/assets/main.css");
  rsx! {
    document::Stylesheet { href: CSS },
    Router::<Route> {}
  }
}

/// Only reachable once the guard let the user through, so signed-in users
/// land on their start page.
#[component]
fn Root() -> Element {
  let app = use_context::<AppState>();
  let nav = navigator();
  use_effect(move || {
    if let Ok(route) = app.landing_route().parse::<Route>() {
      nav.replace(route);
    }
  });
  rsx! {}
}

#[component]
fn PageNotFound(route: Vec<String>) -> Element {
  let path = route.join("/");
  rsx! {
    div {
      class: "page",
      h1 { "Page not found" }
      p { "There is nothing at /{path}." }
      Link { class: "button", to: Route::Root {}, "Back to start" }
    }
  }
}
