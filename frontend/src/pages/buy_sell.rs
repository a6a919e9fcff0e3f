use std::{rc::Rc, time::Duration};
use dioxus::{logger::tracing::{info, warn}, prelude::*};
use fintra_client::{
  api::{
    customers::{get_customer, Customer},
    equities::{search_equities, EquityPrice},
    orders::{order_book, place_order, OrderBook, OrderSide, OrderTicket, OrderType},
    trades::{settled_trades, Trade},
  },
  Supersede,
};

use crate::{
  components::{
    customer_search::CustomerSearch,
    orderbook::OrderBookTable,
    toast::{use_notifier_with, AlertBanner},
  },
  utils::state::AppState,
};

/// Order results stay up longer than the usual banner.
const TICKET_ALERT_TIMEOUT: Duration = Duration::from_secs(5);

#[component]
pub fn QuickBuySell() -> Element {
  let app = use_context::<AppState>();
  let notifier = use_notifier_with(TICKET_ALERT_TIMEOUT);
  let supersede = use_hook(|| Rc::new(Supersede::new()));

  let mut customer: Signal<Option<Customer>> = use_signal(|| None);
  let mut stock_query = use_signal(String::new);
  let mut stocks: Signal<Vec<EquityPrice>> = use_signal(Vec::new);
  let mut stock: Signal<Option<EquityPrice>> = use_signal(|| None);
  let mut book: Signal<Option<OrderBook>> = use_signal(|| None);
  let mut ticket = use_signal(|| OrderTicket::new(OrderSide::Buy));
  let mut placing = use_signal(|| false);
  let mut trades: Signal<Option<Vec<Trade>>> = use_signal(|| None);

  let load_book = use_callback({
    let dispatcher = app.dispatcher.clone();
    move |equity_id: u32| {
      let dispatcher = dispatcher.clone();
      spawn(async move {
        match order_book(&dispatcher, equity_id).await {
          Ok(b) => book.set(Some(b)),
          Err(e) => {
            book.set(None);
            warn!("order book for {} unavailable: {}", equity_id, e);
          }
        }
      });
    }
  });

  let load_trades = use_callback({
    let dispatcher = app.dispatcher.clone();
    move |_: ()| {
      let dispatcher = dispatcher.clone();
      spawn(async move {
        match settled_trades(&dispatcher).await {
          Ok(found) => trades.set(Some(found)),
          Err(e) => {
            trades.set(Some(vec![]));
            notifier.failure(&e, "Failed to fetch trade history");
          }
        }
      });
    }
  });

  let search_stocks = {
    let dispatcher = app.dispatcher.clone();
    let supersede = supersede.clone();
    move |evt: FormEvent| {
      let text = evt.value();
      stock_query.set(text.clone());
      if text.trim().is_empty() {
        supersede.cancel();
        stocks.set(vec![]);
        return;
      }
      let token = supersede.begin();
      let dispatcher = dispatcher.clone();
      spawn(async move {
        match search_equities(&dispatcher, text.trim(), 10, Some(&token)).await {
          Ok(found) => stocks.set(found),
          Err(e) if e.is_cancelled() => {},
          Err(e) => warn!("stock search failed: {}", e),
        }
      });
    }
  };

  let pick_stock = EventHandler::new({
    let supersede = supersede.clone();
    move |equity: EquityPrice| {
      supersede.cancel();
      stock_query.set(equity.asset_code.clone());
      stocks.set(vec![]);
      {
        let mut t = ticket.write();
        t.equity_id = Some(equity.equity_id);
        t.market_price = equity.close_price;
      }
      load_book.call(equity.equity_id);
      load_trades.call(());
      stock.set(Some(equity));
    }
  });

  let submit = {
    let dispatcher = app.dispatcher.clone();
    move |evt: FormEvent| {
      evt.prevent_default();
      let dispatcher = dispatcher.clone();
      let current = ticket();
      spawn(async move {
        placing.set(true);
        match place_order(&dispatcher, &current).await {
          Ok(order) => {
            info!("order {} placed with status {:?}", order.order_id, order.final_status);
            let verb = if current.side == OrderSide::Buy { "Buy" } else { "Sell" };
            notifier.success(format!("{} order #{} placed", verb, order.order_id));
            ticket.with_mut(|t| {
              t.quantity.clear();
              t.limit_price.clear();
            });
            load_book.call(order.equity_id);
            load_trades.call(());
            let owner = customer.peek().as_ref().map(|c| c.customer_id);
            if let Some(customer_id) = owner {
              // balances and holdings moved, show the blocked amounts
              if let Ok(fresh) = get_customer(&dispatcher, customer_id).await {
                customer.set(Some(fresh));
              }
            }
          },
          Err(e) => {
            let fallback = if current.side == OrderSide::Buy { "Failed to place buy order" } else { "Failed to place sell order" };
            notifier.failure(&e, fallback);
          }
        }
        placing.set(false);
      });
    }
  };

  let selected_customer = customer();
  let current = ticket();
  let account = selected_customer.as_ref()
    .zip(current.account_id)
    .and_then(|(c, id)| c.account(id).cloned());
  let free_cash = account.as_ref().map(|a| a.free_cash().to_string()).unwrap_or_default();
  let held = account.as_ref()
    .zip(current.equity_id)
    .and_then(|(a, id)| a.holding(id).map(|h| h.total_quantity))
    .unwrap_or(0);
  let is_limit = current.order_type == OrderType::Limit;
  let stock_label = stock().map(|s| {
    let price = s.close_price.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
    format!("{} ({})", s.asset_code, price)
  });

  rsx! {
    h1 { "Quick Buy/Sell" },
    AlertBanner { notifier },
    div {
      class: "two-column",
      section {
        class: "card",
        CustomerSearch {
          label: "Customer",
          on_select: move |c: Customer| {
            let first_account = c.accounts.first().map(|a| a.account_id);
            ticket.write().account_id = first_account;
            customer.set(Some(c));
          }
        },
        {selected_customer.map(|c| rsx! {
          div {
            class: "form-group",
            label { class: "form-label", "Account" },
            select {
              class: "form-input",
              onchange: move |evt| ticket.write().account_id = evt.value().parse().ok(),
              for a in c.accounts {
                option {
                  key: "{a.account_id}",
                  value: "{a.account_id}",
                  selected: current.account_id == Some(a.account_id),
                  "{a.account_id} - {a.account_type}"
                }
              }
            }
          },
          p { class: "hint", "Free cash: {free_cash} / Held: {held}" }
        })},
        div {
          class: "form-group",
          label { class: "form-label", "Stock" },
          input {
            class: "form-input",
            r#type: "search",
            placeholder: "Asset code",
            value: "{stock_query}",
            oninput: search_stocks
          },
          if !stocks.read().is_empty() {
            ul {
              class: "search-results",
              for equity in stocks() {
                li {
                  key: "{equity.equity_id}",
                  onclick: {
                    let equity = equity.clone();
                    move |_| pick_stock.call(equity.clone())
                  },
                  span { class: "result-name", "{equity.asset_code}" },
                  span { class: "result-meta", {equity.equity_name.clone().unwrap_or_default()} }
                }
              }
            }
          }
        },
        {stock_label.map(|label| rsx! { p { class: "hint", "Selected: {label}" } })},
        form {
          onsubmit: submit,
          div {
            class: "toggle-group",
            button {
              r#type: "button",
              class: if current.side == OrderSide::Buy { "button button-buy active" } else { "button button-buy" },
              onclick: move |_| ticket.write().side = OrderSide::Buy,
              "Buy"
            },
            button {
              r#type: "button",
              class: if current.side == OrderSide::Sell { "button button-sell active" } else { "button button-sell" },
              onclick: move |_| ticket.write().side = OrderSide::Sell,
              "Sell"
            }
          },
          div {
            class: "form-group",
            label { class: "form-label", "Order type" },
            select {
              class: "form-input",
              onchange: move |evt| {
                ticket.write().order_type = if evt.value() == "LIMIT" { OrderType::Limit } else { OrderType::Market };
              },
              option { value: "MARKET", selected: !is_limit, "Market" },
              option { value: "LIMIT", selected: is_limit, "Limit" }
            }
          },
          div {
            class: "form-group",
            label { class: "form-label", "Quantity" },
            input {
              class: "form-input",
              r#type: "number",
              min: "1",
              value: "{current.quantity}",
              oninput: move |evt| ticket.write().quantity = evt.value()
            }
          },
          if is_limit {
            div {
              class: "form-group",
              label { class: "form-label", "Limit price" },
              input {
                class: "form-input",
                r#type: "number",
                step: "0.01",
                value: "{current.limit_price}",
                oninput: move |evt| ticket.write().limit_price = evt.value()
              }
            }
          },
          button {
            r#type: "submit",
            class: "button button-primary",
            disabled: placing(),
            if placing() { "Sending..." } else { "Place order" }
          }
        }
      },
      section {
        class: "card",
        h2 { "Order book" },
        {match book() {
          Some(b) => rsx! { OrderBookTable { book: b } },
          None => rsx! { p { class: "hint", "Select a stock to see its order book." } },
        }}
      }
    },
    {trades().map(|settled| rsx! { TradeHistory { trades: settled } })}
  }
}

#[component]
fn TradeHistory(trades: Vec<Trade>) -> Element {
  rsx! {
    section {
      class: "card",
      h2 { "Trade history" },
      if trades.is_empty() {
        p { class: "hint", "No settled trades yet." }
      } else {
        table {
          class: "table",
          thead {
            tr {
              th { "Trade" },
              th { "Match" },
              th { "Order" },
              th { "Quantity" },
              th { "Price" },
              th { "Commission" },
              th { "Time" },
              th { "Total" }
            }
          },
          tbody {
            for trade in trades.iter().cloned() {
              TradeRow { key: "{trade.trade_id}", trade }
            }
          }
        }
      }
    }
  }
}

#[component]
fn TradeRow(trade: Trade) -> Element {
  let match_id = trade.match_id.map(|m| m.to_string()).unwrap_or_default();
  let commission = trade.commission.map(|c| c.round_dp(2).to_string()).unwrap_or_else(|| "-".to_string());
  let time = trade.transaction_time.map(|t| t.format("%d.%m.%Y %H:%M:%S").to_string()).unwrap_or_default();
  let total = trade.total_value().round_dp(2);
  rsx! {
    tr {
      td { "{trade.trade_id}" },
      td { "{match_id}" },
      td { "{trade.equity_order_id}" },
      td { "{trade.trade_quantity}" },
      td { "{trade.price}" },
      td { "{commission}" },
      td { "{time}" },
      td { "{total}" }
    }
  }
}
