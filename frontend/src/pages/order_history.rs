use chrono::{Local, NaiveDate};
use dioxus::prelude::*;
use fintra_client::{
  api::orders::{
    cancel_order, get_order, history_csv, order_book_excluding, order_history, positive_decimal, update_order,
    EquityOrder, EquityOrderUpdate, HistoryFilter, OrderBook, OrderHistoryEntry, OrderSide, OrderStatus, OrderType,
    HISTORY_DEFAULT_DAYS,
  },
  ValidationError,
};

use crate::{
  components::{
    orderbook::OrderBookTable,
    toast::{use_notifier, AlertBanner, Notifier},
  },
  utils::{browser::download_csv, state::AppState},
};

fn default_filter() -> HistoryFilter {
  HistoryFilter::last_days(Local::now().date_naive(), HISTORY_DEFAULT_DAYS)
}

fn date_value(date: Option<NaiveDate>) -> String {
  date.map(|d| d.to_string()).unwrap_or_default()
}

#[component]
pub fn OrderHistory() -> Element {
  let app = use_context::<AppState>();
  let notifier = use_notifier();
  let mut filter = use_signal(default_filter);
  // bumped to force a reload after a cancellation
  let mut generation = use_signal(|| 0u32);
  let mut editing: Signal<Option<u32>> = use_signal(|| None);

  let history = use_resource({
    let dispatcher = app.dispatcher.clone();
    move || {
      let dispatcher = dispatcher.clone();
      let _ = generation();
      async move {
        match order_history(&dispatcher, None).await {
          Ok(entries) => entries,
          Err(e) => {
            notifier.failure(&e, "Could not load order history");
            vec![]
          }
        }
      }
    }
  });

  let cancel = EventHandler::new({
    let dispatcher = app.dispatcher.clone();
    move |order_id: u32| {
      let dispatcher = dispatcher.clone();
      spawn(async move {
        match cancel_order(&dispatcher, order_id).await {
          Ok(()) => {
            notifier.success(format!("Order #{} cancelled", order_id));
            generation += 1;
          },
          Err(e) => notifier.failure(&e, "Failed to cancel order"),
        }
      });
    }
  });

  let edit = EventHandler::new(move |order_id: u32| editing.set(Some(order_id)));

  let current = filter();
  let shown: Option<Vec<OrderHistoryEntry>> = history().map(|entries| current.apply(&entries));
  let exported = shown.clone().unwrap_or_default();
  let nothing_to_export = exported.is_empty();
  let side = current.side;
  let status = current.status;
  let from_value = date_value(current.from);
  let to_value = date_value(current.to);

  rsx! {
    div {
      class: "page-header",
      h1 { "Order History" },
      button {
        class: "button",
        disabled: nothing_to_export,
        onclick: move |_| {
          let file = format!("order-history-{}.csv", Local::now().format("%Y-%m-%d"));
          download_csv(&file, &history_csv(&exported));
        },
        "Export CSV"
      }
    },
    AlertBanner { notifier },
    {editing().map(|order_id| rsx! {
      OrderEditor {
        key: "{order_id}",
        order_id,
        notifier,
        on_done: move |changed: bool| {
          editing.set(None);
          if changed {
            generation += 1;
          }
        }
      }
    })},
    div {
      class: "form-inline filters",
      input {
        class: "form-input",
        r#type: "search",
        placeholder: "Customer name",
        value: "{current.customer}",
        oninput: move |evt| filter.write().customer = evt.value()
      },
      select {
        class: "form-input",
        onchange: move |evt| filter.write().side = evt.value().parse::<OrderSide>().ok(),
        option { value: "", selected: side.is_none(), "All sides" },
        for choice in OrderSide::ALL {
          option { key: "{choice}", value: "{choice}", selected: side == Some(choice), "{choice}" }
        }
      },
      select {
        class: "form-input",
        onchange: move |evt| filter.write().status = evt.value().parse::<OrderStatus>().ok(),
        option { value: "", selected: status.is_none(), "All statuses" },
        for choice in OrderStatus::ALL {
          option { key: "{choice}", value: "{choice}", selected: status == Some(choice), "{choice}" }
        }
      },
      label { class: "form-label", "From" },
      input {
        class: "form-input",
        r#type: "date",
        value: "{from_value}",
        oninput: move |evt| filter.write().from = evt.value().parse::<NaiveDate>().ok()
      },
      label { class: "form-label", "To" },
      input {
        class: "form-input",
        r#type: "date",
        value: "{to_value}",
        oninput: move |evt| filter.write().to = evt.value().parse::<NaiveDate>().ok()
      },
      button { class: "button", onclick: move |_| filter.set(default_filter()), "Reset" }
    },
    {match shown {
      None => rsx! { p { "Loading..." } },
      Some(entries) if entries.is_empty() => rsx! { p { class: "hint", "No orders found." } },
      Some(entries) => rsx! {
        table {
          class: "table",
          thead {
            tr {
              th { "Order" },
              th { "Customer" },
              th { "Account" },
              th { "Equity" },
              th { "Side" },
              th { "Type" },
              th { "Status" },
              th { "Quantity" },
              th { "Price" },
              th { "Time" },
              th {}
            }
          },
          tbody {
            for entry in entries {
              HistoryRow { key: "{entry.history_id}", entry, on_edit: edit, on_cancel: cancel }
            }
          }
        }
      }
    }}
  }
}

#[component]
fn HistoryRow(entry: OrderHistoryEntry, on_edit: EventHandler<u32>, on_cancel: EventHandler<u32>) -> Element {
  let name = entry.customer_name();
  let quantity = entry.old_order_quantity.map(|q| q.to_string()).unwrap_or_default();
  let price = entry.old_price.map(|p| p.to_string()).unwrap_or_else(|| "MARKET".to_string());
  let time = entry.transaction_time.map(|t| t.format("%d.%m.%Y %H:%M").to_string()).unwrap_or_default();
  let order_id = entry.order_id;
  let open = entry.order_status.is_open();

  rsx! {
    tr {
      td { "{order_id}" },
      td { "{name}" },
      td { "{entry.account_id}" },
      td { "{entry.equity_id}" },
      td { class: "side-{entry.order_side}", "{entry.order_side}" },
      td { "{entry.order_type}" },
      td { "{entry.order_status}" },
      td { "{quantity}" },
      td { "{price}" },
      td { "{time}" },
      td {
        if open {
          div {
            class: "form-actions",
            button { class: "button", onclick: move |_| on_edit.call(order_id), "Edit" },
            button { class: "button button-danger", onclick: move |_| on_cancel.call(order_id), "Cancel" }
          }
        }
      }
    }
  }
}

/// Loads an open order and the book around it, then patches quantity, type
/// and price. `on_done` reports whether the order changed.
#[component]
fn OrderEditor(order_id: u32, notifier: Notifier, on_done: EventHandler<bool>) -> Element {
  let app = use_context::<AppState>();
  let mut order: Signal<Option<EquityOrder>> = use_signal(|| None);
  let mut book: Signal<Option<OrderBook>> = use_signal(|| None);
  let mut quantity = use_signal(String::new);
  let mut price = use_signal(String::new);
  let mut order_type = use_signal(|| OrderType::Limit);

  use_hook(|| {
    let dispatcher = app.dispatcher.clone();
    spawn(async move {
      let loaded = match get_order(&dispatcher, order_id).await {
        Ok(o) => o,
        Err(e) => {
          notifier.failure(&e, "Could not load order");
          on_done.call(false);
          return;
        }
      };
      quantity.set(loaded.order_quantity.to_string());
      price.set(loaded.price.map(|p| p.to_string()).unwrap_or_default());
      order_type.set(loaded.order_type);
      match order_book_excluding(&dispatcher, loaded.equity_id, order_id).await {
        Ok(b) => book.set(Some(b)),
        Err(e) => notifier.failure(&e, "Could not load order book"),
      }
      order.set(Some(loaded));
    });
  });

  let save = move |evt: FormEvent| {
    evt.prevent_default();
    let dispatcher = app.dispatcher.clone();
    let Ok(order_quantity) = quantity().trim().parse::<u32>() else {
      notifier.invalid(ValidationError::InvalidQuantity);
      return;
    };
    let update = EquityOrderUpdate {
      order_quantity,
      price: positive_decimal(&price()),
      order_type: order_type(),
    };
    spawn(async move {
      match update_order(&dispatcher, order_id, &update).await {
        Ok(updated) => {
          notifier.success(format!("Order #{} updated", updated.order_id));
          on_done.call(true);
        },
        Err(e) => notifier.failure(&e, "Failed to update order"),
      }
    });
  };

  let Some(current) = order() else {
    return rsx! { section { class: "card", p { "Loading order #{order_id}..." } } };
  };
  let is_limit = order_type() == OrderType::Limit;

  rsx! {
    section {
      class: "card",
      div {
        class: "card-header",
        h2 { "Edit order #{order_id}" },
        span { class: "side-{current.order_side}", "{current.order_side} / account {current.account_id}" }
      },
      div {
        class: "two-column",
        form {
          onsubmit: save,
          div {
            class: "form-group",
            label { class: "form-label", "Order type" },
            select {
              class: "form-input",
              onchange: move |evt| order_type.set(if evt.value() == "LIMIT" { OrderType::Limit } else { OrderType::Market }),
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
              value: "{quantity}",
              oninput: move |evt| quantity.set(evt.value())
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
                value: "{price}",
                oninput: move |evt| price.set(evt.value())
              }
            }
          },
          div {
            class: "form-actions",
            button { r#type: "submit", class: "button button-primary", "Save" },
            button { r#type: "button", class: "button", onclick: move |_| on_done.call(false), "Close" }
          }
        },
        {book().map(|b| rsx! { OrderBookTable { book: b } })}
      }
    }
  }
}
