use dioxus::prelude::*;
use fintra_client::api::orders::{OrderBook, OrderBookLevel};
use rust_decimal::Decimal;

/// Bids on the left, asks on the right, each row shaded by its share of the
/// side's total volume.
#[component]
pub fn OrderBookTable(book: OrderBook) -> Element {
  let bid_depths = depths(&book.bids);
  let ask_depths = depths(&book.asks);
  let spread = book.spread().map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());

  rsx! {
    div {
      class: "orderbook-container",
      div {
        class: "orderbook-table-container",
        TitleRow { reverse: false },
        for (level, depth) in book.bids.iter().cloned().zip(bid_depths) {
          div {
            key: "bid{level.order_id}",
            class: "orderbook-row-container",
            DepthVisualizer { depth, reverse: false },
            PriceLevelRow { level, reverse: false }
          }
        }
      },
      div {
        class: "orderbook-table-container",
        TitleRow { reverse: true },
        for (level, depth) in book.asks.iter().cloned().zip(ask_depths) {
          div {
            key: "ask{level.order_id}",
            class: "orderbook-row-container",
            DepthVisualizer { depth, reverse: true },
            PriceLevelRow { level, reverse: true }
          }
        }
      }
    },
    p { class: "orderbook-spread", "Spread: {spread}" }
  }
}

fn depths(levels: &[OrderBookLevel]) -> Vec<f32> {
  let volume: u64 = levels.iter().map(|l| u64::from(l.amount)).sum();
  levels.iter()
    .map(|l| if volume == 0 { 0.0 } else { l.amount as f32 * 100.0 / volume as f32 })
    .collect()
}

#[component]
fn TitleRow(reverse: bool) -> Element {
  if reverse {
    rsx! {
      div {
        class: "orderbook-titlerow",
        span { "PRICE" },
        span { "SIZE" },
        span { "TOTAL" }
      }
    }
  } else {
    rsx! {
      div {
        class: "orderbook-titlerow",
        span { "TOTAL" },
        span { "SIZE" },
        span { "PRICE" }
      }
    }
  }
}

#[component]
fn DepthVisualizer(depth: f32, reverse: bool) -> Element {
  let offset = if reverse { 0.0 } else { 100.0 - depth };
  rsx! {
    div {
      class: if reverse { "depth depth-ask" } else { "depth depth-bid" },
      width: "{depth}%",
      left: "{offset}%",
    }
  }
}

#[component]
fn PriceLevelRow(level: OrderBookLevel, reverse: bool) -> Element {
  let (price, size, total): (Decimal, u32, Decimal) = (level.price, level.amount, level.total);
  rsx! {
    div {
      class: "orderbook-pricerow",
      if reverse {
        span { class: "price-ask", "{price}" },
        span { "{size}" },
        span { "{total}" }
      } else {
        span { "{total}" },
        span { "{size}" },
        span { class: "price-bid", "{price}" },
      }
    }
  }
}
