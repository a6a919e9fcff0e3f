use std::{fmt, str::FromStr};
use chrono::{Days, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{dispatch::Dispatcher, error::{ApiError, ValidationError}};
use super::{to_csv, Page};

/// Days back the order history filter reaches by default.
pub const HISTORY_DEFAULT_DAYS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
  Buy,
  Sell,
}

impl OrderSide {
  pub const ALL: [OrderSide; 2] = [Self::Buy, Self::Sell];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Buy => "BUY",
      Self::Sell => "SELL",
    }
  }
}

impl fmt::Display for OrderSide {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for OrderSide {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL.into_iter().find(|side| side.as_str() == s).ok_or_else(|| format!("unknown order side {}", s))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
  Market,
  Limit,
}

impl fmt::Display for OrderType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Market => write!(f, "MARKET"),
      Self::Limit => write!(f, "LIMIT"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
  Pending,
  PartiallyFilled,
  Filled,
  Updated,
  Cancelled,
  Rejected,
  Expired,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 7] = [
    Self::Pending,
    Self::PartiallyFilled,
    Self::Filled,
    Self::Updated,
    Self::Cancelled,
    Self::Rejected,
    Self::Expired,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Pending => "PENDING",
      Self::PartiallyFilled => "PARTIALLY_FILLED",
      Self::Filled => "FILLED",
      Self::Updated => "UPDATED",
      Self::Cancelled => "CANCELLED",
      Self::Rejected => "REJECTED",
      Self::Expired => "EXPIRED",
    }
  }

  /// Orders the user may still edit or cancel.
  pub fn is_open(&self) -> bool {
    matches!(self, Self::Pending | Self::PartiallyFilled | Self::Updated)
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL.into_iter().find(|status| status.as_str() == s).ok_or_else(|| format!("unknown order status {}", s))
  }
}

/// Raw order entry form as typed by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTicket {
  pub account_id: Option<u32>,
  pub equity_id: Option<u32>,
  pub side: OrderSide,
  pub order_type: OrderType,
  pub quantity: String,
  pub limit_price: String,
  /// Last known price, sent along with market orders.
  pub market_price: Option<Decimal>,
}

impl OrderTicket {
  pub fn new(side: OrderSide) -> Self {
    Self {
      account_id: None,
      equity_id: None,
      side,
      order_type: OrderType::Market,
      quantity: String::new(),
      limit_price: String::new(),
      market_price: None,
    }
  }

  pub fn validate(&self) -> Result<EquityOrderRequest, ValidationError> {
    let equity_id = self.equity_id.ok_or(ValidationError::Missing("a stock"))?;
    let quantity = self.quantity.trim().parse::<u32>().ok()
      .filter(|q| *q > 0)
      .ok_or(ValidationError::InvalidQuantity)?;
    let price = match self.order_type {
      OrderType::Limit => Some(positive_decimal(&self.limit_price).ok_or(ValidationError::InvalidPrice)?),
      OrderType::Market => self.market_price,
    };
    let account_id = self.account_id.ok_or(ValidationError::Missing("an account and stock"))?;

    Ok(EquityOrderRequest {
      account_id,
      equity_id,
      order_side: self.side,
      order_quantity: quantity,
      price,
      order_type: self.order_type,
    })
  }
}

pub fn positive_decimal(raw: &str) -> Option<Decimal> {
  raw.trim().parse::<Decimal>().ok().filter(|d| d.is_sign_positive() && !d.is_zero())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityOrderRequest {
  pub account_id: u32,
  pub equity_id: u32,
  pub order_side: OrderSide,
  pub order_quantity: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub price: Option<Decimal>,
  pub order_type: OrderType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityOrderUpdate {
  pub order_quantity: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub price: Option<Decimal>,
  pub order_type: OrderType,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityOrder {
  pub order_id: u32,
  pub account_id: u32,
  pub equity_id: u32,
  pub order_side: OrderSide,
  pub order_quantity: u32,
  pub price: Option<Decimal>,
  pub final_status: OrderStatus,
  pub entry_date: Option<NaiveDateTime>,
  pub order_date: Option<NaiveDate>,
  pub order_type: OrderType,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistoryEntry {
  pub history_id: u32,
  pub order_id: u32,
  pub account_id: u32,
  pub equity_id: u32,
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub order_status: OrderStatus,
  pub order_side: OrderSide,
  pub order_type: OrderType,
  pub old_order_quantity: Option<u32>,
  pub old_price: Option<Decimal>,
  pub transaction_time: Option<NaiveDateTime>,
}

impl OrderHistoryEntry {
  pub fn customer_name(&self) -> String {
    let first = self.first_name.as_deref().unwrap_or_default();
    let last = self.last_name.as_deref().unwrap_or_default();
    format!("{} {}", first, last).trim().to_string()
  }

  pub fn total_value(&self) -> Option<Decimal> {
    Some(Decimal::from(self.old_order_quantity?) * self.old_price?)
  }
}

/// Client side narrowing of the loaded order history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
  /// Matched against the customer's first, last and full name, ignoring case.
  pub customer: String,
  pub side: Option<OrderSide>,
  pub status: Option<OrderStatus>,
  /// Inclusive bounds on the transaction date. An entry without a transaction
  /// time never passes a set bound.
  pub from: Option<NaiveDate>,
  pub to: Option<NaiveDate>,
}

impl HistoryFilter {
  /// Every order of the `days` days up to and including `today`.
  pub fn last_days(today: NaiveDate, days: u64) -> Self {
    Self {
      from: today.checked_sub_days(Days::new(days)),
      to: Some(today),
      ..Self::default()
    }
  }

  pub fn matches(&self, entry: &OrderHistoryEntry) -> bool {
    let needle = self.customer.trim().to_lowercase();
    if !needle.is_empty() {
      let names = [
        entry.first_name.clone().unwrap_or_default(),
        entry.last_name.clone().unwrap_or_default(),
        entry.customer_name(),
      ];
      if !names.iter().any(|n| n.to_lowercase().contains(&needle)) {
        return false;
      }
    }
    if self.side.is_some_and(|side| side != entry.order_side) {
      return false;
    }
    if self.status.is_some_and(|status| status != entry.order_status) {
      return false;
    }
    let day = entry.transaction_time.map(|t| t.date());
    if let Some(from) = self.from {
      if !day.is_some_and(|d| d >= from) {
        return false;
      }
    }
    if let Some(to) = self.to {
      if !day.is_some_and(|d| d <= to) {
        return false;
      }
    }
    true
  }

  pub fn apply(&self, entries: &[OrderHistoryEntry]) -> Vec<OrderHistoryEntry> {
    entries.iter().filter(|e| self.matches(e)).cloned().collect()
  }
}

/// Export of history rows, header first.
pub fn history_csv(entries: &[OrderHistoryEntry]) -> String {
  let opt = |v: Option<String>| v.unwrap_or_default();
  let mut rows = vec![[
    "Order ID", "First Name", "Last Name", "Account ID", "Equity ID", "Side", "Type",
    "Quantity", "Price", "Total Value", "Transaction Time", "Status",
  ].map(str::to_string).to_vec()];
  rows.extend(entries.iter().map(|e| vec![
    e.order_id.to_string(),
    opt(e.first_name.clone()),
    opt(e.last_name.clone()),
    e.account_id.to_string(),
    e.equity_id.to_string(),
    e.order_side.to_string(),
    e.order_type.to_string(),
    opt(e.old_order_quantity.map(|q| q.to_string())),
    opt(e.old_price.map(|p| p.to_string())),
    opt(e.total_value().map(|v| v.round_dp(2).to_string())),
    opt(e.transaction_time.map(|t| t.format("%d.%m.%Y %H:%M").to_string())),
    e.order_status.to_string(),
  ]));
  to_csv(&rows)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBookLevel {
  pub order_id: u32,
  pub price: Decimal,
  pub amount: u32,
  pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBook {
  pub equity_id: u32,
  pub equity_code: Option<String>,
  #[serde(default)]
  pub bids: Vec<OrderBookLevel>,
  #[serde(default)]
  pub asks: Vec<OrderBookLevel>,
}

impl OrderBook {
  pub fn best_bid(&self) -> Option<Decimal> {
    self.bids.iter().map(|l| l.price).max()
  }

  pub fn best_ask(&self) -> Option<Decimal> {
    self.asks.iter().map(|l| l.price).min()
  }

  pub fn spread(&self) -> Option<Decimal> {
    Some(self.best_ask()? - self.best_bid()?)
  }
}

pub async fn place_order(dispatcher: &Dispatcher, ticket: &OrderTicket) -> Result<EquityOrder, ApiError> {
  let request = ticket.validate()?;
  dispatcher.post("/equity-order", &request).await
}

pub async fn get_order(dispatcher: &Dispatcher, order_id: u32) -> Result<EquityOrder, ApiError> {
  dispatcher.get(&format!("/equity-order/{}", order_id), None).await
}

pub async fn update_order(dispatcher: &Dispatcher, order_id: u32, update: &EquityOrderUpdate) -> Result<EquityOrder, ApiError> {
  if update.order_quantity == 0 {
    return Err(ValidationError::InvalidQuantity.into());
  }
  if update.order_type == OrderType::Limit && !update.price.is_some_and(|p| p > Decimal::ZERO) {
    return Err(ValidationError::InvalidPrice.into());
  }
  dispatcher.patch(&format!("/equity-order/{}", order_id), update).await
}

pub async fn cancel_order(dispatcher: &Dispatcher, order_id: u32) -> Result<(), ApiError> {
  dispatcher.delete(&format!("/equity-order/{}", order_id)).await
}

pub async fn order_history(dispatcher: &Dispatcher, equity_id: Option<u32>) -> Result<Vec<OrderHistoryEntry>, ApiError> {
  let page: Page<OrderHistoryEntry> = match equity_id {
    Some(id) => dispatcher.get_query("/order-histories", &[("equityId", id)], None).await?,
    None => dispatcher.get("/order-histories", None).await?,
  };
  Ok(page.into_content())
}

pub async fn order_book(dispatcher: &Dispatcher, equity_id: u32) -> Result<OrderBook, ApiError> {
  dispatcher.get(&format!("/orderbook/{}", equity_id), None).await
}

/// Order book without `order_id`, so an order being edited does not show up
/// against itself.
pub async fn order_book_excluding(dispatcher: &Dispatcher, equity_id: u32, order_id: u32) -> Result<OrderBook, ApiError> {
  dispatcher.get(&format!("/orderbook/{}/exclude/{}", equity_id, order_id), None).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use reqwest::StatusCode;
  use rust_decimal_macros::dec;
  use crate::{session::Role, testing::{logged_in, spawn_backend}};

  fn ticket(order_type: OrderType, quantity: &str, limit_price: &str) -> OrderTicket {
    OrderTicket {
      account_id: Some(10),
      equity_id: Some(3),
      side: OrderSide::Buy,
      order_type,
      quantity: quantity.to_string(),
      limit_price: limit_price.to_string(),
      market_price: Some(dec!(262.75)),
    }
  }

  #[test]
  fn limit_order_requires_positive_price() {
    assert_eq!(ticket(OrderType::Limit, "10", "").validate(), Err(ValidationError::InvalidPrice));
    assert_eq!(ticket(OrderType::Limit, "10", "-1").validate(), Err(ValidationError::InvalidPrice));
    assert_eq!(ticket(OrderType::Limit, "10", "0").validate(), Err(ValidationError::InvalidPrice));
    let request = ticket(OrderType::Limit, "10", "261.5").validate().unwrap();
    assert_eq!(request.price, Some(dec!(261.5)));
  }

  #[test]
  fn market_order_carries_last_price() {
    let request = ticket(OrderType::Market, " 25 ", "ignored").validate().unwrap();
    assert_eq!(request.order_quantity, 25);
    assert_eq!(request.price, Some(dec!(262.75)));
  }

  #[test]
  fn quantity_and_selection_checked_first() {
    assert_eq!(ticket(OrderType::Market, "0", "").validate(), Err(ValidationError::InvalidQuantity));
    assert_eq!(ticket(OrderType::Market, "1.5", "").validate(), Err(ValidationError::InvalidQuantity));
    let mut no_stock = ticket(OrderType::Market, "5", "");
    no_stock.equity_id = None;
    assert_eq!(no_stock.validate(), Err(ValidationError::Missing("a stock")));
    let mut no_account = ticket(OrderType::Market, "5", "");
    no_account.account_id = None;
    assert_eq!(no_account.validate(), Err(ValidationError::Missing("an account and stock")));
  }

  #[test]
  fn request_uses_wire_names() {
    let request = ticket(OrderType::Limit, "10", "261.5").validate().unwrap();
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["orderSide"], "BUY");
    assert_eq!(json["orderType"], "LIMIT");
    assert_eq!(json["orderQuantity"], 10);
    assert_eq!(json["accountId"], 10);
  }

  #[test]
  fn book_spread() {
    let book: OrderBook = serde_json::from_str(r#"{
      "equityId": 3, "equityCode": "THYAO.E",
      "bids": [{"orderId": 1, "price": 262.5, "amount": 100, "total": 26250}, {"orderId": 2, "price": 261, "amount": 5, "total": 1305}],
      "asks": [{"orderId": 3, "price": 263, "amount": 50, "total": 13150}]
    }"#).unwrap();
    assert_eq!(book.best_bid(), Some(dec!(262.5)));
    assert_eq!(book.spread(), Some(dec!(0.5)));
  }

  #[tokio::test]
  async fn placed_order_comes_back_pending() {
    let base = spawn_backend().await;
    let (dispatcher, _nav) = logged_in(&base, Role::Trader);
    let order = place_order(&dispatcher, &ticket(OrderType::Limit, "10", "261.5")).await.unwrap();
    assert_eq!(order.order_id, 501);
    assert_eq!(order.final_status, OrderStatus::Pending);
    assert!(order.final_status.is_open());
    assert_eq!(order.price, Some(dec!(261.5)));
  }

  #[tokio::test]
  async fn oversized_order_is_a_domain_rejection() {
    let base = spawn_backend().await;
    let (dispatcher, nav) = logged_in(&base, Role::Trader);
    let err = place_order(&dispatcher, &ticket(OrderType::Market, "5000", "")).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::EXPECTATION_FAILED));
    assert_eq!(err.user_message("Failed to place buy order"), "Insufficient free balance for order");
    assert!(nav.visited().is_empty());
  }

  #[tokio::test]
  async fn fetches_order_book() {
    let base = spawn_backend().await;
    let (dispatcher, _nav) = logged_in(&base, Role::Trader);
    let book = order_book(&dispatcher, 3).await.unwrap();
    assert_eq!(book.equity_id, 3);
    assert_eq!(book.best_ask(), Some(dec!(263)));
    assert_eq!(book.bids.len(), 2);

    let without = order_book_excluding(&dispatcher, 3, 13).await.unwrap();
    assert_eq!(without.bids.len(), 1);
    assert!(without.bids.iter().all(|l| l.order_id != 13));
  }

  #[tokio::test]
  async fn edit_open_order() {
    let base = spawn_backend().await;
    let (dispatcher, _nav) = logged_in(&base, Role::Trader);

    let order = get_order(&dispatcher, 13).await.unwrap();
    assert_eq!(order.order_quantity, 10);
    assert_eq!(order.order_type, OrderType::Limit);

    let update = EquityOrderUpdate { order_quantity: 15, price: Some(dec!(262)), order_type: OrderType::Limit };
    let updated = update_order(&dispatcher, 13, &update).await.unwrap();
    assert_eq!(updated.order_quantity, 15);
    assert_eq!(updated.price, Some(dec!(262)));
    assert_eq!(updated.final_status, OrderStatus::Updated);

    cancel_order(&dispatcher, 13).await.unwrap();
  }

  #[tokio::test]
  async fn history_filters_by_equity() {
    let base = spawn_backend().await;
    let (dispatcher, _nav) = logged_in(&base, Role::Trader);

    let all = order_history(&dispatcher, None).await.unwrap();
    assert_eq!(all.len(), 2);
    let thy = order_history(&dispatcher, Some(3)).await.unwrap();
    assert_eq!(thy.len(), 1);
    assert_eq!(thy[0].order_id, 13);
    assert!(thy[0].order_status.is_open());
    assert_eq!(thy[0].old_price, Some(dec!(261.5)));
    assert_eq!(thy[0].transaction_time.map(|t| t.date()), Some(day("2025-06-02")));
    assert_eq!(thy[0].customer_name(), "Ayse Yilmaz");
  }

  fn entry(order_id: u32, first: &str, side: OrderSide, status: OrderStatus, time: Option<&str>) -> OrderHistoryEntry {
    OrderHistoryEntry {
      history_id: order_id,
      order_id,
      account_id: 10,
      equity_id: 3,
      first_name: Some(first.to_string()),
      last_name: Some("Yilmaz".to_string()),
      order_status: status,
      order_side: side,
      order_type: OrderType::Limit,
      old_order_quantity: Some(10),
      old_price: Some(dec!(261.5)),
      transaction_time: time.map(|t| t.parse().unwrap()),
    }
  }

  fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
  }

  #[test]
  fn history_filter_narrows_entries() {
    let entries = vec![
      entry(1, "Ayse", OrderSide::Buy, OrderStatus::Pending, Some("2025-06-02T10:15:30")),
      entry(2, "Mehmet", OrderSide::Sell, OrderStatus::Filled, Some("2025-05-20T09:00:00")),
      entry(3, "Ayla", OrderSide::Buy, OrderStatus::Cancelled, Some("2025-04-01T09:00:00")),
      entry(4, "Ayse", OrderSide::Buy, OrderStatus::Pending, None),
    ];
    let ids = |filter: &HistoryFilter| filter.apply(&entries).iter().map(|e| e.order_id).collect::<Vec<_>>();

    assert_eq!(ids(&HistoryFilter::default()), vec![1, 2, 3, 4]);
    assert_eq!(ids(&HistoryFilter { customer: " AY ".into(), ..HistoryFilter::default() }), vec![1, 3, 4]);
    assert_eq!(ids(&HistoryFilter { customer: "ayse yil".into(), ..HistoryFilter::default() }), vec![1, 4]);
    assert_eq!(ids(&HistoryFilter { side: Some(OrderSide::Sell), ..HistoryFilter::default() }), vec![2]);
    assert_eq!(ids(&HistoryFilter { status: Some(OrderStatus::Pending), ..HistoryFilter::default() }), vec![1, 4]);

    let recent = HistoryFilter::last_days(day("2025-06-02"), HISTORY_DEFAULT_DAYS);
    assert_eq!(recent.from, Some(day("2025-05-03")));
    assert_eq!(ids(&recent), vec![1, 2]);

    let one_day = HistoryFilter { from: Some(day("2025-05-20")), to: Some(day("2025-05-20")), ..HistoryFilter::default() };
    assert_eq!(ids(&one_day), vec![2]);
  }

  #[test]
  fn history_export_has_header_and_totals() {
    let entries = vec![entry(13, "Ayse", OrderSide::Buy, OrderStatus::PartiallyFilled, Some("2025-06-02T10:15:30"))];
    let csv = history_csv(&entries);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Order ID,First Name,Last Name"));
    assert_eq!(lines[1], "13,Ayse,Yilmaz,10,3,BUY,LIMIT,10,261.5,2615.0,02.06.2025 10:15,PARTIALLY_FILLED");
  }

  #[test]
  fn statuses_parse_from_wire_names() {
    for status in OrderStatus::ALL {
      assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
      assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
    }
    assert_eq!("SELL".parse::<OrderSide>(), Ok(OrderSide::Sell));
    assert!("HOLD".parse::<OrderSide>().is_err());
  }

  #[tokio::test]
  async fn invalid_update_is_not_sent() {
    // unroutable base, a request that went out would fail as Transport
    let (dispatcher, _nav) = logged_in("http://127.0.0.1:9/api/v1", Role::Trader);
    let no_price = EquityOrderUpdate { order_quantity: 5, price: None, order_type: OrderType::Limit };
    let err = update_order(&dispatcher, 13, &no_price).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(ValidationError::InvalidPrice)));
    let empty = EquityOrderUpdate { order_quantity: 0, price: None, order_type: OrderType::Market };
    let err = update_order(&dispatcher, 13, &empty).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(ValidationError::InvalidQuantity)));
  }
}
