use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::{dispatch::Dispatcher, error::ApiError};
use super::{Page, SearchQuery};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityInfo {
  pub equity_id: u32,
  pub asset_code: String,
  pub ticker: Option<String>,
  pub equity_name: Option<String>,
  pub market: Option<String>,
  pub country: Option<String>,
  #[serde(default)]
  pub participation: bool,
}

/// One day of prices for an equity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityPrice {
  pub equity_id: u32,
  pub ticker: Option<String>,
  pub asset_code: String,
  pub equity_name: Option<String>,
  pub market: Option<String>,
  pub open_price: Option<Decimal>,
  pub close_price: Option<Decimal>,
  pub high_price: Option<Decimal>,
  pub low_price: Option<Decimal>,
  pub data_date: Option<NaiveDate>,
  #[serde(default)]
  pub participation: bool,
}

impl EquityPrice {
  /// Daily change in percent from open to close.
  pub fn change_pct(&self) -> Option<Decimal> {
    let (open, close) = (self.open_price?, self.close_price?);
    if open.is_zero() {
      return None;
    }
    Some(((close - open) / open * Decimal::ONE_HUNDRED).round_dp(2))
  }
}

pub async fn search_equities(dispatcher: &Dispatcher, search: &str, size: u32, cancel: Option<&CancellationToken>) -> Result<Vec<EquityPrice>, ApiError> {
  let page: Page<EquityPrice> = dispatcher.get_query("/equities", &SearchQuery { search, size }, cancel).await?;
  Ok(page.into_content())
}

pub async fn equity_info(dispatcher: &Dispatcher, asset_code: &str) -> Result<EquityInfo, ApiError> {
  dispatcher.get(&format!("/equities/{}/info", asset_code), None).await
}

/// Price history, oldest first as the backend returns it.
pub async fn equity_prices(dispatcher: &Dispatcher, asset_code: &str) -> Result<Vec<EquityPrice>, ApiError> {
  dispatcher.get(&format!("/equities/{}/prices", asset_code), None).await
}
