use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{dispatch::Dispatcher, error::ApiError};

/// One execution of a matched order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
  pub trade_id: u32,
  pub match_id: Option<u32>,
  pub equity_order_id: u32,
  pub trade_quantity: u32,
  pub price: Decimal,
  pub commission: Option<Decimal>,
  pub transaction_time: Option<NaiveDateTime>,
}

impl Trade {
  pub fn total_value(&self) -> Decimal {
    self.price * Decimal::from(self.trade_quantity)
  }
}

/// Trades already settled at end of day.
pub async fn settled_trades(dispatcher: &Dispatcher) -> Result<Vec<Trade>, ApiError> {
  dispatcher.get("/trades/settled", None).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;
  use crate::{session::Role, testing::{logged_in, spawn_backend}};

  #[tokio::test]
  async fn settled_trades_with_totals() {
    let base = spawn_backend().await;
    let (dispatcher, _nav) = logged_in(&base, Role::Trader);

    let trades = settled_trades(&dispatcher).await.unwrap();
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].equity_order_id, 13);
    assert_eq!(trades[0].total_value(), dec!(1307.5));
    assert_eq!(trades[0].commission, Some(dec!(2.5)));
    assert_eq!(trades[1].match_id, None);
    assert!(trades[1].transaction_time.is_none());
  }
}
