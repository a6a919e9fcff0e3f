use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{dispatch::Dispatcher, error::ApiError};
use super::to_csv;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioHolding {
  pub equity_id: u32,
  pub symbol: String,
  pub free_qty: Decimal,
  pub blocked_qty: Decimal,
  pub total_qty: Decimal,
  pub avg_cost: Option<Decimal>,
  pub cost_basis: Option<Decimal>,
  pub last_close_price: Option<Decimal>,
  pub market_value: Option<Decimal>,
  pub unrealized_pnl: Option<Decimal>,
  pub unrealized_pnl_pct: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioReport {
  pub account_id: u32,
  pub user_full_name: Option<String>,
  pub account_type: Option<String>,
  pub identity_number: Option<String>,
  pub free_cash: Decimal,
  pub blocked_cash: Decimal,
  pub total_cash: Decimal,
  #[serde(default)]
  pub holdings: Vec<PortfolioHolding>,
  pub holdings_value: Decimal,
  pub portfolio_value: Decimal,
  pub total_unrealized_pnl: Option<Decimal>,
  pub total_unrealized_pnl_pct: Option<Decimal>,
}

impl PortfolioReport {
  /// Share of each holding in the total portfolio value, in percent.
  pub fn allocation(&self) -> Vec<(String, Decimal)> {
    if self.portfolio_value.is_zero() {
      return Vec::new();
    }
    self.holdings.iter()
      .map(|h| {
        let value = h.market_value.unwrap_or_default();
        (h.symbol.clone(), (value / self.portfolio_value * Decimal::ONE_HUNDRED).round_dp(2))
      })
      .collect()
  }

  /// Rows for a CSV export: header first.
  pub fn csv_rows(&self) -> Vec<Vec<String>> {
    let opt = |d: Option<Decimal>| d.map(|v| v.to_string()).unwrap_or_default();
    let mut rows = vec![vec![
      "Symbol".to_string(), "Quantity".to_string(), "Avg Cost".to_string(),
      "Last Close".to_string(), "Market Value".to_string(), "Unrealized P/L".to_string(),
    ]];
    rows.extend(self.holdings.iter().map(|h| vec![
      h.symbol.clone(),
      h.total_qty.to_string(),
      opt(h.avg_cost),
      opt(h.last_close_price),
      opt(h.market_value),
      opt(h.unrealized_pnl),
    ]));
    rows
  }

  /// `csv_rows` joined as comma separated text, quoting where needed.
  pub fn to_csv(&self) -> String {
    to_csv(&self.csv_rows())
  }
}

pub async fn portfolio_report(dispatcher: &Dispatcher, account_id: u32) -> Result<PortfolioReport, ApiError> {
  dispatcher.get_query("/report/portfolio", &[("accountId", account_id)], None).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;
  use crate::{session::Role, testing::{logged_in, spawn_backend}};

  #[tokio::test]
  async fn report_for_account() {
    let base = spawn_backend().await;
    let (dispatcher, _nav) = logged_in(&base, Role::Analyst);

    let report = portfolio_report(&dispatcher, 10).await.unwrap();
    assert_eq!(report.account_id, 10);
    assert_eq!(report.holdings.len(), 1);
    assert_eq!(report.total_cash, dec!(1600.25));

    let allocation = report.allocation();
    assert_eq!(allocation[0].0, "THYAO.E");
    assert_eq!(allocation[0].1, (dec!(10510) / dec!(12110.25) * dec!(100)).round_dp(2));

    let rows = report.csv_rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "THYAO.E");
    assert_eq!(rows[1][1], "40");
    assert!(report.to_csv().starts_with("Symbol,Quantity,Avg Cost"));
  }
}
