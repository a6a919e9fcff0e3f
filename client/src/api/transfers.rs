use rust_decimal::Decimal;
use serde::{de::IgnoredAny, Deserialize, Serialize};

use crate::{dispatch::Dispatcher, error::{ApiError, ValidationError}};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OtherInstitution {
  pub id: u32,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTransfer {
  pub from_account_id: u32,
  pub to_account_id: u32,
  pub equity_id: u32,
  pub transfer_quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioToExternal {
  pub from_account_id: u32,
  pub equity_id: u32,
  pub transfer_quantity: u32,
  pub other_institution_id: u32,
  /// Tax or national id of the receiving party.
  #[serde(rename = "tckn_vergi_no")]
  pub tax_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalToPortfolio {
  pub to_account_id: u32,
  pub equity_id: u32,
  pub other_institution_id: u32,
  pub transfer_quantity: u32,
  #[serde(rename = "tckn_vergi_no")]
  pub tax_id: u64,
  pub avg_cost: Decimal,
}

fn check_quantity(quantity: u32) -> Result<(), ValidationError> {
  if quantity == 0 { Err(ValidationError::InvalidQuantity) } else { Ok(()) }
}

pub async fn other_institutions(dispatcher: &Dispatcher) -> Result<Vec<OtherInstitution>, ApiError> {
  dispatcher.get("/other-institution", None).await
}

pub async fn portfolio_to_portfolio(dispatcher: &Dispatcher, transfer: &PortfolioTransfer) -> Result<(), ApiError> {
  check_quantity(transfer.transfer_quantity)?;
  if transfer.from_account_id == transfer.to_account_id {
    return Err(ValidationError::SameAccount.into());
  }
  let _: IgnoredAny = dispatcher.post("/equity-transfers/portfolio-to-portfolio", transfer).await?;
  Ok(())
}

pub async fn portfolio_to_external(dispatcher: &Dispatcher, transfer: &PortfolioToExternal) -> Result<(), ApiError> {
  check_quantity(transfer.transfer_quantity)?;
  let _: IgnoredAny = dispatcher.post("/equity-transfers/portfolio-to-external", transfer).await?;
  Ok(())
}

pub async fn external_to_portfolio(dispatcher: &Dispatcher, transfer: &ExternalToPortfolio) -> Result<(), ApiError> {
  check_quantity(transfer.transfer_quantity)?;
  if transfer.avg_cost <= Decimal::ZERO {
    return Err(ValidationError::InvalidPrice.into());
  }
  let _: IgnoredAny = dispatcher.post("/equity-transfers/external-to-portfolio", transfer).await?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use reqwest::StatusCode;
  use rust_decimal_macros::dec;
  use crate::{session::Role, testing::{logged_in, spawn_backend}};

  #[test]
  fn external_transfer_keeps_backend_field_name() {
    let transfer = PortfolioToExternal {
      from_account_id: 10,
      equity_id: 3,
      transfer_quantity: 5,
      other_institution_id: 2,
      tax_id: 12345678901,
    };
    let json = serde_json::to_value(&transfer).unwrap();
    assert_eq!(json["tckn_vergi_no"], 12345678901u64);
    assert_eq!(json["otherInstitutionId"], 2);
  }

  #[test]
  fn incoming_transfer_serializes_cost() {
    let transfer = ExternalToPortfolio {
      to_account_id: 10,
      equity_id: 3,
      other_institution_id: 2,
      transfer_quantity: 5,
      tax_id: 1,
      avg_cost: dec!(12.5),
    };
    let json = serde_json::to_value(&transfer).unwrap();
    assert_eq!(json["avgCost"], 12.5);
  }

  #[tokio::test]
  async fn internal_transfer_round() {
    let base = spawn_backend().await;
    let (dispatcher, nav) = logged_in(&base, Role::Trader);

    let institutions = other_institutions(&dispatcher).await.unwrap();
    assert_eq!(institutions.len(), 2);
    assert_eq!(institutions[1].name, "Garanti BBVA Yatirim");

    let mut transfer = PortfolioTransfer { from_account_id: 10, to_account_id: 10, equity_id: 3, transfer_quantity: 5 };
    let err = portfolio_to_portfolio(&dispatcher, &transfer).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(ValidationError::SameAccount)));

    transfer.to_account_id = 20;
    portfolio_to_portfolio(&dispatcher, &transfer).await.unwrap();

    transfer.transfer_quantity = 400;
    let err = portfolio_to_portfolio(&dispatcher, &transfer).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::PRECONDITION_FAILED));
    assert_eq!(err.user_message("Transfer failed"), "Insufficient free quantity");
    assert!(nav.visited().is_empty());
  }
}
