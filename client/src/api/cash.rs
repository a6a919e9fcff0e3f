use rust_decimal::Decimal;
use serde::{de::IgnoredAny, Serialize};

use crate::{dispatch::Dispatcher, error::{ApiError, ValidationError}};
use super::orders::positive_decimal;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashMovement {
  pub account_id: u32,
  pub amount: Decimal,
}

impl CashMovement {
  pub fn parse(account_id: Option<u32>, amount: &str) -> Result<Self, ValidationError> {
    let amount = positive_decimal(amount).ok_or(ValidationError::InvalidAmount)?;
    let account_id = account_id.ok_or(ValidationError::Missing("an account"))?;
    Ok(Self { account_id, amount })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashTransfer {
  pub sender_account_id: u32,
  pub receiver_account_id: u32,
  pub amount: Decimal,
}

impl CashTransfer {
  pub fn parse(sender: Option<u32>, receiver: Option<u32>, amount: &str) -> Result<Self, ValidationError> {
    let amount = positive_decimal(amount).ok_or(ValidationError::InvalidAmount)?;
    let sender_account_id = sender.ok_or(ValidationError::Missing("a sender account"))?;
    let receiver_account_id = receiver.ok_or(ValidationError::Missing("a receiver account"))?;
    if sender_account_id == receiver_account_id {
      return Err(ValidationError::SameAccount);
    }
    Ok(Self { sender_account_id, receiver_account_id, amount })
  }
}

pub async fn deposit(dispatcher: &Dispatcher, movement: &CashMovement) -> Result<(), ApiError> {
  let _: IgnoredAny = dispatcher.post("/cash/deposit", movement).await?;
  Ok(())
}

pub async fn withdraw(dispatcher: &Dispatcher, movement: &CashMovement) -> Result<(), ApiError> {
  let _: IgnoredAny = dispatcher.post("/cash/withdraw", movement).await?;
  Ok(())
}

pub async fn transfer(dispatcher: &Dispatcher, transfer: &CashTransfer) -> Result<(), ApiError> {
  let _: IgnoredAny = dispatcher.post("/cash/transfer", transfer).await?;
  Ok(())
}
