use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{dispatch::Dispatcher, error::{ApiError, ValidationError}};
use super::{Page, SearchQuery};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashBalance {
  pub balance_id: u32,
  pub free_balance: Decimal,
  pub blocked_balance: Decimal,
  pub total_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityHolding {
  pub equity_id: u32,
  pub asset_code: String,
  pub asset_name: Option<String>,
  pub total_quantity: u32,
  pub average_cost: Option<Decimal>,
  pub close_price: Option<Decimal>,
  pub profit_loss_percentage: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
  pub account_id: u32,
  pub account_type: String,
  pub cash_balance: Option<CashBalance>,
  #[serde(default)]
  pub equities: Vec<EquityHolding>,
}

impl Account {
  pub fn free_cash(&self) -> Decimal {
    self.cash_balance.as_ref().map(|b| b.free_balance).unwrap_or_default()
  }

  pub fn holding(&self, equity_id: u32) -> Option<&EquityHolding> {
    self.equities.iter().find(|h| h.equity_id == equity_id)
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
  pub customer_id: u32,
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub identity_number: String,
  pub trading_permission: Option<String>,
  #[serde(default)]
  pub trading_enabled: bool,
  #[serde(default)]
  pub accounts: Vec<Account>,
  pub created_at: Option<NaiveDateTime>,
  pub updated_at: Option<NaiveDateTime>,
}

impl Customer {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }

  pub fn account(&self, account_id: u32) -> Option<&Account> {
    self.accounts.iter().find(|a| a.account_id == account_id)
  }
}

pub const INDIVIDUAL: &str = "INDIVIDUAL";
/// Corporate customers carry a tax number instead of a national id and no
/// last name of their own.
pub const CORPORATE: &str = "CORPORATE";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerForm {
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub identity_number: String,
  pub trading_permission: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub account_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_id: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub trading_enabled: Option<bool>,
}

impl CustomerForm {
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
      return Err(ValidationError::Required("a first and last name"));
    }
    if !self.email.contains('@') {
      return Err(ValidationError::InvalidEmail);
    }
    let corporate = self.account_type.as_deref() == Some(CORPORATE);
    let (digits, what) = if corporate {
      (10, "a 10 digit tax number")
    } else {
      (11, "an 11 digit identity number")
    };
    if self.identity_number.len() != digits || !self.identity_number.chars().all(|c| c.is_ascii_digit()) {
      return Err(ValidationError::Required(what));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountCreate<'a> {
  customer_id: u32,
  account_type: &'a str,
}

pub async fn search_customers(dispatcher: &Dispatcher, search: &str, size: u32, cancel: Option<&CancellationToken>) -> Result<Vec<Customer>, ApiError> {
  let page: Page<Customer> = dispatcher.get_query("/customers", &SearchQuery { search, size }, cancel).await?;
  Ok(page.into_content())
}

pub async fn get_customer(dispatcher: &Dispatcher, customer_id: u32) -> Result<Customer, ApiError> {
  dispatcher.get(&format!("/customers/{}", customer_id), None).await
}

pub async fn create_customer(dispatcher: &Dispatcher, form: &CustomerForm) -> Result<Customer, ApiError> {
  form.validate()?;
  dispatcher.post("/customers", form).await
}

pub async fn update_customer(dispatcher: &Dispatcher, customer_id: u32, form: &CustomerForm) -> Result<Customer, ApiError> {
  form.validate()?;
  dispatcher.put(&format!("/customers/{}", customer_id), form).await
}

pub async fn customer_accounts(dispatcher: &Dispatcher, customer_id: u32) -> Result<Vec<Account>, ApiError> {
  dispatcher.get(&format!("/accounts/customer/{}", customer_id), None).await
}

pub async fn create_account(dispatcher: &Dispatcher, customer_id: u32, account_type: &str) -> Result<Account, ApiError> {
  dispatcher.post("/accounts", &AccountCreate { customer_id, account_type }).await
}

pub async fn delete_account(dispatcher: &Dispatcher, account_id: u32) -> Result<(), ApiError> {
  dispatcher.delete(&format!("/accounts/{}", account_id)).await
}
