use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{
  dispatch::Dispatcher,
  error::{ApiError, ValidationError},
  session::Role,
};
use super::{auth::MIN_CREDENTIAL_LEN, customers::Customer, Page, SearchQuery};

/// Back-office staff member.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
  pub id: u32,
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub role: Role,
  #[serde(default)]
  pub enabled: bool,
  #[serde(default)]
  pub customers: Vec<Customer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
  pub email: String,
  pub password: String,
  pub first_name: String,
  pub last_name: String,
  pub role: Role,
}

impl NewEmployee {
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
      return Err(ValidationError::Required("a first and last name"));
    }
    if !self.email.contains('@') {
      return Err(ValidationError::InvalidEmail);
    }
    if self.password.chars().count() < MIN_CREDENTIAL_LEN {
      return Err(ValidationError::CredentialsTooShort(MIN_CREDENTIAL_LEN));
    }
    Ok(())
  }
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub password: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub first_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub role: Option<Role>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub enabled: Option<bool>,
}

impl EmployeePatch {
  /// Flips the account between enabled and disabled.
  pub fn toggle(employee: &Employee) -> Self {
    Self { enabled: Some(!employee.enabled), ..Self::default() }
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
    if blank(&self.first_name) || blank(&self.last_name) {
      return Err(ValidationError::Required("a first and last name"));
    }
    if self.email.as_deref().is_some_and(|e| !e.contains('@')) {
      return Err(ValidationError::InvalidEmail);
    }
    if self.password.as_deref().is_some_and(|p| p.chars().count() < MIN_CREDENTIAL_LEN) {
      return Err(ValidationError::CredentialsTooShort(MIN_CREDENTIAL_LEN));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerIds<'a> {
  customer_ids: &'a [u32],
}

pub async fn search_employees(dispatcher: &Dispatcher, search: &str, size: u32, cancel: Option<&CancellationToken>) -> Result<Vec<Employee>, ApiError> {
  let page: Page<Employee> = dispatcher.get_query("/users", &SearchQuery { search, size }, cancel).await?;
  Ok(page.into_content())
}

/// One employee with the customers assigned to them.
pub async fn get_employee(dispatcher: &Dispatcher, id: u32) -> Result<Employee, ApiError> {
  dispatcher.get(&format!("/users/{}", id), None).await
}

pub async fn update_employee(dispatcher: &Dispatcher, id: u32, patch: &EmployeePatch) -> Result<Employee, ApiError> {
  patch.validate()?;
  dispatcher.patch(&format!("/users/{}", id), patch).await
}

pub async fn create_employee(dispatcher: &Dispatcher, employee: &NewEmployee) -> Result<Employee, ApiError> {
  employee.validate()?;
  dispatcher.post("/users", employee).await
}

pub async fn assign_customers(dispatcher: &Dispatcher, trader_id: u32, customer_ids: &[u32]) -> Result<Employee, ApiError> {
  if customer_ids.is_empty() {
    return Err(ValidationError::Missing("at least one customer").into());
  }
  dispatcher.post(&format!("/users/{}/customers", trader_id), &CustomerIds { customer_ids }).await
}

pub async fn unassign_customers(dispatcher: &Dispatcher, trader_id: u32, customer_ids: &[u32]) -> Result<Employee, ApiError> {
  if customer_ids.is_empty() {
    return Err(ValidationError::Missing("at least one customer").into());
  }
  dispatcher.delete_with(&format!("/users/{}/customers", trader_id), &CustomerIds { customer_ids }).await
}

pub async fn unassign_all_customers(dispatcher: &Dispatcher, trader_id: u32) -> Result<(), ApiError> {
  dispatcher.delete(&format!("/users/{}/customers/all", trader_id)).await
}
