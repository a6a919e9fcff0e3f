use chrono::NaiveDate;
use serde::Deserialize;

use crate::{dispatch::Dispatcher, error::ApiError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndOfDayOutcome {
  pub system_date: Option<NaiveDate>,
  pub date_after_eod: Option<NaiveDate>,
  pub message: Option<String>,
}

/// Business date the backend is currently running on.
pub async fn system_date(dispatcher: &Dispatcher) -> Result<NaiveDate, ApiError> {
  dispatcher.get("/system-date", None).await
}

/// Runs the end-of-day batch; settlement happens server side.
pub async fn trigger_end_of_day(dispatcher: &Dispatcher) -> Result<EndOfDayOutcome, ApiError> {
  dispatcher.post_empty("/system-date/trigger-eod").await
}

pub async fn reset_to_today(dispatcher: &Dispatcher) -> Result<NaiveDate, ApiError> {
  dispatcher.post_empty("/system-date/reset-to-today").await
}
