//! Transient page banners.
//!
//! Pages show at most one banner at a time. Each banner gets an id, and the
//! timer that hides it carries that id, so a late timer from an older banner
//! never hides a newer one.

use std::{fmt, time::Duration};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  Success,
  Error,
}

impl Severity {
  pub fn as_str(&self) -> &'static str {
    match self {
      Severity::Success => "success",
      Severity::Error => "error",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
  pub id: u64,
  pub severity: Severity,
  pub message: String,
}

impl fmt::Display for Alert {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.message)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alerts {
  timeout: Duration,
  next_id: u64,
  current: Option<Alert>,
}

impl Alerts {
  pub fn new(timeout: Duration) -> Self {
    Self { timeout, next_id: 0, current: None }
  }

  pub fn timeout(&self) -> Duration {
    self.timeout
  }

  pub fn current(&self) -> Option<&Alert> {
    self.current.as_ref()
  }

  /// Replaces whatever is showing and returns the new banner's id.
  pub fn show(&mut self, severity: Severity, message: impl Into<String>) -> u64 {
    self.next_id += 1;
    self.current = Some(Alert { id: self.next_id, severity, message: message.into() });
    self.next_id
  }

  pub fn success(&mut self, message: impl Into<String>) -> u64 {
    self.show(Severity::Success, message)
  }

  /// Shows the backend's message for `err`, or `fallback` when it sent none.
  /// A cancelled request shows nothing.
  pub fn failure(&mut self, err: &ApiError, fallback: &str) -> Option<u64> {
    if err.is_cancelled() {
      return None;
    }
    Some(self.show(Severity::Error, err.user_message(fallback)))
  }

  /// Hides the banner `id` if it is still the one showing.
  pub fn expire(&mut self, id: u64) -> bool {
    if self.current.as_ref().is_some_and(|a| a.id == id) {
      self.current = None;
      return true;
    }
    false
  }

  pub fn dismiss(&mut self) {
    self.current = None;
  }
}
