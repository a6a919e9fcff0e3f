use std::{collections::HashMap, fmt};
use reqwest::StatusCode;
use serde_json::{Map, Value};
use thiserror::Error;

/// Statuses the backend uses for business-rule rejections. They are handed
/// back to the caller untouched.
pub const DOMAIN_REJECTION_STATUSES: [u16; 4] = [412, 413, 417, 418];

/// Error body produced by the backend's global exception handler. Every field
/// is optional since not every endpoint (or proxy in front of it) honours it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorEnvelope {
  pub error: Option<String>,
  pub status: Option<u16>,
  pub message: Option<String>,
  pub path: Option<String>,
  pub timestamp: Option<String>,
  pub validation_errors: Option<HashMap<String, Option<String>>>,
}

impl ErrorEnvelope {
  /// Reads each field on its own. A field of an unexpected shape is skipped
  /// instead of discarding the rest of the envelope.
  pub fn parse(body: &str) -> Option<Self> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;
    Some(Self {
      error: text(object, "error"),
      status: object.get("status").and_then(Value::as_u64).and_then(|s| u16::try_from(s).ok()),
      message: text(object, "message"),
      path: text(object, "path"),
      timestamp: text(object, "timestamp"),
      validation_errors: object.get("validationErrors").and_then(Value::as_object).map(|fields| {
        fields
          .iter()
          .map(|(field, reason)| (field.clone(), reason.as_str().map(str::to_string)))
          .collect()
      }),
    })
  }
}

fn text(object: &Map<String, Value>, key: &str) -> Option<String> {
  object.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Raw response body of a failed call, kept as received.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBody {
  pub raw: String,
  pub envelope: Option<ErrorEnvelope>,
}

impl ErrorBody {
  pub fn new(raw: String) -> Self {
    let envelope = ErrorEnvelope::parse(&raw);
    Self { raw, envelope }
  }

  pub fn message(&self) -> Option<&str> {
    let envelope = self.envelope.as_ref()?;
    [envelope.message.as_deref(), envelope.error.as_deref()]
      .into_iter()
      .flatten()
      .find(|m| !m.trim().is_empty())
  }
}

impl fmt::Display for ErrorBody {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.message() {
      Some(msg) => write!(f, "{}", msg),
      None => write!(f, "{}", self.raw),
    }
  }
}

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Authentication error: {status} {body}")]
  Unauthorized { status: StatusCode, body: ErrorBody },
  #[error("Request rejected: {status} {body}")]
  Rejected { status: StatusCode, body: ErrorBody },
  #[error("Server error: {status} {body}")]
  Status { status: StatusCode, body: ErrorBody },
  #[error("Transport error: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("Deserialize error: {0}")]
  Decode(#[from] serde_json::Error),
  #[error("Invalid request url: {0}")]
  InvalidUrl(String),
  #[error("Request cancelled")]
  Cancelled,
  #[error(transparent)]
  Validation(#[from] ValidationError),
}

impl ApiError {
  pub fn status(&self) -> Option<StatusCode> {
    match self {
      Self::Unauthorized { status, .. } | Self::Rejected { status, .. } | Self::Status { status, .. } => Some(*status),
      Self::Transport(e) => e.status(),
      _ => None,
    }
  }

  pub fn body(&self) -> Option<&ErrorBody> {
    match self {
      Self::Unauthorized { body, .. } | Self::Rejected { body, .. } | Self::Status { body, .. } => Some(body),
      _ => None,
    }
  }

  pub fn is_cancelled(&self) -> bool {
    matches!(self, Self::Cancelled)
  }

  /// Best-effort human readable text for an alert banner.
  pub fn user_message(&self, fallback: &str) -> String {
    match self {
      Self::Validation(e) => e.to_string(),
      _ => self.body()
        .and_then(ErrorBody::message)
        .unwrap_or(fallback)
        .to_string(),
    }
  }
}

/// Client-side input problems, raised before any request is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("Email and password must be at least {0} characters.")]
  CredentialsTooShort(usize),
  #[error("Please enter a valid quantity")]
  InvalidQuantity,
  #[error("Please enter a valid price")]
  InvalidPrice,
  #[error("Please enter a valid amount")]
  InvalidAmount,
  #[error("Please select {0}")]
  Missing(&'static str),
  #[error("Please enter {0}")]
  Required(&'static str),
  #[error("Please enter a valid email address")]
  InvalidEmail,
  #[error("Sender and receiver accounts must differ")]
  SameAccount,
  #[error("Please enter the complete {0}-digit code")]
  IncompleteCode(usize),
  #[error("Passwords do not match")]
  PasswordMismatch,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn envelope_message_preferred_over_error() {
    let body = ErrorBody::new(r#"{"error":"Conflict","status":412,"message":"Insufficient free balance","path":"/api/v1/cash/withdraw"}"#.to_string());
    assert_eq!(body.message(), Some("Insufficient free balance"));
    assert_eq!(body.envelope.as_ref().and_then(|e| e.status), Some(412));
  }

  #[test]
  fn malformed_fields_keep_the_message() {
    let body = ErrorBody::new(r#"{"status":400,"message":"Validation failed","validationErrors":{"email":null,"password":"too short"}}"#.to_string());
    assert_eq!(body.message(), Some("Validation failed"));
    let fields = body.envelope.as_ref().and_then(|e| e.validation_errors.clone()).unwrap();
    assert_eq!(fields.get("email"), Some(&None));
    assert_eq!(fields.get("password"), Some(&Some("too short".to_string())));

    let body = ErrorBody::new(r#"{"error":"Bad Request","timestamp":[2025,6,2,10,15,30]}"#.to_string());
    assert_eq!(body.message(), Some("Bad Request"));
    assert_eq!(body.envelope.as_ref().and_then(|e| e.timestamp.clone()), None);
  }

  #[test]
  fn non_json_body_has_no_message() {
    let body = ErrorBody::new("<html>bad gateway</html>".to_string());
    assert!(body.envelope.is_none());
    assert_eq!(body.message(), None);
    assert_eq!(body.to_string(), "<html>bad gateway</html>");
  }

  #[test]
  fn user_message_falls_back() {
    let err = ApiError::Status { status: StatusCode::INTERNAL_SERVER_ERROR, body: ErrorBody::new(String::new()) };
    assert_eq!(err.user_message("Failed to place buy order"), "Failed to place buy order");

    let err = ApiError::Rejected {
      status: StatusCode::EXPECTATION_FAILED,
      body: ErrorBody::new(r#"{"error":"Expectation Failed","message":""}"#.to_string()),
    };
    assert_eq!(err.user_message("fallback"), "Expectation Failed");
  }

  #[test]
  fn validation_errors_surface_verbatim() {
    let err = ApiError::from(ValidationError::InvalidQuantity);
    assert_eq!(err.user_message("unused"), "Please enter a valid quantity");
    assert_eq!(err.status(), None);
    assert_eq!(ValidationError::InvalidEmail.to_string(), "Please enter a valid email address");
    assert_eq!(ValidationError::Required("a first and last name").to_string(), "Please enter a first and last name");
  }
}
