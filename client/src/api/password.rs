//! Self-service password reset. None of these calls carry a session, so they
//! go through the public path and a 401 never logs anyone out.

use serde::{Deserialize, Serialize};

use crate::{dispatch::Dispatcher, error::{ApiError, ValidationError}};
use super::auth::MIN_CREDENTIAL_LEN;

pub const RESET_CODE_LEN: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MessageResponse {
  pub message: String,
}

#[derive(Serialize)]
struct ResetRequest<'a> {
  email: &'a str,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
  email: &'a str,
  token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompleteRequest<'a> {
  email: &'a str,
  token: &'a str,
  new_password: &'a str,
}

fn check_email(email: &str) -> Result<(), ValidationError> {
  if email.trim().chars().count() < MIN_CREDENTIAL_LEN {
    return Err(ValidationError::CredentialsTooShort(MIN_CREDENTIAL_LEN));
  }
  Ok(())
}

fn check_code(code: &str) -> Result<(), ValidationError> {
  if code.len() != RESET_CODE_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
    return Err(ValidationError::IncompleteCode(RESET_CODE_LEN));
  }
  Ok(())
}

/// Mails a one-time code to `email`.
pub async fn request_reset(dispatcher: &Dispatcher, email: &str) -> Result<MessageResponse, ApiError> {
  check_email(email)?;
  dispatcher.post_public("/password/reset-request", &ResetRequest { email: email.trim() }).await
}

pub async fn verify_code(dispatcher: &Dispatcher, email: &str, code: &str) -> Result<MessageResponse, ApiError> {
  check_code(code)?;
  dispatcher.post_public("/password/verify-token", &VerifyRequest { email: email.trim(), token: code }).await
}

pub async fn complete_reset(dispatcher: &Dispatcher, email: &str, code: &str, password: &str, confirmation: &str) -> Result<MessageResponse, ApiError> {
  check_code(code)?;
  if password != confirmation {
    return Err(ValidationError::PasswordMismatch.into());
  }
  if password.chars().count() < MIN_CREDENTIAL_LEN {
    return Err(ValidationError::CredentialsTooShort(MIN_CREDENTIAL_LEN).into());
  }
  let body = CompleteRequest { email: email.trim(), token: code, new_password: password };
  dispatcher.post_public("/password/reset-complete", &body).await
}
