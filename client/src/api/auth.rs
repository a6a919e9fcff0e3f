use serde::{Deserialize, Serialize};

use crate::{
  dispatch::Dispatcher,
  error::{ApiError, ValidationError},
  session::{Role, Session},
};

pub const MIN_CREDENTIAL_LEN: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
  pub email: String,
  pub password: String,
}

impl LoginRequest {
  pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
    Self { email: email.into().trim().to_string(), password: password.into() }
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.email.chars().count() < MIN_CREDENTIAL_LEN || self.password.chars().count() < MIN_CREDENTIAL_LEN {
      return Err(ValidationError::CredentialsTooShort(MIN_CREDENTIAL_LEN));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
  pub token: String,
  pub role: Role,
  #[serde(default)]
  pub id: Option<u32>,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub first_name: Option<String>,
  #[serde(default)]
  pub last_name: Option<String>,
}

/// Signs in and stores the resulting session. Bad credentials come back as
/// [`ApiError::Unauthorized`] without touching the current session.
pub async fn login(dispatcher: &Dispatcher, request: &LoginRequest) -> Result<Session, ApiError> {
  request.validate()?;
  let auth: AuthResponse = dispatcher.post_public("/auth/login", request).await?;
  Ok(dispatcher.session().establish(&auth))
}

pub fn logout(dispatcher: &Dispatcher) {
  dispatcher.logout();
}
