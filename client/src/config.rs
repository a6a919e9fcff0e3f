use std::time::Duration;
use reqwest::Url;

use crate::error::ApiError;

/// Same-origin API mount used when no base URL was configured at build time.
pub const DEFAULT_API_PATH: &str = "/api/v1";
pub const LOGIN_ROUTE: &str = "/login";
pub const FORGOT_PASSWORD_ROUTE: &str = "/forgot-password";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
  pub base_url: String,
  pub login_route: String,
  /// Routes the guard lets through without a session.
  pub public_routes: Vec<String>,
  /// How long transient alerts stay up.
  pub alert_timeout: Duration,
}

impl ApiConfig {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into().trim_end_matches('/').to_string(),
      login_route: LOGIN_ROUTE.to_string(),
      public_routes: vec![LOGIN_ROUTE.to_string(), FORGOT_PASSWORD_ROUTE.to_string()],
      alert_timeout: Duration::from_secs(3),
    }
  }

  /// Picks the configured base URL, or `<origin>/api/v1` when it is unset or
  /// blank.
  pub fn resolve(configured: Option<&str>, origin: &str) -> Self {
    match configured.map(str::trim).filter(|u| !u.is_empty()) {
      Some(url) => Self::new(url),
      None => Self::new(format!("{}{}", origin.trim_end_matches('/'), DEFAULT_API_PATH)),
    }
  }

  pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
    let route = route.into();
    self.public_routes.retain(|r| r != &self.login_route);
    self.public_routes.insert(0, route.clone());
    self.login_route = route;
    self
  }

  pub fn is_public(&self, pathname: &str) -> bool {
    self.public_routes.iter().any(|r| r == pathname)
  }

  pub fn url(&self, path: &str) -> Result<Url, ApiError> {
    let full = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
    Url::parse(&full).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", full, e)))
  }
}
