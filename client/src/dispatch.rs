use std::{cell::RefCell, rc::Rc};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
  config::ApiConfig,
  error::{ApiError, ErrorBody, DOMAIN_REJECTION_STATUSES},
  session::SessionContext,
};

/// Sent in place of a token when there is no session; the backend answers 401.
pub const ABSENT_TOKEN: &str = "null";

/// Moves the application to another route, e.g. a hard browser navigation.
pub trait Navigator {
  fn navigate(&self, route: &str);
}

/// Navigator that only remembers where it was sent. Useful for hosts without a
/// browser and for tests.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
  visited: RefCell<Vec<String>>,
}

impl RecordingNavigator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn visited(&self) -> Vec<String> {
    self.visited.borrow().clone()
  }
}

impl Navigator for RecordingNavigator {
  fn navigate(&self, route: &str) {
    self.visited.borrow_mut().push(route.to_string());
  }
}

/// What the interceptor does with a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interception {
  Pass,
  ForceLogout,
  DomainRejection,
  Failure,
}

pub fn classify(status: StatusCode) -> Interception {
  if status.is_success() {
    return Interception::Pass;
  }
  match status.as_u16() {
    401 | 403 => Interception::ForceLogout,
    code if DOMAIN_REJECTION_STATUSES.contains(&code) => Interception::DomainRejection,
    _ => Interception::Failure,
  }
}

/// Hands out cancellation tokens where only the newest one matters. Starting a
/// new request cancels the one before it.
#[derive(Debug, Default)]
pub struct Supersede {
  current: RefCell<Option<CancellationToken>>,
}

impl Supersede {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn begin(&self) -> CancellationToken {
    let token = CancellationToken::new();
    if let Some(previous) = self.current.replace(Some(token.clone())) {
      previous.cancel();
    }
    token
  }

  pub fn cancel(&self) {
    if let Some(token) = self.current.borrow_mut().take() {
      token.cancel();
    }
  }
}

/// HTTP client bound to the API base URL and the shared session.
///
/// The bearer token is looked up when a request is sent, never when the
/// dispatcher is built, so a clone held across a login or logout stays current.
#[derive(Clone)]
pub struct Dispatcher {
  http: Client,
  config: Rc<ApiConfig>,
  session: SessionContext,
  navigator: Rc<dyn Navigator>,
}

impl Dispatcher {
  pub fn new(config: Rc<ApiConfig>, session: SessionContext, navigator: Rc<dyn Navigator>) -> Self {
    Self::with_client(Client::new(), config, session, navigator)
  }

  pub fn with_client(http: Client, config: Rc<ApiConfig>, session: SessionContext, navigator: Rc<dyn Navigator>) -> Self {
    Self { http, config, session, navigator }
  }

  pub fn session(&self) -> &SessionContext {
    &self.session
  }

  pub fn config(&self) -> &ApiConfig {
    &self.config
  }

  /// Ends the session and sends the user to the login route.
  pub fn logout(&self) {
    self.session.end();
    self.navigator.navigate(&self.config.login_route);
  }

  pub async fn get<T: DeserializeOwned>(&self, path: &str, cancel: Option<&CancellationToken>) -> Result<T, ApiError> {
    let req = self.request(Method::GET, path)?;
    self.send(req, cancel).await
  }

  pub async fn get_query<Q, T>(&self, path: &str, query: &Q, cancel: Option<&CancellationToken>) -> Result<T, ApiError>
  where
    Q: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let req = self.request(Method::GET, path)?.query(query);
    self.send(req, cancel).await
  }

  pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let req = self.request(Method::POST, path)?.json(body);
    self.send(req, None).await
  }

  /// POST without a request body.
  pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
    let req = self.request(Method::POST, path)?;
    self.send(req, None).await
  }

  pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let req = self.request(Method::PUT, path)?.json(body);
    self.send(req, None).await
  }

  pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let req = self.request(Method::PATCH, path)?.json(body);
    self.send(req, None).await
  }

  pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
    let req = self.request(Method::DELETE, path)?;
    self.execute(req, None, true).await.map(|_| ())
  }

  /// DELETE carrying a JSON body, for endpoints that remove a selection.
  pub async fn delete_with<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let req = self.request(Method::DELETE, path)?.json(body);
    self.send(req, None).await
  }

  /// POST that is exempt from the logout interception, for the login call
  /// itself where a 401 only means bad credentials.
  pub async fn post_public<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let req = self.http.request(Method::POST, self.config.url(path)?).json(body);
    let body = self.execute(req, None, false).await?;
    decode(&body)
  }

  fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
    let url = self.config.url(path)?;
    let token = self.session.access_token();
    Ok(self.http.request(method, url).bearer_auth(token.as_deref().unwrap_or(ABSENT_TOKEN)))
  }

  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, cancel: Option<&CancellationToken>) -> Result<T, ApiError> {
    let body = self.execute(req, cancel, true).await?;
    decode(&body)
  }

  async fn execute(&self, req: RequestBuilder, cancel: Option<&CancellationToken>, guard_auth: bool) -> Result<String, ApiError> {
    let round_trip = async {
      let response = req.send().await?;
      let status = response.status();
      let body = response.text().await?;
      Ok::<_, ApiError>((status, body))
    };

    let (status, body) = match cancel {
      Some(token) => tokio::select! {
        biased;
        _ = token.cancelled() => return Err(ApiError::Cancelled),
        result = round_trip => result?,
      },
      None => round_trip.await?,
    };

    // a response that lands after its request was superseded is dropped unseen
    if cancel.is_some_and(CancellationToken::is_cancelled) {
      return Err(ApiError::Cancelled);
    }

    self.intercept(status, body, guard_auth)
  }

  fn intercept(&self, status: StatusCode, body: String, guard_auth: bool) -> Result<String, ApiError> {
    match classify(status) {
      Interception::Pass => Ok(body),
      Interception::ForceLogout => {
        let body = ErrorBody::new(body);
        if guard_auth {
          warn!("backend answered {}, ending session", status);
          self.logout();
        }
        Err(ApiError::Unauthorized { status, body })
      },
      Interception::DomainRejection => {
        debug!("domain rejection {}", status);
        Err(ApiError::Rejected { status, body: ErrorBody::new(body) })
      },
      Interception::Failure => Err(ApiError::Status { status, body: ErrorBody::new(body) }),
    }
  }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
  let body = body.trim();
  if body.is_empty() {
    return Ok(serde_json::from_str("null")?);
  }
  Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;
  use serde_json::{json, Value};
  use crate::{
    session::Role,
    testing::{logged_in, spawn_backend},
  };

  #[test]
  fn statuses_are_classified() {
    assert_eq!(classify(StatusCode::OK), Interception::Pass);
    assert_eq!(classify(StatusCode::CREATED), Interception::Pass);
    assert_eq!(classify(StatusCode::UNAUTHORIZED), Interception::ForceLogout);
    assert_eq!(classify(StatusCode::FORBIDDEN), Interception::ForceLogout);
    for code in [412u16, 413, 417, 418] {
      assert_eq!(classify(StatusCode::from_u16(code).unwrap()), Interception::DomainRejection);
    }
    assert_eq!(classify(StatusCode::BAD_REQUEST), Interception::Failure);
    assert_eq!(classify(StatusCode::INTERNAL_SERVER_ERROR), Interception::Failure);
  }

  #[test]
  fn supersede_cancels_previous_token() {
    let supersede = Supersede::new();
    let first = supersede.begin();
    let second = supersede.begin();
    assert!(first.is_cancelled());
    assert!(!second.is_cancelled());
    supersede.cancel();
    assert!(second.is_cancelled());
  }

  #[test]
  fn empty_body_decodes_to_unit_and_none() {
    let unit: () = decode("").unwrap();
    assert_eq!(unit, ());
    let missing: Option<Value> = decode("  ").unwrap();
    assert_eq!(missing, None);
  }

  #[tokio::test]
  async fn bearer_token_is_read_at_send_time() {
    let base = spawn_backend().await;
    let (dispatcher, _nav) = logged_in(&base, Role::Trader);

    let seen: Value = dispatcher.get("/echo-auth", None).await.unwrap();
    assert_eq!(seen, json!("Bearer token-ROLE_TRADER"));

    // same dispatcher, session swapped underneath it
    dispatcher.session().end();
    let seen: Value = dispatcher.get("/echo-auth", None).await.unwrap();
    assert_eq!(seen, json!("Bearer null"));
  }

  #[tokio::test]
  async fn forbidden_clears_session_and_redirects() {
    let base = spawn_backend().await;
    let (dispatcher, nav) = logged_in(&base, Role::Trader);

    let err = dispatcher.get::<Value>("/employees-only", None).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { status, .. } if status == StatusCode::FORBIDDEN));
    assert!(!dispatcher.session().current().is_authenticated());
    assert_eq!(dispatcher.session().current().role, None);
    assert_eq!(nav.visited(), vec!["/login".to_string()]);
  }

  #[tokio::test]
  async fn unauthorized_on_any_verb_forces_logout() {
    let base = spawn_backend().await;
    let (dispatcher, nav) = logged_in(&base, Role::Admin);

    let err = dispatcher.delete("/expired").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(nav.visited(), vec!["/login".to_string()]);
    assert!(!dispatcher.session().current().is_authenticated());
  }

  #[tokio::test]
  async fn domain_rejection_passes_through() {
    let base = spawn_backend().await;
    let (dispatcher, nav) = logged_in(&base, Role::Trader);
    let before = dispatcher.session().current();

    let err = dispatcher
      .post::<_, Value>("/cash/withdraw", &json!({"accountId": 1, "amount": 1_000_000}))
      .await
      .unwrap_err();

    let ApiError::Rejected { status, body } = &err else {
      panic!("expected a domain rejection, got {err:?}");
    };
    assert_eq!(*status, StatusCode::PRECONDITION_FAILED);
    assert!(body.raw.contains("Insufficient free balance"));
    assert_eq!(body.message(), Some("Insufficient free balance"));
    assert_eq!(dispatcher.session().current(), before);
    assert!(nav.visited().is_empty());
  }

  #[tokio::test]
  async fn teapot_and_server_errors_do_not_redirect() {
    let base = spawn_backend().await;
    let (dispatcher, nav) = logged_in(&base, Role::Trader);

    let err = dispatcher.get::<Value>("/teapot", None).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected { status, .. } if status == StatusCode::IM_A_TEAPOT));
    let err = dispatcher.get::<Value>("/boom", None).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR));
    assert!(nav.visited().is_empty());
    assert!(dispatcher.session().current().is_authenticated());
  }

  #[tokio::test]
  async fn transport_failure_does_not_redirect() {
    // nothing listens on port 9 of the loopback interface
    let (dispatcher, nav) = logged_in("http://127.0.0.1:9/api/v1", Role::Trader);
    let err = dispatcher.get::<Value>("/customers", None).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert!(nav.visited().is_empty());
    assert!(dispatcher.session().current().is_authenticated());
  }

  #[tokio::test]
  async fn cancelled_request_never_reaches_interceptor() {
    let base = spawn_backend().await;
    let (dispatcher, nav) = logged_in(&base, Role::Trader);
    let supersede = Supersede::new();

    let token = supersede.begin();
    let slow = dispatcher.get::<Value>("/slow-unauthorized", Some(&token));
    let canceller = async {
      tokio::time::sleep(Duration::from_millis(50)).await;
      supersede.begin();
    };
    let (result, _) = tokio::join!(slow, canceller);

    assert!(result.unwrap_err().is_cancelled());
    assert!(nav.visited().is_empty());
    assert!(dispatcher.session().current().is_authenticated());
  }

  #[tokio::test]
  async fn public_post_leaves_session_alone_on_401() {
    let base = spawn_backend().await;
    let (dispatcher, nav) = logged_in(&base, Role::Analyst);
    let err = dispatcher
      .post_public::<_, Value>("/auth/login", &json!({"email": "wrong@fintra.com.tr", "password": "nope-nope"}))
      .await
      .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert!(nav.visited().is_empty());
    assert!(dispatcher.session().current().is_authenticated());
  }
}
