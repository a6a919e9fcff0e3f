use std::rc::Rc;
use tracing::{error, info};

use crate::{config::ApiConfig, policy::RoutePolicy, session::SessionContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
  Checking,
  Authorized,
  Redirecting(String),
}

/// What the guarded layout shows for a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardView {
  /// The matched route.
  Outlet,
  /// A loading placeholder while the check is pending.
  Placeholder,
  /// Nothing; a redirect is under way.
  Blank,
}

impl GuardState {
  pub fn view(&self) -> GuardView {
    match self {
      Self::Authorized => GuardView::Outlet,
      Self::Checking => GuardView::Placeholder,
      Self::Redirecting(_) => GuardView::Blank,
    }
  }

  pub fn is_authorized(&self) -> bool {
    matches!(self, Self::Authorized)
  }

  pub fn redirect_target(&self) -> Option<&str> {
    match self {
      Self::Redirecting(to) => Some(to),
      _ => None,
    }
  }
}

/// Per-navigation access check. Holds no session data of its own; every
/// evaluation reads the store afresh.
pub struct RouteGuard {
  session: SessionContext,
  policy: Rc<RoutePolicy>,
  config: Rc<ApiConfig>,
  state: GuardState,
}

impl RouteGuard {
  pub fn new(session: SessionContext, policy: Rc<RoutePolicy>, config: Rc<ApiConfig>) -> Self {
    Self { session, policy, config, state: GuardState::Checking }
  }

  pub fn state(&self) -> &GuardState {
    &self.state
  }

  /// Runs on mount and on every pathname change.
  pub fn on_navigate(&mut self, pathname: &str) -> &GuardState {
    self.state = GuardState::Checking;
    self.state = self.evaluate(pathname);
    &self.state
  }

  pub fn evaluate(&self, pathname: &str) -> GuardState {
    if self.config.is_public(pathname) {
      return GuardState::Authorized;
    }

    let session = self.session.current();
    if !session.is_authenticated() {
      info!("no session token, redirecting {} to login", pathname);
      return self.to_login();
    }

    let Some(role) = session.role else {
      info!("session has no role, redirecting {} to login", pathname);
      return self.to_login();
    };

    if self.policy.is_allowed(Some(role), pathname) {
      return GuardState::Authorized;
    }

    match self.policy.landing_route(role) {
      Some(landing) => {
        info!("{} may not open {}, redirecting to {}", role, pathname, landing);
        GuardState::Redirecting(landing.to_string())
      },
      None => {
        error!("route policy has no landing route for {}; sending user to login", role);
        self.to_login()
      }
    }
  }

  fn to_login(&self) -> GuardState {
    GuardState::Redirecting(self.config.login_route.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    api::auth::AuthResponse,
    policy::AccessPolicy,
    session::{MemoryStorage, Role, Storage, StorageSessionStore, TOKEN_KEY},
  };

  fn login(session: &SessionContext, role: Role) {
    session.establish(&AuthResponse {
      token: "jwt".to_string(),
      role,
      id: Some(7),
      email: Some("user@fintra.com.tr".to_string()),
      first_name: Some("Deniz".to_string()),
      last_name: Some("Kaya".to_string()),
    });
  }

  fn guard(session: &SessionContext) -> RouteGuard {
    RouteGuard::new(session.clone(), Rc::new(RoutePolicy::default()), Rc::new(ApiConfig::new("http://localhost:8080/api/v1")))
  }

  #[test]
  fn login_page_renders_without_session() {
    let session = SessionContext::in_memory();
    let mut guard = guard(&session);
    assert_eq!(guard.state(), &GuardState::Checking);
    assert_eq!(guard.on_navigate("/login"), &GuardState::Authorized);
    assert_eq!(guard.on_navigate("/forgot-password"), &GuardState::Authorized);
  }

  #[test]
  fn no_token_redirects_to_login() {
    let session = SessionContext::in_memory();
    let mut guard = guard(&session);
    assert_eq!(guard.on_navigate("/home-page").redirect_target(), Some("/login"));
  }

  #[test]
  fn trader_is_sent_home_from_employees() {
    let session = SessionContext::in_memory();
    login(&session, Role::Trader);
    let mut guard = guard(&session);
    assert_eq!(guard.on_navigate("/employees"), &GuardState::Redirecting("/home-page".to_string()));
    assert!(guard.on_navigate("/operational/end-of-day").is_authorized());
  }

  #[test]
  fn admin_opens_anything() {
    let session = SessionContext::in_memory();
    login(&session, Role::Admin);
    let mut guard = guard(&session);
    assert!(guard.on_navigate("/employees").is_authorized());
    assert!(guard.on_navigate("/whatever/else").is_authorized());
  }

  #[test]
  fn token_without_role_redirects_to_login() {
    let storage = MemoryStorage::new();
    storage.set(TOKEN_KEY, "jwt");
    let session = SessionContext::new(Rc::new(StorageSessionStore::new(storage)));
    let mut guard = guard(&session);
    assert_eq!(guard.on_navigate("/home-page").redirect_target(), Some("/login"));
  }

  #[test]
  fn logout_is_observed_on_next_navigation() {
    let session = SessionContext::in_memory();
    login(&session, Role::Analyst);
    let mut guard = guard(&session);
    assert!(guard.on_navigate("/reports").is_authorized());
    session.end();
    assert_eq!(guard.on_navigate("/reports").redirect_target(), Some("/login"));
  }

  #[test]
  fn redirect_renders_blank() {
    let session = SessionContext::in_memory();
    let mut guard = guard(&session);
    assert_eq!(guard.state().view(), GuardView::Placeholder);
    assert_eq!(guard.on_navigate("/reports").view(), GuardView::Blank);
    assert_eq!(guard.on_navigate("/login").view(), GuardView::Outlet);
  }

  #[test]
  fn role_missing_from_table_goes_to_login() {
    let session = SessionContext::in_memory();
    login(&session, Role::Analyst);
    let policy = RoutePolicy::new([(Role::Admin, AccessPolicy::Unrestricted)]).unwrap();
    let mut guard = RouteGuard::new(session, Rc::new(policy), Rc::new(ApiConfig::new("http://x")));
    assert_eq!(guard.on_navigate("/reports").redirect_target(), Some("/login"));
  }
}
