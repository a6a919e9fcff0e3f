use std::rc::Rc;
use dioxus::logger::tracing::info;
use fintra_client::{ApiConfig, Dispatcher, RoutePolicy, SessionContext, StorageSessionStore};

use super::browser::{origin, BrowserNavigator, LocalStorage};

/// Set at build time from `.env`; unset means the API lives on this origin.
const CONFIGURED_API_URL: Option<&str> = option_env!("FINTRA_API_URL");

/// Everything the pages share, provided once at the router root.
#[derive(Clone)]
pub struct AppState {
  pub dispatcher: Dispatcher,
  pub policy: Rc<RoutePolicy>,
  pub config: Rc<ApiConfig>,
}

impl AppState {
  pub fn from_browser() -> Self {
    let config = Rc::new(ApiConfig::resolve(CONFIGURED_API_URL, &origin()));
    info!("api base url {}", config.base_url);

    let session = SessionContext::new(Rc::new(StorageSessionStore::new(LocalStorage)));
    let dispatcher = Dispatcher::new(config.clone(), session, Rc::new(BrowserNavigator));
    Self { dispatcher, policy: Rc::new(RoutePolicy::default()), config }
  }

  pub fn session(&self) -> &SessionContext {
    self.dispatcher.session()
  }

  /// Where a freshly signed-in user starts.
  pub fn landing_route(&self) -> String {
    self.session()
      .current()
      .authorized_role()
      .and_then(|role| self.policy.landing_route(role))
      .unwrap_or("/home-page")
      .to_string()
  }
}
