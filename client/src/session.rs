use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc, str::FromStr};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::auth::AuthResponse;

pub const TOKEN_KEY: &str = "accessToken";
pub const ROLE_KEY: &str = "role";
pub const EMAIL_KEY: &str = "email";
pub const FIRST_NAME_KEY: &str = "firstName";
pub const LAST_NAME_KEY: &str = "lastName";
pub const LOCALE_KEY: &str = "locale";

const SESSION_KEYS: [&str; 5] = [TOKEN_KEY, ROLE_KEY, EMAIL_KEY, FIRST_NAME_KEY, LAST_NAME_KEY];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
  #[serde(rename = "ROLE_ADMIN")]
  Admin,
  #[serde(rename = "ROLE_ANALYST")]
  Analyst,
  #[serde(rename = "ROLE_TRADER")]
  Trader,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Admin => "ROLE_ADMIN",
      Self::Analyst => "ROLE_ANALYST",
      Self::Trader => "ROLE_TRADER",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Unknown role: {}", self.0)
  }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
  type Err = UnknownRole;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "ROLE_ADMIN" => Ok(Role::Admin),
      "ROLE_ANALYST" => Ok(Role::Analyst),
      "ROLE_TRADER" => Ok(Role::Trader),
      other => Err(UnknownRole(other.to_string())),
    }
  }
}

/// What the client remembers about the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
  pub access_token: Option<String>,
  pub role: Option<Role>,
  pub email: Option<String>,
  pub first_name: Option<String>,
  pub last_name: Option<String>,
}

impl Session {
  /// Only the token authenticates. A role without a token means nothing.
  pub fn is_authenticated(&self) -> bool {
    self.access_token.as_deref().is_some_and(|t| !t.is_empty())
  }

  /// Role to authorize with, only once authenticated.
  pub fn authorized_role(&self) -> Option<Role> {
    if self.is_authenticated() { self.role } else { None }
  }

  pub fn display_name(&self) -> String {
    match (self.first_name.as_deref(), self.last_name.as_deref()) {
      (Some(first), Some(last)) => format!("{} {}", first, last),
      (Some(name), None) | (None, Some(name)) => name.to_string(),
      (None, None) => self.email.clone().unwrap_or_default(),
    }
  }
}

impl From<&AuthResponse> for Session {
  fn from(auth: &AuthResponse) -> Self {
    Session {
      access_token: Some(auth.token.clone()),
      role: Some(auth.role),
      email: auth.email.clone(),
      first_name: auth.first_name.clone(),
      last_name: auth.last_name.clone(),
    }
  }
}

/// Durable string key-value storage, e.g. the browser's `localStorage`.
/// Implementations swallow their own failures: a failed read is a missing key.
pub trait Storage {
  fn get(&self, key: &str) -> Option<String>;
  fn set(&self, key: &str, value: &str);
  fn remove(&self, key: &str);
}

/// In-process storage, used by tests and non-browser hosts.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.entries.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.borrow().is_empty()
  }
}

impl Storage for MemoryStorage {
  fn get(&self, key: &str) -> Option<String> {
    self.entries.borrow().get(key).cloned()
  }

  fn set(&self, key: &str, value: &str) {
    self.entries.borrow_mut().insert(key.to_string(), value.to_string());
  }

  fn remove(&self, key: &str) {
    self.entries.borrow_mut().remove(key);
  }
}

pub trait SessionStore {
  fn read(&self) -> Session;
  fn write(&self, session: &Session);
  fn clear(&self);
}

/// Maps a [`Session`] onto individual storage keys.
pub struct StorageSessionStore<S: Storage> {
  storage: S,
}

impl<S: Storage> StorageSessionStore<S> {
  pub fn new(storage: S) -> Self {
    Self { storage }
  }

  pub fn storage(&self) -> &S {
    &self.storage
  }

  fn put(&self, key: &str, value: Option<&str>) {
    match value {
      Some(v) => self.storage.set(key, v),
      None => self.storage.remove(key),
    }
  }
}

impl<S: Storage> SessionStore for StorageSessionStore<S> {
  fn read(&self) -> Session {
    Session {
      access_token: self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty()),
      role: self.storage.get(ROLE_KEY).and_then(|r| r.parse().ok()),
      email: self.storage.get(EMAIL_KEY),
      first_name: self.storage.get(FIRST_NAME_KEY),
      last_name: self.storage.get(LAST_NAME_KEY),
    }
  }

  fn write(&self, session: &Session) {
    self.put(TOKEN_KEY, session.access_token.as_deref());
    self.put(ROLE_KEY, session.role.as_ref().map(Role::as_str));
    self.put(EMAIL_KEY, session.email.as_deref());
    self.put(FIRST_NAME_KEY, session.first_name.as_deref());
    self.put(LAST_NAME_KEY, session.last_name.as_deref());
  }

  fn clear(&self) {
    for key in SESSION_KEYS {
      self.storage.remove(key);
    }
  }
}

/// Shared handle to the session. Cloning is cheap and every clone sees the
/// same store; `establish` and `end` are the only ways to change it.
#[derive(Clone)]
pub struct SessionContext {
  store: Rc<dyn SessionStore>,
}

impl SessionContext {
  pub fn new(store: Rc<dyn SessionStore>) -> Self {
    Self { store }
  }

  pub fn in_memory() -> Self {
    Self::new(Rc::new(StorageSessionStore::new(MemoryStorage::new())))
  }

  pub fn current(&self) -> Session {
    self.store.read()
  }

  pub fn access_token(&self) -> Option<String> {
    self.store.read().access_token
  }

  pub fn establish(&self, auth: &AuthResponse) -> Session {
    let session = Session::from(auth);
    self.store.write(&session);
    info!("session established for role {}", auth.role);
    session
  }

  pub fn end(&self) {
    debug!("clearing session");
    self.store.clear();
  }
}

impl fmt::Debug for SessionContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let session = self.current();
    f.debug_struct("SessionContext")
      .field("authenticated", &session.is_authenticated())
      .field("role", &session.role)
      .finish()
  }
}
