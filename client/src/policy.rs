use std::collections::HashMap;
use thiserror::Error;

use crate::session::Role;

/// What a role may open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPolicy {
  Unrestricted,
  /// Ordered route prefixes. The first one is where a denied user lands.
  RestrictedTo(Vec<String>),
}

impl AccessPolicy {
  pub fn restricted<I, P>(prefixes: I) -> Self
  where
    I: IntoIterator<Item = P>,
    P: Into<String>,
  {
    let mut normalized: Vec<String> = Vec::new();
    for prefix in prefixes {
      let prefix = normalize(&prefix.into());
      if !normalized.contains(&prefix) {
        normalized.push(prefix);
      }
    }
    AccessPolicy::RestrictedTo(normalized)
  }

  pub fn permits(&self, pathname: &str) -> bool {
    match self {
      Self::Unrestricted => true,
      Self::RestrictedTo(prefixes) => prefixes.iter().any(|p| has_segment_prefix(pathname, p)),
    }
  }

  pub fn landing_route(&self) -> Option<&str> {
    match self {
      Self::Unrestricted => None,
      Self::RestrictedTo(prefixes) => prefixes.first().map(String::as_str),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
  #[error("Policy error: role {0} is restricted to an empty route list")]
  EmptyAllowList(Role),
  #[error("Policy error: route prefix {0:?} must start with '/'")]
  RelativePrefix(String),
}

/// Static role to route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
  entries: HashMap<Role, AccessPolicy>,
}

impl RoutePolicy {
  pub fn new<I>(entries: I) -> Result<Self, PolicyError>
  where
    I: IntoIterator<Item = (Role, AccessPolicy)>,
  {
    let entries: HashMap<Role, AccessPolicy> = entries.into_iter().collect();
    for (role, policy) in &entries {
      if let AccessPolicy::RestrictedTo(prefixes) = policy {
        if prefixes.is_empty() {
          return Err(PolicyError::EmptyAllowList(*role));
        }
        if let Some(bad) = prefixes.iter().find(|p| !p.starts_with('/')) {
          return Err(PolicyError::RelativePrefix(bad.clone()));
        }
      }
    }
    Ok(Self { entries })
  }

  pub fn get(&self, role: Role) -> Option<&AccessPolicy> {
    self.entries.get(&role)
  }

  pub fn is_allowed(&self, role: Option<Role>, pathname: &str) -> bool {
    let Some(role) = role else {
      return false;
    };
    self.entries.get(&role).is_some_and(|policy| policy.permits(pathname))
  }

  /// First allow-listed route for `role`. `None` for unrestricted roles and for
  /// roles the table does not know.
  pub fn landing_route(&self, role: Role) -> Option<&str> {
    self.entries.get(&role).and_then(AccessPolicy::landing_route)
  }
}

impl Default for RoutePolicy {
  fn default() -> Self {
    Self {
      entries: HashMap::from([
        (Role::Admin, AccessPolicy::Unrestricted),
        (Role::Trader, AccessPolicy::restricted([
          "/home-page",
          "/customers",
          "/buy-sell/quick-buy-sell",
          "/operational/stock-transfers",
          "/operational/cash-transfers",
          "/operational/end-of-day",
        ])),
        (Role::Analyst, AccessPolicy::restricted(["/home-page", "/reports"])),
      ]),
    }
  }
}

fn normalize(prefix: &str) -> String {
  let trimmed = prefix.trim();
  if trimmed.len() > 1 {
    trimmed.trim_end_matches('/').to_string()
  } else {
    trimmed.to_string()
  }
}

/// `pathname` equals `prefix` or continues it at a `/` boundary.
pub fn has_segment_prefix(pathname: &str, prefix: &str) -> bool {
  if prefix == "/" {
    return pathname.starts_with('/');
  }
  match pathname.strip_prefix(prefix) {
    Some(rest) => rest.is_empty() || rest.starts_with('/'),
    None => false,
  }
}
