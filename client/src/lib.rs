//! Browser-independent core of the Fintra trading web client: the persisted
//! session, role based route access, the route guard, and the HTTP dispatcher
//! every page goes through.

pub mod alert;
pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod guard;
pub mod policy;
pub mod session;

#[cfg(test)]
mod testing;

pub use alert::{Alert, Alerts, Severity};
pub use config::ApiConfig;
pub use dispatch::{Dispatcher, Navigator, RecordingNavigator, Supersede};
pub use error::{ApiError, ValidationError};
pub use guard::{GuardState, GuardView, RouteGuard};
pub use policy::{AccessPolicy, RoutePolicy};
pub use session::{MemoryStorage, Role, Session, SessionContext, SessionStore, Storage, StorageSessionStore};
