use std::time::Duration;
use dioxus::{logger::tracing::warn, prelude::*};
use fintra_client::{Alerts, ApiError, Severity, ValidationError};

use crate::utils::state::AppState;

/// Page-local banner. Every message expires on its own after the timeout.
#[derive(Clone, Copy, PartialEq)]
pub struct Notifier {
  alerts: Signal<Alerts>,
}

impl Notifier {
  pub fn success(mut self, message: impl Into<String>) {
    let id = self.alerts.write().success(message);
    self.expire_later(id);
  }

  pub fn failure(mut self, err: &ApiError, fallback: &str) {
    if !err.is_cancelled() {
      warn!("{}: {}", fallback, err);
    }
    let shown = self.alerts.write().failure(err, fallback);
    if let Some(id) = shown {
      self.expire_later(id);
    }
  }

  pub fn invalid(mut self, err: ValidationError) {
    let id = self.alerts.write().show(Severity::Error, err.to_string());
    self.expire_later(id);
  }

  pub fn dismiss(mut self) {
    self.alerts.write().dismiss();
  }

  fn expire_later(self, id: u64) {
    let mut alerts = self.alerts;
    let timeout = alerts.peek().timeout();
    spawn(async move {
      async_std::task::sleep(timeout).await;
      alerts.write().expire(id);
    });
  }
}

/// Notifier with the app-wide alert timeout.
pub fn use_notifier() -> Notifier {
  let timeout = use_context::<AppState>().config.alert_timeout;
  use_notifier_with(timeout)
}

pub fn use_notifier_with(timeout: Duration) -> Notifier {
  let alerts = use_signal(|| Alerts::new(timeout));
  Notifier { alerts }
}

#[component]
pub fn AlertBanner(notifier: Notifier) -> Element {
  let Some(alert) = notifier.alerts.read().current().cloned() else {
    return rsx! {};
  };
  let kind = alert.severity.as_str();
  let message = alert.message;
  rsx! {
    div {
      class: "alert alert-{kind}",
      role: "alert",
      span { "{message}" },
      button {
        class: "alert-close",
        onclick: move |_| notifier.dismiss(),
        "×"
      }
    }
  }
}
