use dioxus::{logger::tracing::warn, prelude::document};
use fintra_client::{Navigator, Storage};
use web_sys::window;

/// `window.localStorage`. Reads and writes are best effort: private browsing
/// modes may refuse them and the app then behaves as signed out.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
  fn backend() -> Option<web_sys::Storage> {
    window()?.local_storage().ok().flatten()
  }
}

impl Storage for LocalStorage {
  fn get(&self, key: &str) -> Option<String> {
    Self::backend()?.get_item(key).ok().flatten()
  }

  fn set(&self, key: &str, value: &str) {
    match Self::backend() {
      Some(storage) => {
        if let Err(e) = storage.set_item(key, value) {
          warn!("could not store {}: {:?}", key, e);
        }
      },
      None => warn!("localStorage unavailable, {} not stored", key),
    }
  }

  fn remove(&self, key: &str) {
    match Self::backend() {
      Some(storage) => {
        if let Err(e) = storage.remove_item(key) {
          warn!("could not remove {}: {:?}", key, e);
        }
      },
      None => warn!("localStorage unavailable, {} not removed", key),
    }
  }
}

/// Full page navigation through `window.location`, so every in-memory page
/// state is dropped along with the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
  fn navigate(&self, route: &str) {
    let Some(win) = window() else { return };
    if let Err(e) = win.location().set_href(route) {
      warn!("navigation to {} failed: {:?}", route, e);
    }
  }
}

pub fn origin() -> String {
  window()
    .and_then(|w| w.location().origin().ok())
    .unwrap_or_default()
}

/// Hands `csv` to the browser as a file download.
pub fn download_csv(file_name: &str, csv: &str) {
  let (quoted, name) = match (serde_json::to_string(csv), serde_json::to_string(file_name)) {
    (Ok(quoted), Ok(name)) => (quoted, name),
    (Err(e), _) | (_, Err(e)) => {
      warn!("could not encode {}: {}", file_name, e);
      return;
    }
  };
  let script = format!(
    r#"
    const link = document.createElement("a");
    link.href = "data:text/csv;charset=utf-8," + encodeURIComponent({quoted});
    link.download = {name};
    document.body.appendChild(link);
    link.click();
    link.remove();
    "#
  );
  let _ = document::eval(&script);
}
