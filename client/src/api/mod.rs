//! Typed wrappers around the backend endpoints the pages use.

pub mod auth;
pub mod cash;
pub mod customers;
pub mod equities;
pub mod orders;
pub mod password;
pub mod reports;
pub mod system_date;
pub mod trades;
pub mod transfers;
pub mod users;

use serde::Deserialize;

/// Spring Data page envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  #[serde(default = "Vec::new")]
  pub content: Vec<T>,
  #[serde(default)]
  pub total_elements: u64,
  #[serde(default)]
  pub total_pages: u32,
  #[serde(default)]
  pub number: u32,
  #[serde(default)]
  pub size: u32,
}

impl<T> Page<T> {
  pub fn into_content(self) -> Vec<T> {
    self.content
  }
}

/// Comma separated text, one line per row, quoting cells where needed.
pub fn to_csv(rows: &[Vec<String>]) -> String {
  rows
    .iter()
    .map(|row| row.iter().map(|cell| csv_cell(cell)).collect::<Vec<_>>().join(","))
    .collect::<Vec<_>>()
    .join("\n")
}

fn csv_cell(cell: &str) -> String {
  if cell.contains([',', '"', '\n']) {
    format!("\"{}\"", cell.replace('"', "\"\""))
  } else {
    cell.to_string()
  }
}

/// Query string for the list endpoints that take `search` and `size`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SearchQuery<'a> {
  pub search: &'a str,
  pub size: u32,
}
