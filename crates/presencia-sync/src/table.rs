//! In-memory accumulator for fetched rows.
//!
//! Rows arrive as JSON objects whose keys vary by table. [`Table`] keeps
//! columns in first-seen order and renders a padded preview for terminal
//! inspection. Nothing here touches disk.

use std::fmt::Write;

use serde_json::{Map, Value};

/// Column-ordered collection of stringified rows.
#[derive(Debug, Default)]
pub struct Table {
  columns: Vec<String>,
  rows:    Vec<Vec<String>>,
}

impl Table {
  pub fn new() -> Self { Self::default() }

  /// Number of data rows accumulated so far.
  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  /// Append one row, registering any columns it introduces.
  ///
  /// Rows pushed before a column first appeared render as empty cells in
  /// that column.
  pub fn push_row(&mut self, row: &Map<String, Value>) {
    for key in row.keys() {
      if !self.columns.iter().any(|c| c == key) {
        self.columns.push(key.clone());
      }
    }

    let cells = self
      .columns
      .iter()
      .map(|col| row.get(col).map(cell_text).unwrap_or_default())
      .collect();
    self.rows.push(cells);
  }

  /// Render the first `n` rows as space-padded columns, header included.
  pub fn head(&self, n: usize) -> String {
    let shown = &self.rows[..n.min(self.rows.len())];

    // Widths are measured in characters, the unit the formatter pads in,
    // not in bytes.
    let mut widths: Vec<usize> =
      self.columns.iter().map(|c| c.chars().count()).collect();
    for row in shown {
      for (i, cell) in row.iter().enumerate() {
        let w = cell.chars().count();
        if w > widths[i] {
          widths[i] = w;
        }
      }
    }

    let mut out = String::new();
    for (i, col) in self.columns.iter().enumerate() {
      if i > 0 {
        out.push_str("  ");
      }
      let _ = write!(out, "{col:<width$}", width = widths[i]);
    }
    out.push('\n');

    for row in shown {
      for (i, width) in widths.iter().enumerate() {
        if i > 0 {
          out.push_str("  ");
        }
        let cell = row.get(i).map(String::as_str).unwrap_or("");
        let _ = write!(out, "{cell:<width$}");
      }
      out.push('\n');
    }

    out
  }
}

/// Flatten a JSON value into its cell text. Strings lose their quotes,
/// nulls render empty, everything else keeps its JSON form.
fn cell_text(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}
