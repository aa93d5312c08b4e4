//! Presence checks for request payloads.
//!
//! The API validates only that required fields arrive and are non-empty;
//! content rules (id format, coordinate ranges) are deliberately not checked
//! here.

use crate::error::ApiError;

/// Unwrap a required field, rejecting absence with a 400 naming the field.
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
  value.ok_or_else(|| {
    ApiError::BadRequest(format!("missing required field: {field}"))
  })
}

/// Unwrap a required text field; whitespace-only counts as missing.
pub fn required_text(
  value: Option<String>,
  field: &str,
) -> Result<String, ApiError> {
  match value {
    Some(s) if !s.trim().is_empty() => Ok(s),
    _ => Err(ApiError::BadRequest(format!(
      "missing required field: {field}"
    ))),
  }
}
