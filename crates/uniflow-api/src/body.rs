//! Request-body helpers shared by the handler modules.

use axum::{Json, extract::rejection::JsonRejection};

use crate::error::ApiError;

/// Unwrap a JSON body, turning any rejection into a 400.
pub fn parse<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
  body
    .map(|Json(v)| v)
    .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// A required string: missing and empty are the same.
pub fn present(s: Option<String>) -> Option<String> { s.filter(|s| !s.is_empty()) }

/// A required id: missing and zero are the same.
pub fn present_id(id: Option<i64>) -> Option<i64> { id.filter(|id| *id != 0) }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_strings_and_zero_ids_are_missing() {
    assert_eq!(present(Some(String::new())), None);
    assert_eq!(present(Some("x".into())).as_deref(), Some("x"));
    assert_eq!(present_id(Some(0)), None);
    assert_eq!(present_id(Some(3)), Some(3));
  }
}
