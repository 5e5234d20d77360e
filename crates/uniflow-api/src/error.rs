//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use uniflow_core::{Classify, ErrorClass};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store error into the matching HTTP-facing variant.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Classify + Send + Sync + 'static,
  {
    match e.class() {
      ErrorClass::Validation => ApiError::BadRequest(e.to_string()),
      ErrorClass::NotFound => ApiError::NotFound(e.to_string()),
      ErrorClass::Conflict => ApiError::Conflict(e.to_string()),
      ErrorClass::Persistence => ApiError::Store(Box::new(e)),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::NotFound(m) | ApiError::BadRequest(m) | ApiError::Conflict(m) => {
        tracing::warn!(%status, "{m}");
        m.clone()
      }
      // Persistence details stay in the log.
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        "An internal error occurred.".to_owned()
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use uniflow_core::{Entity, Error};

  use super::*;

  #[test]
  fn core_errors_map_to_status_codes() {
    let not_found = ApiError::store(Error::NotFound { entity: Entity::Task, id: 3 });
    assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
    assert_eq!(not_found.to_string(), "not found: task 3 not found");

    let conflict = ApiError::store(Error::Conflict("taken".into()));
    assert_eq!(conflict.status(), StatusCode::CONFLICT);

    let invalid = ApiError::store(Error::InvalidInput("bad day".into()));
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn error_body_is_json() {
    let resp = ApiError::BadRequest("Email is required.".into()).into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"], "Email is required.");
  }
}
