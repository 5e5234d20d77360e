//! Error types for `uniflow-core`.

use thiserror::Error;

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Entity {
  User,
  Group,
  Event,
  Task,
}

#[derive(Debug, Error)]
pub enum Error {
  /// A required field was missing or empty. Raised before any persistence
  /// attempt.
  #[error("{0}")]
  Validation(String),

  #[error("{entity} {id} not found")]
  NotFound { entity: Entity, id: i64 },

  /// A uniqueness constraint was violated (e.g. a duplicate email).
  #[error("{0}")]
  Conflict(String),

  /// Malformed input to a pure selector, e.g. a local day boundary that does
  /// not exist in the caller's time zone.
  #[error("invalid input: {0}")]
  InvalidInput(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of a failure, independent of the backend that
/// produced it. The HTTP layer maps each class to one status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
  Validation,
  NotFound,
  Conflict,
  Persistence,
}

/// Implemented by every error type that can cross the store boundary.
pub trait Classify {
  fn class(&self) -> ErrorClass;
}

impl Classify for Error {
  fn class(&self) -> ErrorClass {
    match self {
      Error::Validation(_) | Error::InvalidInput(_) => ErrorClass::Validation,
      Error::NotFound { .. } => ErrorClass::NotFound,
      Error::Conflict(_) => ErrorClass::Conflict,
    }
  }
}
