//! Error type for `uniflow-store-sqlite`.

use thiserror::Error;
use uniflow_core::{Classify, ErrorClass};

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] uniflow_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown priority in database: {0:?}")]
  UnknownPriority(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Classify for Error {
  fn class(&self) -> ErrorClass {
    match self {
      Error::Core(e) => e.class(),
      _ => ErrorClass::Persistence,
    }
  }
}

/// Whether `e` is a UNIQUE or PRIMARY KEY violation.
///
/// Foreign-key violations never reach here: references are checked inside the
/// same transaction before any write.
pub(crate) fn is_unique_violation(e: &tokio_rusqlite::Error) -> bool {
  let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(failure, _)) = e else {
    return false;
  };
  matches!(
    failure.extended_code,
    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}
