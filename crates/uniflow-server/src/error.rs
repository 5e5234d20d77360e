//! Startup errors for the server library.

use axum::http::header::InvalidHeaderValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("invalid CORS origin {origin:?}: {source}")]
  CorsOrigin {
    origin: String,
    #[source]
    source: InvalidHeaderValue,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
