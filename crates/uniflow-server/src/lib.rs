//! HTTP server assembly for UniFlow.
//!
//! Wraps the [`uniflow_api`] router with request tracing and CORS, and owns
//! the layered [`ServerConfig`].

pub mod error;

pub use error::{Error, Result};

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, http::HeaderValue};
use serde::Deserialize;
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};
use uniflow_core::store::PlannerStore;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration.
///
/// Sources, lowest precedence first: built-in defaults, the TOML file, then
/// `UNIFLOW_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub database_path: PathBuf,
  /// Allowed browser origin; any origin when unset.
  #[serde(default)]
  pub cors_origin:   Option<String>,
}

impl ServerConfig {
  pub fn load(file: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 3000)?
      .set_default("database_path", "uniflow.db")?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("UNIFLOW"))
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// The CORS layer for the configured origin.
  pub fn cors(&self) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match &self.cors_origin {
      None => Ok(layer.allow_origin(Any)),
      Some(origin) => {
        let value = HeaderValue::from_str(origin).map_err(|source| Error::CorsOrigin {
          origin: origin.clone(),
          source,
        })?;
        Ok(layer.allow_origin(value))
      }
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `store`.
pub fn router<S>(store: Arc<S>, cors: CorsLayer) -> Router
where
  S: PlannerStore + 'static,
{
  uniflow_api::api_router(store)
    .layer(cors)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
