//! JSON REST API for UniFlow.
//!
//! Exposes an axum [`Router`] backed by any [`uniflow_core::store::PlannerStore`].
//! Auth and TLS are left to the caller.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(uniflow_api::api_router(store.clone()))
//! ```

pub mod embed;
pub mod error;
pub mod events;
pub mod groups;
pub mod tasks;
pub mod users;

mod body;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use uniflow_core::store::PlannerStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: PlannerStore + 'static,
{
  Router::new()
    .route("/", get(welcome))
    // Users
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    // Groups
    .route("/groups", get(groups::list::<S>).post(groups::create::<S>))
    .route(
      "/groups/{id}",
      get(groups::get_one::<S>)
        .patch(groups::update::<S>)
        .put(groups::update::<S>)
        .delete(groups::delete_one::<S>),
    )
    // Events
    .route("/events", get(events::list::<S>).post(events::create::<S>))
    .route(
      "/events/{id}",
      get(events::get_one::<S>)
        .patch(events::update::<S>)
        .put(events::update::<S>)
        .delete(events::delete_one::<S>),
    )
    // Tasks
    .route("/tasks", get(tasks::list::<S>).post(tasks::create::<S>))
    .route(
      "/tasks/{id}",
      get(tasks::get_one::<S>)
        .patch(tasks::update::<S>)
        .put(tasks::update::<S>)
        .delete(tasks::delete_one::<S>),
    )
    .with_state(store)
}

/// `GET /`
async fn welcome() -> Json<Value> { Json(json!({ "message": "Welcome to the Uniflow API!" })) }
