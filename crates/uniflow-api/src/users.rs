//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users` | Newest first |
//! | `POST` | `/users` | Body: `{"email":"...","name":"..."}`; 409 on duplicate email |

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uniflow_core::{
  store::PlannerStore,
  user::{NewUser, User},
};

use crate::{body, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<User>>, ApiError>
where
  S: PlannerStore,
{
  let users = store.list_users().await.map_err(ApiError::store)?;
  Ok(Json(users))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub email: Option<String>,
  pub name:  Option<String>,
}

/// `POST /users`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlannerStore,
{
  let body = body::parse(body)?;
  let email =
    body::present(body.email).ok_or_else(|| ApiError::BadRequest("Email is required.".into()))?;

  let user = store
    .create_user(NewUser { email, name: body.name })
    .await
    .map_err(ApiError::store)?;
  tracing::debug!(user_id = user.id, "created user");
  Ok((StatusCode::CREATED, Json(user)))
}
