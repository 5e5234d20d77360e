//! Handlers for `/groups` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/groups` | With members |
//! | `POST` | `/groups` | Body: `{"name":"...","userIds":[1,2]}` |
//! | `GET`  | `/groups/:id` | 404 if not found |
//! | `PATCH`/`PUT` | `/groups/:id` | Body: [`GroupPatch`]; `userIds` replaces the member set |
//! | `DELETE` | `/groups/:id` | 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uniflow_core::{
  group::{Group, GroupPatch, NewGroup},
  store::PlannerStore,
};

use crate::{body, error::ApiError};

/// `GET /groups`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Group>>, ApiError>
where
  S: PlannerStore,
{
  let groups = store.list_groups().await.map_err(ApiError::store)?;
  Ok(Json(groups))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub name:     Option<String>,
  #[serde(default)]
  pub user_ids: Vec<i64>,
}

/// `POST /groups`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlannerStore,
{
  let body = body::parse(body)?;
  let name = body::present(body.name)
    .ok_or_else(|| ApiError::BadRequest("Group name is required.".into()))?;

  let group = store
    .create_group(NewGroup { name, member_ids: body.user_ids })
    .await
    .map_err(ApiError::store)?;
  tracing::debug!(group_id = group.id, members = group.members.len(), "created group");
  Ok((StatusCode::CREATED, Json(group)))
}

/// `GET /groups/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Group>, ApiError>
where
  S: PlannerStore,
{
  let group = store
    .get_group(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("Group not found.".into()))?;
  Ok(Json(group))
}

/// `PATCH /groups/:id` (also `PUT`)
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  body: Result<Json<GroupPatch>, JsonRejection>,
) -> Result<Json<Group>, ApiError>
where
  S: PlannerStore,
{
  let patch = body::parse(body)?;
  if patch.name.as_deref() == Some("") {
    return Err(ApiError::BadRequest("Group name cannot be empty.".into()));
  }
  let group = store.update_group(id, patch).await.map_err(ApiError::store)?;
  tracing::debug!(group_id = id, "updated group");
  Ok(Json(group))
}

/// `DELETE /groups/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: PlannerStore,
{
  store.delete_group(id).await.map_err(ApiError::store)?;
  tracing::debug!(group_id = id, "deleted group");
  Ok(StatusCode::NO_CONTENT)
}
