//! Handlers for `/tasks` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tasks` | All tasks |
//! | `POST` | `/tasks` | Body: [`CreateBody`]; `title`, `deadline`, `priority`, `userId` required |
//! | `GET`  | `/tasks/:id` | 404 if not found |
//! | `PATCH`/`PUT` | `/tasks/:id` | Body: [`TaskPatch`]; only present fields change |
//! | `DELETE` | `/tasks/:id` | 204 |
//!
//! Every returned row carries its group as `group` (see [`WithGroup`]).
//! A falsy `groupId` (`0`, `false`, `""`, `null`) means no group.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uniflow_core::{
  patch::deserialize_group_id,
  store::PlannerStore,
  task::{NewTask, Priority, Task, TaskPatch},
};

use crate::{
  body,
  embed::{self, WithGroup},
  error::ApiError,
};

/// `GET /tasks`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<WithGroup<Task>>>, ApiError>
where
  S: PlannerStore,
{
  let tasks = store.list_tasks().await.map_err(ApiError::store)?;
  Ok(Json(embed::all(store.as_ref(), tasks).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub deadline:    Option<DateTime<Utc>>,
  pub priority:    Option<Priority>,
  pub user_id:     Option<i64>,
  #[serde(default, deserialize_with = "deserialize_group_id")]
  pub group_id:    Option<i64>,
}

impl CreateBody {
  fn validate(self) -> Result<NewTask, ApiError> {
    let missing =
      || ApiError::BadRequest("Title, deadline, priority, and userId are required.".into());
    Ok(NewTask {
      title:       body::present(self.title).ok_or_else(missing)?,
      description: self.description,
      deadline:    self.deadline.ok_or_else(missing)?,
      priority:    self.priority.ok_or_else(missing)?,
      user_id:     body::present_id(self.user_id).ok_or_else(missing)?,
      group_id:    self.group_id,
    })
  }
}

/// `POST /tasks`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlannerStore,
{
  let input = body::parse(body)?.validate()?;
  let task = store.create_task(input).await.map_err(ApiError::store)?;
  tracing::debug!(task_id = task.id, "created task");
  Ok((StatusCode::CREATED, Json(embed::one(store.as_ref(), task).await?)))
}

/// `GET /tasks/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<WithGroup<Task>>, ApiError>
where
  S: PlannerStore,
{
  let task = store
    .get_task(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("Task not found.".into()))?;
  Ok(Json(embed::one(store.as_ref(), task).await?))
}

/// `PATCH /tasks/:id` (also `PUT`)
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  body: Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<WithGroup<Task>>, ApiError>
where
  S: PlannerStore,
{
  let patch = body::parse(body)?;
  if patch.title.as_deref() == Some("") {
    return Err(ApiError::BadRequest("Title cannot be empty.".into()));
  }

  let task = store.update_task(id, patch).await.map_err(ApiError::store)?;
  tracing::debug!(task_id = id, completed = task.completed, "updated task");
  Ok(Json(embed::one(store.as_ref(), task).await?))
}

/// `DELETE /tasks/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: PlannerStore,
{
  store.delete_task(id).await.map_err(ApiError::store)?;
  tracing::debug!(task_id = id, "deleted task");
  Ok(StatusCode::NO_CONTENT)
}
