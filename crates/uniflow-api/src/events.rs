//! Handlers for `/events` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/events` | All events |
//! | `POST` | `/events` | Body: [`CreateBody`]; `title`, `startTime`, `endTime`, `userId` required |
//! | `GET`  | `/events/:id` | 404 if not found |
//! | `PATCH`/`PUT` | `/events/:id` | Body: [`EventPatch`]; only present fields change |
//! | `DELETE` | `/events/:id` | 204 |
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
  event::{Event, EventPatch, NewEvent},
  patch::deserialize_group_id,
  store::PlannerStore,
};

use crate::{
  body,
  embed::{self, WithGroup},
  error::ApiError,
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /events`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<WithGroup<Event>>>, ApiError>
where
  S: PlannerStore,
{
  let events = store.list_events().await.map_err(ApiError::store)?;
  Ok(Json(embed::all(store.as_ref(), events).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub title:      Option<String>,
  pub notes:      Option<String>,
  pub start_time: Option<DateTime<Utc>>,
  pub end_time:   Option<DateTime<Utc>>,
  pub user_id:    Option<i64>,
  #[serde(default, deserialize_with = "deserialize_group_id")]
  pub group_id:   Option<i64>,
}

impl CreateBody {
  fn validate(self) -> Result<NewEvent, ApiError> {
    let missing = || ApiError::BadRequest("Title, startTime, endTime, and userId are required.".into());
    Ok(NewEvent {
      title:      body::present(self.title).ok_or_else(missing)?,
      notes:      self.notes,
      start_time: self.start_time.ok_or_else(missing)?,
      end_time:   self.end_time.ok_or_else(missing)?,
      user_id:    body::present_id(self.user_id).ok_or_else(missing)?,
      group_id:   self.group_id,
    })
  }
}

/// `POST /events`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlannerStore,
{
  let input = body::parse(body)?.validate()?;
  if input.end_time < input.start_time {
    tracing::warn!(title = %input.title, "event ends before it starts");
  }

  let event = store.create_event(input).await.map_err(ApiError::store)?;
  tracing::debug!(event_id = event.id, "created event");
  Ok((StatusCode::CREATED, Json(embed::one(store.as_ref(), event).await?)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /events/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<WithGroup<Event>>, ApiError>
where
  S: PlannerStore,
{
  let event = store
    .get_event(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("Event not found.".into()))?;
  Ok(Json(embed::one(store.as_ref(), event).await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /events/:id` (also `PUT`)
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  body: Result<Json<EventPatch>, JsonRejection>,
) -> Result<Json<WithGroup<Event>>, ApiError>
where
  S: PlannerStore,
{
  let patch = body::parse(body)?;
  if patch.title.as_deref() == Some("") {
    return Err(ApiError::BadRequest("Title cannot be empty.".into()));
  }

  let event = store.update_event(id, patch).await.map_err(ApiError::store)?;
  if event.is_malformed() {
    tracing::warn!(event_id = id, "event ends before it starts");
  }
  tracing::debug!(event_id = id, "updated event");
  Ok(Json(embed::one(store.as_ref(), event).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /events/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: PlannerStore,
{
  store.delete_event(id).await.map_err(ApiError::store)?;
  tracing::debug!(event_id = id, "deleted event");
  Ok(StatusCode::NO_CONTENT)
}
