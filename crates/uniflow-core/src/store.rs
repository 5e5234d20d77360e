//! The `PlannerStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `uniflow-store-sqlite`).
//! Higher layers (`uniflow-api`, `uniflow-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use crate::{
  error::Classify,
  event::{Event, EventPatch, NewEvent},
  group::{Group, GroupPatch, NewGroup},
  task::{NewTask, Task, TaskPatch},
  user::{NewUser, User},
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the UniFlow data access layer.
///
/// Records are keyed by store-assigned integer ids. Updates take explicit
/// patch structures; fields a patch leaves absent are never written. Every
/// lookup by id that misses on update or delete is reported as a not-found
/// error; plain reads return `None`.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PlannerStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create a user. A duplicate email is a conflict.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// List all users, newest first.
  fn list_users(&self) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  // ── Groups ────────────────────────────────────────────────────────────

  fn create_group(
    &self,
    input: NewGroup,
  ) -> impl Future<Output = Result<Group, Self::Error>> + Send + '_;

  fn list_groups(&self) -> impl Future<Output = Result<Vec<Group>, Self::Error>> + Send + '_;

  fn get_group(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + '_;

  fn update_group(
    &self,
    id: i64,
    patch: GroupPatch,
  ) -> impl Future<Output = Result<Group, Self::Error>> + Send + '_;

  /// Delete a group. Events and tasks that referenced it become ungrouped.
  fn delete_group(&self, id: i64) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  fn create_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  fn list_events(&self) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  fn get_event(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  fn update_event(
    &self,
    id: i64,
    patch: EventPatch,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  fn delete_event(&self, id: i64) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Tasks ─────────────────────────────────────────────────────────────

  fn create_task(
    &self,
    input: NewTask,
  ) -> impl Future<Output = Result<Task, Self::Error>> + Send + '_;

  fn list_tasks(&self) -> impl Future<Output = Result<Vec<Task>, Self::Error>> + Send + '_;

  fn get_task(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Task>, Self::Error>> + Send + '_;

  fn update_task(
    &self,
    id: i64,
    patch: TaskPatch,
  ) -> impl Future<Output = Result<Task, Self::Error>> + Send + '_;

  fn delete_task(&self, id: i64) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
