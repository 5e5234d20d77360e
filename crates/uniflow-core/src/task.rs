//! Tasks with a deadline and a priority.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::patch::Patch;

/// Task priority. Serialised and parsed as `LOW`, `MEDIUM`, `HIGH`
/// (case-sensitive).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Priority {
  Low,
  Medium,
  High,
}

impl Priority {
  /// Fixed rank used by the priority sort: HIGH=3, MEDIUM=2, LOW=1.
  pub fn rank(self) -> i32 {
    match self {
      Priority::High => 3,
      Priority::Medium => 2,
      Priority::Low => 1,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
  pub id:          i64,
  pub title:       String,
  pub description: Option<String>,
  pub deadline:    DateTime<Utc>,
  pub priority:    Priority,
  #[serde(default)]
  pub completed:   bool,
  pub user_id:     i64,
  pub group_id:    Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
  pub title:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub deadline:    DateTime<Utc>,
  pub priority:    Priority,
  pub user_id:     i64,
  #[serde(default, deserialize_with = "crate::patch::deserialize_group_id")]
  pub group_id:    Option<i64>,
}

/// Partial update for a task. Only present fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title:       Option<String>,
  #[serde(default, skip_serializing_if = "Patch::is_absent")]
  pub description: Patch<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deadline:    Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub priority:    Option<Priority>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub completed:   Option<bool>,
  #[serde(
    default,
    deserialize_with = "crate::patch::deserialize_group_patch",
    skip_serializing_if = "Patch::is_absent"
  )]
  pub group_id:    Patch<i64>,
}

impl TaskPatch {
  /// A patch that only flips the completion flag.
  pub fn completed(done: bool) -> Self { Self { completed: Some(done), ..Self::default() } }

  pub fn is_empty(&self) -> bool {
    self.title.is_none()
      && self.description.is_absent()
      && self.deadline.is_none()
      && self.priority.is_none()
      && self.completed.is_none()
      && self.group_id.is_absent()
  }

  pub fn apply(self, task: &mut Task) {
    if let Some(title) = self.title {
      task.title = title;
    }
    self.description.apply_to(&mut task.description);
    if let Some(deadline) = self.deadline {
      task.deadline = deadline;
    }
    if let Some(priority) = self.priority {
      task.priority = priority;
    }
    if let Some(completed) = self.completed {
      task.completed = completed;
    }
    self.group_id.normalize_group().apply_to(&mut task.group_id);
  }
}
