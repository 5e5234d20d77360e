//! Groups and their many-to-many membership.

use serde::{Deserialize, Serialize};

use crate::user::User;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
  pub id:      i64,
  pub name:    String,
  /// Ordered by user id.
  #[serde(default)]
  pub members: Vec<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroup {
  pub name:       String,
  #[serde(default, rename = "userIds")]
  pub member_ids: Vec<i64>,
}

/// Partial update for a group. `member_ids`, when present, replaces the whole
/// member set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:       Option<String>,
  #[serde(default, rename = "userIds", skip_serializing_if = "Option::is_none")]
  pub member_ids: Option<Vec<i64>>,
}

impl GroupPatch {
  pub fn is_empty(&self) -> bool { self.name.is_none() && self.member_ids.is_none() }
}

/// Look up a group's display name by id.
pub fn group_name(groups: &[Group], id: i64) -> Option<&str> {
  groups.iter().find(|g| g.id == id).map(|g| g.name.as_str())
}
