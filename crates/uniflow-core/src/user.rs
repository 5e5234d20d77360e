//! Users. Created once via signup and immutable afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:         i64,
  /// Unique across all users.
  pub email:      String,
  pub name:       Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input for [`PlannerStore::create_user`](crate::store::PlannerStore::create_user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
  pub email: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:  Option<String>,
}
