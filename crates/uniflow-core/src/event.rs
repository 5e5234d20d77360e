//! Calendar events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::patch::Patch;

/// A timed calendar entry owned by a user and optionally shared with a group.
///
/// `end_time >= start_time` is expected but not enforced; the day selectors
/// apply their interval test to whatever is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  pub id:         i64,
  pub title:      String,
  pub notes:      Option<String>,
  pub start_time: DateTime<Utc>,
  pub end_time:   DateTime<Utc>,
  pub user_id:    i64,
  pub group_id:   Option<i64>,
}

impl Event {
  pub fn is_malformed(&self) -> bool { self.end_time < self.start_time }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
  pub title:      String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes:      Option<String>,
  pub start_time: DateTime<Utc>,
  pub end_time:   DateTime<Utc>,
  pub user_id:    i64,
  #[serde(default, deserialize_with = "crate::patch::deserialize_group_id")]
  pub group_id:   Option<i64>,
}

/// Partial update for an event. Only present fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title:      Option<String>,
  #[serde(default, skip_serializing_if = "Patch::is_absent")]
  pub notes:      Patch<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub start_time: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_time:   Option<DateTime<Utc>>,
  #[serde(
    default,
    deserialize_with = "crate::patch::deserialize_group_patch",
    skip_serializing_if = "Patch::is_absent"
  )]
  pub group_id:   Patch<i64>,
}

impl EventPatch {
  pub fn is_empty(&self) -> bool {
    self.title.is_none()
      && self.notes.is_absent()
      && self.start_time.is_none()
      && self.end_time.is_none()
      && self.group_id.is_absent()
  }

  /// Apply the patch to an in-memory event.
  pub fn apply(self, event: &mut Event) {
    if let Some(title) = self.title {
      event.title = title;
    }
    self.notes.apply_to(&mut event.notes);
    if let Some(start) = self.start_time {
      event.start_time = start;
    }
    if let Some(end) = self.end_time {
      event.end_time = end;
    }
    self.group_id.normalize_group().apply_to(&mut event.group_id);
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn sample() -> Event {
    Event {
      id:         7,
      title:      "Lecture".into(),
      notes:      Some("room 101".into()),
      start_time: Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap(),
      end_time:   Utc.with_ymd_and_hms(2024, 6, 10, 10, 0, 0).unwrap(),
      user_id:    1,
      group_id:   Some(3),
    }
  }

  #[test]
  fn patch_only_touches_present_fields() {
    let mut event = sample();
    let patch: EventPatch =
      serde_json::from_str(r#"{"title":"Seminar","notes":null}"#).unwrap();
    patch.apply(&mut event);

    assert_eq!(event.title, "Seminar");
    assert_eq!(event.notes, None);
    assert_eq!(event.group_id, Some(3));
    assert_eq!(event.start_time, sample().start_time);
  }

  #[test]
  fn zero_group_id_clears_group() {
    let mut event = sample();
    let patch: EventPatch = serde_json::from_str(r#"{"groupId":0}"#).unwrap();
    patch.apply(&mut event);
    assert_eq!(event.group_id, None);
  }

  #[test]
  fn empty_patch_is_empty() {
    let patch: EventPatch = serde_json::from_str("{}").unwrap();
    assert!(patch.is_empty());
  }

  #[test]
  fn serialises_camel_case() {
    let json = serde_json::to_value(sample()).unwrap();
    assert_eq!(json["startTime"], "2024-06-10T09:00:00Z");
    assert_eq!(json["groupId"], 3);
    assert_eq!(json["userId"], 1);
  }
}
