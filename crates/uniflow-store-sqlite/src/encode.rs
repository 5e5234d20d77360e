//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` suffix) so that lexical order matches chronological order.

use std::str::FromStr as _;

use chrono::{DateTime, SecondsFormat, Utc};
use uniflow_core::{
  event::Event,
  group::Group,
  task::{Priority, Task},
  user::User,
};

use crate::{Error, Result};

// ─── Column lists ────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "id, email, name, created_at";
pub const EVENT_COLUMNS: &str = "id, title, notes, start_time, end_time, user_id, group_id";
pub const TASK_COLUMNS: &str =
  "id, title, description, deadline, priority, completed, user_id, group_id";

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Priority ────────────────────────────────────────────────────────────────

pub fn encode_priority(p: Priority) -> String { p.to_string() }

pub fn decode_priority(s: &str) -> Result<Priority> {
  Priority::from_str(s).map_err(|_| Error::UnknownPriority(s.to_owned()))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// A `users` row before timestamp decoding.
pub struct RawUser {
  pub id:         i64,
  pub email:      String,
  pub name:       Option<String>,
  pub created_at: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      email:      row.get(1)?,
      name:       row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:         self.id,
      email:      self.email,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A group row plus its member rows.
pub struct RawGroup {
  pub id:      i64,
  pub name:    String,
  pub members: Vec<RawUser>,
}

impl RawGroup {
  pub fn into_group(self) -> Result<Group> {
    Ok(Group {
      id:      self.id,
      name:    self.name,
      members: self
        .members
        .into_iter()
        .map(RawUser::into_user)
        .collect::<Result<_>>()?,
    })
  }
}

pub struct RawEvent {
  pub id:         i64,
  pub title:      String,
  pub notes:      Option<String>,
  pub start_time: String,
  pub end_time:   String,
  pub user_id:    i64,
  pub group_id:   Option<i64>,
}

impl RawEvent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      title:      row.get(1)?,
      notes:      row.get(2)?,
      start_time: row.get(3)?,
      end_time:   row.get(4)?,
      user_id:    row.get(5)?,
      group_id:   row.get(6)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      id:         self.id,
      title:      self.title,
      notes:      self.notes,
      start_time: decode_dt(&self.start_time)?,
      end_time:   decode_dt(&self.end_time)?,
      user_id:    self.user_id,
      group_id:   self.group_id,
    })
  }
}

pub struct RawTask {
  pub id:          i64,
  pub title:       String,
  pub description: Option<String>,
  pub deadline:    String,
  pub priority:    String,
  pub completed:   bool,
  pub user_id:     i64,
  pub group_id:    Option<i64>,
}

impl RawTask {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      title:       row.get(1)?,
      description: row.get(2)?,
      deadline:    row.get(3)?,
      priority:    row.get(4)?,
      completed:   row.get(5)?,
      user_id:     row.get(6)?,
      group_id:    row.get(7)?,
    })
  }

  pub fn into_task(self) -> Result<Task> {
    Ok(Task {
      id:          self.id,
      title:       self.title,
      description: self.description,
      deadline:    decode_dt(&self.deadline)?,
      priority:    decode_priority(&self.priority)?,
      completed:   self.completed,
      user_id:     self.user_id,
      group_id:    self.group_id,
    })
  }
}
