//! Plain-text rendering of the core view-models.
//!
//! Every renderer is a pure function from a view-model to a `String`, so the
//! binary only decides where to print it.

pub mod calendar;
pub mod dashboard;

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};
use uniflow_core::task::{Priority, Task};

/// Format `instant` in the caller's zone, e.g. `Mon Jun 10 09:00`.
pub(crate) fn local_time<Tz>(instant: DateTime<Utc>, tz: &Tz) -> String
where
  Tz: TimeZone,
  Tz::Offset: Display,
{
  instant.with_timezone(tz).format("%a %b %-d %H:%M").to_string()
}

/// Fixed-width priority tag.
pub(crate) fn priority_tag(priority: Priority) -> &'static str {
  match priority {
    Priority::High => "[HIGH]",
    Priority::Medium => "[MED] ",
    Priority::Low => "[LOW] ",
  }
}

pub(crate) fn checkbox(task: &Task) -> &'static str { if task.completed { "[x]" } else { "[ ]" } }
