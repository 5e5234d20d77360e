//! Dashboard: the filtered task list next to the upcoming events.

use std::fmt::{Display, Write as _};

use chrono::TimeZone;
use uniflow_core::{calendar::color_hex, view::Dashboard};

use super::{checkbox, local_time, priority_tag};

pub fn render<Tz>(dashboard: &Dashboard<'_>, tz: &Tz) -> String
where
  Tz: TimeZone,
  Tz::Offset: Display,
{
  let state = &dashboard.state;
  let mut out = String::new();

  let _ = writeln!(
    out,
    "Tasks ({} of {}) · filter {} · sort {} {}",
    dashboard.tasks.len(),
    dashboard.total_tasks,
    state.priority_filter,
    state.task_sort_key,
    state.task_direction,
  );
  if dashboard.tasks.is_empty() {
    let _ = writeln!(out, "  No tasks.");
  }
  for row in &dashboard.tasks {
    let task = row.task;
    let _ = write!(
      out,
      "  {} {} #{:<4} {}  due {}",
      checkbox(task),
      priority_tag(task.priority),
      task.id,
      task.title,
      local_time(task.deadline, tz),
    );
    if let Some(name) = row.group_name {
      let _ = write!(out, "  ({name})");
    }
    out.push('\n');
  }

  out.push('\n');
  let _ = writeln!(out, "Upcoming events · {}", state.event_direction);
  if dashboard.events.is_empty() {
    let _ = writeln!(out, "  No upcoming events.");
  }
  for event in &dashboard.events {
    let _ = writeln!(
      out,
      "  {} #{:<4} {}  {} – {}",
      color_hex(event),
      event.id,
      event.title,
      local_time(event.start_time, tz),
      local_time(event.end_time, tz),
    );
  }
  out
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, TimeZone, Utc};
  use uniflow_core::{
    event::Event,
    group::Group,
    task::{Priority, Task},
    view::{DashboardState, PriorityFilter},
  };

  use super::*;

  fn task(id: i64, title: &str, priority: Priority, group_id: Option<i64>) -> Task {
    Task {
      id,
      title: title.into(),
      description: None,
      deadline: Utc.with_ymd_and_hms(2024, 6, 10 + id as u32, 12, 0, 0).unwrap(),
      priority,
      completed: id == 2,
      user_id: 1,
      group_id,
    }
  }

  #[test]
  fn renders_filtered_tasks_with_group_names() {
    let tasks = vec![
      task(1, "Essay", Priority::High, Some(5)),
      task(2, "Reading", Priority::Low, None),
      task(3, "Lab report", Priority::High, None),
    ];
    let groups = vec![Group { id: 5, name: "CS101".into(), members: vec![] }];
    let events: Vec<Event> = vec![];
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    let state = DashboardState::default().with_filter(PriorityFilter::Only(Priority::High));
    let dashboard = state.render(&tasks, &events, &groups, today, &Utc);
    let text = render(&dashboard, &Utc);

    assert!(text.starts_with("Tasks (2 of 3) · filter HIGH · sort deadline asc"));
    assert!(text.contains("Essay  due Tue Jun 11 12:00  (CS101)"));
    assert!(text.contains("Lab report"));
    assert!(!text.contains("Reading"));
    assert!(text.contains("No upcoming events."));
  }

  #[test]
  fn renders_event_colors() {
    let events = vec![Event {
      id:         4,
      title:      "Seminar".into(),
      notes:      None,
      start_time: Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap(),
      end_time:   Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap(),
      user_id:    1,
      group_id:   None,
    }];
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let dashboard = DashboardState::default().render(&[], &events, &[], today, &Utc);
    let text = render(&dashboard, &Utc);

    assert!(text.contains("No tasks."));
    assert!(text.contains("#ec4899 #4    Seminar  Mon Jun 3 09:00 – Mon Jun 3 10:00"));
  }
}
