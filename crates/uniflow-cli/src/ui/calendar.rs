//! Month grid and single-day agenda.

use std::fmt::{Display, Write as _};

use chrono::{Datelike, TimeZone};
use uniflow_core::{
  calendar::{DayAgenda, DayCell, color_hex},
  group::{Group, group_name},
};

use super::{checkbox, local_time, priority_tag};

const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// Render a month as a Monday-first grid.
///
/// Each day shows `*` when an event starts on it and `!` when a task is due.
/// The coloured markers follow the grid, one line per day that has any.
pub fn render_month(cells: &[DayCell]) -> String {
  let mut out = String::new();
  let Some(first) = cells.first() else {
    return out;
  };

  let _ = writeln!(out, "{}", first.date.format("%B %Y"));
  let header: Vec<String> = WEEKDAYS.iter().map(|d| format!("{d:<4}")).collect();
  let _ = writeln!(out, "{}", header.join(" ").trim_end());

  let lead = first.date.weekday().num_days_from_monday() as usize;
  let mut row: Vec<String> = vec!["    ".to_string(); lead];
  for cell in cells {
    row.push(format!(
      "{:>2}{}{}",
      cell.date.day(),
      if cell.has_events { '*' } else { ' ' },
      if cell.has_tasks { '!' } else { ' ' },
    ));
    if row.len() == 7 {
      let _ = writeln!(out, "{}", row.join(" ").trim_end());
      row.clear();
    }
  }
  if !row.is_empty() {
    let _ = writeln!(out, "{}", row.join(" ").trim_end());
  }

  let marked: Vec<&DayCell> = cells.iter().filter(|c| !c.markers.shown.is_empty()).collect();
  if !marked.is_empty() {
    out.push('\n');
  }
  for cell in marked {
    let colors: Vec<&str> = cell.markers.shown.iter().map(|m| m.hex()).collect();
    let _ = write!(out, "{:>4}: {}", cell.date.day(), colors.join(" "));
    if cell.markers.overflow > 0 {
      let _ = write!(out, " +{} more", cell.markers.overflow);
    }
    out.push('\n');
  }
  out
}

/// Render everything scheduled on one day.
pub fn render_agenda<Tz>(agenda: &DayAgenda<'_>, groups: &[Group], tz: &Tz) -> String
where
  Tz: TimeZone,
  Tz::Offset: Display,
{
  let mut out = String::new();
  let _ = writeln!(out, "{}", agenda.date.format("%A, %B %-d, %Y"));
  if agenda.is_empty() {
    let _ = writeln!(out, "  Nothing scheduled.");
    return out;
  }

  if !agenda.events.is_empty() {
    let _ = writeln!(out, "Events");
  }
  for event in &agenda.events {
    let _ = write!(
      out,
      "  {} #{:<4} {}  {} – {}",
      color_hex(event),
      event.id,
      event.title,
      local_time(event.start_time, tz),
      local_time(event.end_time, tz),
    );
    if let Some(name) = event.group_id.and_then(|id| group_name(groups, id)) {
      let _ = write!(out, "  ({name})");
    }
    out.push('\n');
    if let Some(notes) = &event.notes {
      let _ = writeln!(out, "         {notes}");
    }
  }

  if !agenda.tasks.is_empty() {
    let _ = writeln!(out, "Due");
  }
  for task in &agenda.tasks {
    let _ = writeln!(
      out,
      "  {} {} #{:<4} {}  {}",
      checkbox(task),
      priority_tag(task.priority),
      task.id,
      task.title,
      local_time(task.deadline, tz),
    );
  }
  out
}
