//! Dashboard view-models: filtered and sorted task lists, upcoming events, and
//! the immutable view-state record that drives them.

use std::{cell::RefCell, cmp::Ordering, fmt, str::FromStr};

use chrono::{NaiveDate, TimeZone};
use feruca::Collator;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  calendar::local_date,
  event::Event,
  group::{Group, group_name},
  task::{Priority, Task},
};

/// Maximum number of events in the dashboard's upcoming list.
pub const UPCOMING_LIMIT: usize = 10;

// ─── Sort and filter parameters ──────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
  #[default]
  Asc,
  Desc,
}

impl SortDirection {
  pub fn toggled(self) -> Self {
    match self {
      Self::Asc => Self::Desc,
      Self::Desc => Self::Asc,
    }
  }

  /// `Desc` negates the comparator; equal keys stay equal so a stable sort
  /// keeps their input order either way.
  pub fn apply(self, ordering: Ordering) -> Ordering {
    match self {
      Self::Asc => ordering,
      Self::Desc => ordering.reverse(),
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskSortKey {
  #[default]
  Deadline,
  Priority,
  Title,
}

/// `ALL` or a single priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
  #[default]
  All,
  Only(Priority),
}

impl PriorityFilter {
  pub fn matches(self, priority: Priority) -> bool {
    match self {
      Self::All => true,
      Self::Only(p) => p == priority,
    }
  }
}

impl FromStr for PriorityFilter {
  type Err = strum::ParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s == "ALL" {
      return Ok(Self::All);
    }
    Priority::from_str(s).map(Self::Only)
  }
}

impl fmt::Display for PriorityFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::All => f.write_str("ALL"),
      Self::Only(p) => write!(f, "{p}"),
    }
  }
}

// ─── Comparators ─────────────────────────────────────────────────────────────

thread_local! {
  static COLLATOR: RefCell<Collator> = RefCell::new(Collator::default());
}

/// Unicode Collation Algorithm order with the CLDR root tailoring.
///
/// Accents and case are secondary and tertiary differences, so `Économie`
/// sorts between `apple` and `Français`, and `apple` precedes `Apple`.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
  COLLATOR.with_borrow_mut(|collator| collator.collate(a, b))
}

/// The ascending comparator for `key`.
///
/// Priority compares `rank(b) - rank(a)`, so "ascending" puts HIGH first.
pub fn compare_tasks(a: &Task, b: &Task, key: TaskSortKey) -> Ordering {
  match key {
    TaskSortKey::Deadline => a.deadline.cmp(&b.deadline),
    TaskSortKey::Priority => b.priority.rank().cmp(&a.priority.rank()),
    TaskSortKey::Title => compare_titles(&a.title, &b.title),
  }
}

// ─── Selectors ───────────────────────────────────────────────────────────────

/// Filter by priority, then stable-sort by `key` in `direction`.
pub fn view_tasks(
  tasks: &[Task],
  filter: PriorityFilter,
  key: TaskSortKey,
  direction: SortDirection,
) -> Vec<&Task> {
  let mut out: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t.priority)).collect();
  out.sort_by(|a, b| direction.apply(compare_tasks(a, b, key)));
  out
}

/// Events whose local start date is `today` or later, sorted by start time and
/// truncated to `limit`.
pub fn upcoming_events<'a, Tz: TimeZone>(
  events: &'a [Event],
  today: NaiveDate,
  tz: &Tz,
  direction: SortDirection,
  limit: usize,
) -> Vec<&'a Event> {
  let mut out: Vec<&Event> = events
    .iter()
    .filter(|e| local_date(e.start_time, tz) >= today)
    .collect();
  out.sort_by(|a, b| direction.apply(a.start_time.cmp(&b.start_time)));
  out.truncate(limit);
  out
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

/// The dashboard's filter and sort settings. Updates return a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardState {
  pub priority_filter: PriorityFilter,
  pub task_sort_key:   TaskSortKey,
  pub task_direction:  SortDirection,
  pub event_direction: SortDirection,
}

impl DashboardState {
  pub fn with_filter(self, priority_filter: PriorityFilter) -> Self {
    Self { priority_filter, ..self }
  }

  pub fn with_sort_key(self, task_sort_key: TaskSortKey) -> Self { Self { task_sort_key, ..self } }

  pub fn toggle_task_direction(self) -> Self {
    Self { task_direction: self.task_direction.toggled(), ..self }
  }

  pub fn toggle_event_direction(self) -> Self {
    Self { event_direction: self.event_direction.toggled(), ..self }
  }

  /// Compute the dashboard view-model from full collections.
  pub fn render<'a, Tz: TimeZone>(
    &self,
    tasks: &'a [Task],
    events: &'a [Event],
    groups: &'a [Group],
    today: NaiveDate,
    tz: &Tz,
  ) -> Dashboard<'a> {
    let rows = view_tasks(tasks, self.priority_filter, self.task_sort_key, self.task_direction)
      .into_iter()
      .map(|task| TaskRow {
        task,
        group_name: task.group_id.and_then(|id| group_name(groups, id)),
      })
      .collect();

    Dashboard {
      state:       *self,
      total_tasks: tasks.len(),
      tasks:       rows,
      events:      upcoming_events(events, today, tz, self.event_direction, UPCOMING_LIMIT),
    }
  }
}

/// A task as listed on the dashboard.
#[derive(Debug, Clone, Copy)]
pub struct TaskRow<'a> {
  pub task:       &'a Task,
  pub group_name: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct Dashboard<'a> {
  pub state:       DashboardState,
  /// Task count before filtering.
  pub total_tasks: usize,
  pub tasks:       Vec<TaskRow<'a>>,
  pub events:      Vec<&'a Event>,
}

#[cfg(test)]
mod tests {
  use chrono::{DateTime, FixedOffset, Utc};

  use super::*;

  fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
  }

  fn task(id: i64, title: &str, priority: Priority, deadline: DateTime<Utc>) -> Task {
    Task {
      id,
      title: title.into(),
      description: None,
      deadline,
      priority,
      completed: false,
      user_id: 1,
      group_id: None,
    }
  }

  fn event(id: i64, start: DateTime<Utc>) -> Event {
    Event {
      id,
      title: format!("event {id}"),
      notes: None,
      start_time: start,
      end_time: start,
      user_id: 1,
      group_id: None,
    }
  }

  fn titles(tasks: &[&Task]) -> Vec<String> { tasks.iter().map(|t| t.title.clone()).collect() }

  fn june(day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, day).unwrap() }

  #[test]
  fn priority_ascending_puts_high_first() {
    let tasks = [
      task(1, "A", Priority::Low, at(10, 9)),
      task(2, "B", Priority::High, at(10, 9)),
      task(3, "C", Priority::Medium, at(10, 9)),
    ];
    let out = view_tasks(&tasks, PriorityFilter::All, TaskSortKey::Priority, SortDirection::Asc);
    assert_eq!(titles(&out), ["B", "C", "A"]);

    let out = view_tasks(&tasks, PriorityFilter::All, TaskSortKey::Priority, SortDirection::Desc);
    assert_eq!(titles(&out), ["A", "C", "B"]);
  }

  #[test]
  fn sort_is_stable_for_equal_keys_in_both_directions() {
    let tasks = [
      task(1, "first", Priority::High, at(10, 9)),
      task(2, "second", Priority::Low, at(11, 9)),
      task(3, "third", Priority::High, at(12, 9)),
      task(4, "fourth", Priority::High, at(13, 9)),
    ];
    let asc = view_tasks(&tasks, PriorityFilter::All, TaskSortKey::Priority, SortDirection::Asc);
    assert_eq!(titles(&asc), ["first", "third", "fourth", "second"]);

    let desc = view_tasks(&tasks, PriorityFilter::All, TaskSortKey::Priority, SortDirection::Desc);
    assert_eq!(titles(&desc), ["second", "first", "third", "fourth"]);
  }

  #[test]
  fn deadline_sort_and_filter() {
    let tasks = [
      task(1, "late", Priority::High, at(20, 9)),
      task(2, "low", Priority::Low, at(5, 9)),
      task(3, "early", Priority::High, at(3, 9)),
    ];
    let out = view_tasks(
      &tasks,
      PriorityFilter::Only(Priority::High),
      TaskSortKey::Deadline,
      SortDirection::Asc,
    );
    assert_eq!(titles(&out), ["early", "late"]);
  }

  #[test]
  fn title_sort_ignores_case() {
    let tasks = [
      task(1, "banana", Priority::Low, at(1, 9)),
      task(2, "Apple", Priority::Low, at(1, 9)),
      task(3, "cherry", Priority::Low, at(1, 9)),
      task(4, "apple", Priority::Low, at(1, 9)),
    ];
    let out = view_tasks(&tasks, PriorityFilter::All, TaskSortKey::Title, SortDirection::Asc);
    assert_eq!(titles(&out), ["apple", "Apple", "banana", "cherry"]);
  }

  #[test]
  fn title_sort_places_accented_letters_with_their_base() {
    assert_eq!(compare_titles("Économie", "Français"), Ordering::Less);
    assert_eq!(compare_titles("Ärger", "zebra"), Ordering::Less);
    assert_eq!(compare_titles("résumé", "resume"), Ordering::Greater);

    let tasks = [
      task(1, "zebra", Priority::Low, at(1, 9)),
      task(2, "Français", Priority::Low, at(1, 9)),
      task(3, "Économie", Priority::Low, at(1, 9)),
      task(4, "Ärger", Priority::Low, at(1, 9)),
    ];
    let out = view_tasks(&tasks, PriorityFilter::All, TaskSortKey::Title, SortDirection::Asc);
    assert_eq!(titles(&out), ["Ärger", "Économie", "Français", "zebra"]);
  }

  #[test]
  fn view_tasks_is_idempotent() {
    let tasks = [
      task(1, "b", Priority::Medium, at(4, 9)),
      task(2, "a", Priority::High, at(2, 9)),
      task(3, "c", Priority::Medium, at(4, 9)),
    ];
    let once: Vec<Task> =
      view_tasks(&tasks, PriorityFilter::All, TaskSortKey::Deadline, SortDirection::Desc)
        .into_iter()
        .cloned()
        .collect();
    let twice = view_tasks(&once, PriorityFilter::All, TaskSortKey::Deadline, SortDirection::Desc);
    assert_eq!(titles(&twice), ["b", "c", "a"]);
    assert_eq!(titles(&twice), once.iter().map(|t| t.title.clone()).collect::<Vec<_>>());
  }

  #[test]
  fn priority_filter_parses() {
    assert_eq!("ALL".parse::<PriorityFilter>().unwrap(), PriorityFilter::All);
    assert_eq!(
      "LOW".parse::<PriorityFilter>().unwrap(),
      PriorityFilter::Only(Priority::Low)
    );
    assert!("all".parse::<PriorityFilter>().is_err());
    assert_eq!(PriorityFilter::Only(Priority::High).to_string(), "HIGH");
  }

  #[test]
  fn upcoming_includes_earlier_today_and_excludes_past_days() {
    let events = [
      event(1, at(9, 23)),
      event(2, at(10, 1)),
      event(3, at(12, 9)),
      event(4, at(11, 9)),
    ];
    let out = upcoming_events(&events, june(10), &Utc, SortDirection::Asc, UPCOMING_LIMIT);
    assert_eq!(out.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2, 4, 3]);

    let out = upcoming_events(&events, june(10), &Utc, SortDirection::Desc, UPCOMING_LIMIT);
    assert_eq!(out.iter().map(|e| e.id).collect::<Vec<_>>(), vec![3, 4, 2]);
  }

  #[test]
  fn upcoming_caps_at_limit() {
    let events: Vec<Event> = (1..=15).map(|id| event(id, at(10 + (id as u32 % 5), 9))).collect();
    let out = upcoming_events(&events, june(10), &Utc, SortDirection::Asc, UPCOMING_LIMIT);
    assert_eq!(out.len(), 10);
    assert!(out.windows(2).all(|w| w[0].start_time <= w[1].start_time));
  }

  #[test]
  fn upcoming_uses_local_date() {
    // 03:00 UTC on June 10 is June 9 at UTC-06:00.
    let tz = FixedOffset::west_opt(6 * 3600).unwrap();
    let events = [event(1, at(10, 3))];
    assert!(upcoming_events(&events, june(10), &tz, SortDirection::Asc, 10).is_empty());
    assert_eq!(upcoming_events(&events, june(9), &tz, SortDirection::Asc, 10).len(), 1);
  }

  #[test]
  fn dashboard_state_updates_are_copies() {
    let base = DashboardState::default();
    let next = base
      .with_filter(PriorityFilter::Only(Priority::High))
      .with_sort_key(TaskSortKey::Title)
      .toggle_event_direction();
    assert_eq!(base.priority_filter, PriorityFilter::All);
    assert_eq!(next.task_sort_key, TaskSortKey::Title);
    assert_eq!(next.event_direction, SortDirection::Desc);
    assert_eq!(next.task_direction, SortDirection::Asc);
    assert_eq!(next.toggle_task_direction().task_direction, SortDirection::Desc);
  }

  #[test]
  fn dashboard_resolves_group_names() {
    let mut grouped = task(1, "essay", Priority::High, at(12, 9));
    grouped.group_id = Some(5);
    let tasks = [grouped, task(2, "reading", Priority::Low, at(11, 9))];
    let groups = [Group { id: 5, name: "CS101".into(), members: vec![] }];
    let events = [event(1, at(8, 9)), event(2, at(10, 9))];

    let dashboard = DashboardState::default().render(&tasks, &events, &groups, june(10), &Utc);
    assert_eq!(dashboard.total_tasks, 2);
    assert_eq!(dashboard.tasks[0].task.title, "reading");
    assert_eq!(dashboard.tasks[1].group_name, Some("CS101"));
    assert_eq!(dashboard.events.len(), 1);
  }
}
