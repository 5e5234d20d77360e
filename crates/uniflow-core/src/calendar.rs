//! Calendar-day selection: which events and tasks belong to a given local day,
//! and the colored markers drawn on each day of a month grid.
//!
//! All selectors are stable filters: output preserves the input order.

use chrono::{
  DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};

use crate::{Error, Result, event::Event, task::Task};

/// Marker colors, indexed by [`color_for_event`].
pub const PALETTE: [&str; 10] = [
  "#3b82f6", // blue
  "#f97316", // orange
  "#22c55e", // green
  "#a855f7", // purple
  "#ec4899", // pink
  "#ef4444", // red
  "#eab308", // yellow
  "#0ea5e9", // sky
  "#8b5cf6", // violet
  "#14b8a6", // teal
];

/// How many markers a single day cell shows before collapsing the rest into an
/// overflow count.
pub const MAX_DAY_MARKERS: usize = 3;

// ─── Calendar day ────────────────────────────────────────────────────────────

/// A calendar date in a specific time zone, with its inclusive bounds
/// `[00:00:00.000, 23:59:59.999]` resolved to UTC instants.
#[derive(Debug, Clone)]
pub struct CalendarDay<Tz: TimeZone> {
  date:  NaiveDate,
  tz:    Tz,
  start: DateTime<Utc>,
  end:   DateTime<Utc>,
}

impl<Tz: TimeZone> CalendarDay<Tz> {
  /// Resolve the bounds of `date` in `tz`.
  ///
  /// A bound that falls into a DST gap moves to the nearest instant inside the
  /// day; an ambiguous bound takes the widest reading.
  pub fn new(date: NaiveDate, tz: Tz) -> Result<Self> {
    let first = date.and_time(NaiveTime::MIN);
    let last = date.and_time(end_of_day_time());

    let start = resolve_local(&tz, first, Bound::Start)?;
    let end = resolve_local(&tz, last, Bound::End)?;

    Ok(Self { date, tz, start, end })
  }

  /// The local day containing `instant`.
  pub fn containing(instant: DateTime<Utc>, tz: Tz) -> Result<Self> {
    let date = local_date(instant, &tz);
    Self::new(date, tz)
  }

  pub fn date(&self) -> NaiveDate { self.date }

  pub fn tz(&self) -> &Tz { &self.tz }

  pub fn start(&self) -> DateTime<Utc> { self.start }

  pub fn end(&self) -> DateTime<Utc> { self.end }

  /// Inclusive on both ends.
  pub fn contains(&self, instant: DateTime<Utc>) -> bool {
    self.start <= instant && instant <= self.end
  }

  /// Whether `[start, end]` touches this day: either endpoint falls inside the
  /// day, or the interval covers the whole day.
  pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    self.contains(start) || self.contains(end) || (start <= self.start && end >= self.end)
  }

  /// Calendar-date equality in this day's time zone.
  pub fn is_same_date(&self, instant: DateTime<Utc>) -> bool {
    local_date(instant, &self.tz) == self.date
  }

  /// The following calendar day in the same zone.
  pub fn next(&self) -> Result<Self> {
    let date = self
      .date
      .succ_opt()
      .ok_or_else(|| Error::InvalidInput(format!("no day after {}", self.date)))?;
    Self::new(date, self.tz.clone())
  }
}

#[derive(Clone, Copy)]
enum Bound {
  Start,
  End,
}

fn end_of_day_time() -> NaiveTime {
  NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime, bound: Bound) -> Result<DateTime<Utc>> {
  let pick = |result: LocalResult<DateTime<Tz>>| match (result, bound) {
    (LocalResult::Single(t), _) => Some(t),
    (LocalResult::Ambiguous(early, _), Bound::Start) => Some(early),
    (LocalResult::Ambiguous(_, late), Bound::End) => Some(late),
    (LocalResult::None, _) => None,
  };

  if let Some(t) = pick(tz.from_local_datetime(&local)) {
    return Ok(t.with_timezone(&Utc));
  }

  // Skipped local time. Gaps are at most an hour in every zone in use.
  let shifted = match bound {
    Bound::Start => local + Duration::hours(1),
    Bound::End => local - Duration::hours(1),
  };
  pick(tz.from_local_datetime(&shifted))
    .map(|t| t.with_timezone(&Utc))
    .ok_or_else(|| Error::InvalidInput(format!("local time {local} does not exist")))
}

/// The calendar date of `instant` as seen in `tz`.
pub fn local_date<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
  instant.with_timezone(tz).date_naive()
}

// ─── Selectors ───────────────────────────────────────────────────────────────

/// Events whose `[start_time, end_time]` overlaps `day`.
///
/// Malformed events (`end_time < start_time`) are not rejected; they match only
/// when one of their endpoints falls inside the day.
pub fn select_events_for_day<'a, Tz: TimeZone>(
  events: &'a [Event],
  day: &CalendarDay<Tz>,
) -> Vec<&'a Event> {
  events
    .iter()
    .filter(|e| day.overlaps(e.start_time, e.end_time))
    .collect()
}

/// Tasks whose deadline falls on `day`'s calendar date, ignoring time of day.
pub fn select_tasks_due_on<'a, Tz: TimeZone>(
  tasks: &'a [Task],
  day: &CalendarDay<Tz>,
) -> Vec<&'a Task> {
  tasks.iter().filter(|t| day.is_same_date(t.deadline)).collect()
}

// ─── Colors and markers ──────────────────────────────────────────────────────

/// Palette index for an event: its group id when it has a (non-zero) group,
/// otherwise its own id, modulo the palette size.
pub fn color_for_event(event: &Event) -> usize {
  let key = event.group_id.filter(|g| *g != 0).unwrap_or(event.id);
  key.rem_euclid(PALETTE.len() as i64) as usize
}

/// Hex color string for an event.
pub fn color_hex(event: &Event) -> &'static str { PALETTE[color_for_event(event)] }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
  pub event_id: i64,
  pub color:    usize,
}

impl Marker {
  pub fn hex(&self) -> &'static str { PALETTE[self.color] }
}

/// The markers drawn on one day cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayMarkers {
  /// At most [`MAX_DAY_MARKERS`] entries.
  pub shown:    Vec<Marker>,
  /// Number of overlapping events not shown.
  pub overflow: usize,
}

pub fn day_markers<Tz: TimeZone>(events: &[Event], day: &CalendarDay<Tz>) -> DayMarkers {
  let overlapping = select_events_for_day(events, day);
  let overflow = overlapping.len().saturating_sub(MAX_DAY_MARKERS);
  let shown = overlapping
    .into_iter()
    .take(MAX_DAY_MARKERS)
    .map(|e| Marker { event_id: e.id, color: color_for_event(e) })
    .collect();
  DayMarkers { shown, overflow }
}

// ─── Month grid ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
  pub date:       NaiveDate,
  /// Some event starts on this date.
  pub has_events: bool,
  /// Some task is due on this date.
  pub has_tasks:  bool,
  pub markers:    DayMarkers,
}

/// One cell per day of `year`-`month`, in date order.
pub fn month_view<Tz: TimeZone>(
  events: &[Event],
  tasks: &[Task],
  year: i32,
  month: u32,
  tz: Tz,
) -> Result<Vec<DayCell>> {
  let first = NaiveDate::from_ymd_opt(year, month, 1)
    .ok_or_else(|| Error::InvalidInput(format!("no such month: {year}-{month:02}")))?;

  let mut cells = Vec::with_capacity(31);
  let mut day = CalendarDay::new(first, tz)?;
  while day.date().month() == month {
    cells.push(DayCell {
      date:       day.date(),
      has_events: events.iter().any(|e| day.is_same_date(e.start_time)),
      has_tasks:  tasks.iter().any(|t| day.is_same_date(t.deadline)),
      markers:    day_markers(events, &day),
    });
    day = day.next()?;
  }
  Ok(cells)
}

/// Everything scheduled on a single selected day.
#[derive(Debug, Clone)]
pub struct DayAgenda<'a> {
  pub date:   NaiveDate,
  pub events: Vec<&'a Event>,
  pub tasks:  Vec<&'a Task>,
}

impl DayAgenda<'_> {
  pub fn is_empty(&self) -> bool { self.events.is_empty() && self.tasks.is_empty() }
}

pub fn day_agenda<'a, Tz: TimeZone>(
  events: &'a [Event],
  tasks: &'a [Task],
  day: &CalendarDay<Tz>,
) -> DayAgenda<'a> {
  DayAgenda {
    date:   day.date(),
    events: select_events_for_day(events, day),
    tasks:  select_tasks_due_on(tasks, day),
  }
}

#[cfg(test)]
mod tests {
  use chrono::FixedOffset;

  use super::*;
  use crate::task::Priority;

  fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
  }

  fn event(id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
    Event {
      id,
      title: format!("event {id}"),
      notes: None,
      start_time: start,
      end_time: end,
      user_id: 1,
      group_id: None,
    }
  }

  fn task(id: i64, deadline: DateTime<Utc>) -> Task {
    Task {
      id,
      title: format!("task {id}"),
      description: None,
      deadline,
      priority: Priority::Medium,
      completed: false,
      user_id: 1,
      group_id: None,
    }
  }

  fn june(day: u32) -> CalendarDay<Utc> {
    CalendarDay::new(NaiveDate::from_ymd_opt(2024, 6, day).unwrap(), Utc).unwrap()
  }

  fn ids(events: &[&Event]) -> Vec<i64> { events.iter().map(|e| e.id).collect() }

  #[test]
  fn day_bounds_are_inclusive_millisecond_span() {
    let day = june(10);
    assert_eq!(day.start(), utc(2024, 6, 10, 0, 0));
    assert_eq!(
      day.end(),
      utc(2024, 6, 10, 23, 59) + Duration::seconds(59) + Duration::milliseconds(999)
    );
  }

  #[test]
  fn event_crossing_midnight_into_day_is_included() {
    let events = [event(1, utc(2024, 6, 9, 23, 0), utc(2024, 6, 10, 1, 0))];
    assert_eq!(ids(&select_events_for_day(&events, &june(10))), vec![1]);
    assert_eq!(ids(&select_events_for_day(&events, &june(9))), vec![1]);
    assert!(select_events_for_day(&events, &june(11)).is_empty());
  }

  #[test]
  fn event_spanning_whole_day_is_included() {
    let events = [event(1, utc(2024, 6, 8, 12, 0), utc(2024, 6, 12, 12, 0))];
    assert_eq!(ids(&select_events_for_day(&events, &june(10))), vec![1]);
  }

  #[test]
  fn zero_duration_event_matches_its_day() {
    let at = utc(2024, 6, 10, 15, 30);
    let events = [event(1, at, at)];
    assert_eq!(ids(&select_events_for_day(&events, &june(10))), vec![1]);
    assert!(select_events_for_day(&events, &june(11)).is_empty());
  }

  #[test]
  fn event_ending_exactly_at_midnight_touches_both_days() {
    let events = [event(1, utc(2024, 6, 9, 22, 0), utc(2024, 6, 10, 0, 0))];
    assert_eq!(select_events_for_day(&events, &june(9)).len(), 1);
    assert_eq!(select_events_for_day(&events, &june(10)).len(), 1);
  }

  #[test]
  fn malformed_event_only_matches_on_endpoint_days() {
    let events = [event(1, utc(2024, 6, 12, 9, 0), utc(2024, 6, 8, 9, 0))];
    assert!(events[0].is_malformed());
    assert!(select_events_for_day(&events, &june(10)).is_empty());
    assert_eq!(select_events_for_day(&events, &june(12)).len(), 1);
  }

  #[test]
  fn selector_preserves_input_order() {
    let events = [
      event(3, utc(2024, 6, 10, 18, 0), utc(2024, 6, 10, 19, 0)),
      event(1, utc(2024, 6, 10, 8, 0), utc(2024, 6, 10, 9, 0)),
      event(2, utc(2024, 6, 11, 8, 0), utc(2024, 6, 11, 9, 0)),
      event(5, utc(2024, 6, 10, 12, 0), utc(2024, 6, 10, 13, 0)),
    ];
    assert_eq!(ids(&select_events_for_day(&events, &june(10))), vec![3, 1, 5]);
  }

  #[test]
  fn overlap_respects_local_time_zone() {
    // 02:00 UTC on June 10 is still June 9 at UTC-05:00.
    let tz = FixedOffset::west_opt(5 * 3600).unwrap();
    let events = [event(1, utc(2024, 6, 10, 2, 0), utc(2024, 6, 10, 3, 0))];
    let june9 = CalendarDay::new(NaiveDate::from_ymd_opt(2024, 6, 9).unwrap(), tz).unwrap();
    let june10 = CalendarDay::new(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(), tz).unwrap();
    assert_eq!(select_events_for_day(&events, &june9).len(), 1);
    assert!(select_events_for_day(&events, &june10).is_empty());
  }

  #[test]
  fn tasks_due_ignore_time_of_day() {
    let tasks = [
      task(1, utc(2024, 6, 10, 23, 59)),
      task(2, utc(2024, 6, 10, 0, 0)),
      task(3, utc(2024, 6, 11, 0, 0)),
    ];
    let due: Vec<i64> = select_tasks_due_on(&tasks, &june(10)).iter().map(|t| t.id).collect();
    assert_eq!(due, vec![1, 2]);
  }

  #[test]
  fn tasks_due_compare_local_dates() {
    let tz = FixedOffset::east_opt(9 * 3600).unwrap();
    // 20:00 UTC on June 10 is June 11 in UTC+09:00.
    let tasks = [task(1, utc(2024, 6, 10, 20, 0))];
    let day = CalendarDay::containing(utc(2024, 6, 11, 1, 0), tz).unwrap();
    assert_eq!(day.date(), NaiveDate::from_ymd_opt(2024, 6, 11).unwrap());
    assert_eq!(select_tasks_due_on(&tasks, &day).len(), 1);
  }

  #[test]
  fn color_uses_group_then_id() {
    let mut a = event(13, utc(2024, 6, 10, 9, 0), utc(2024, 6, 10, 10, 0));
    assert_eq!(color_for_event(&a), 3);

    a.group_id = Some(27);
    let mut b = event(4, a.start_time, a.end_time);
    b.group_id = Some(27);
    assert_eq!(color_for_event(&a), 7);
    assert_eq!(color_for_event(&a), color_for_event(&b));
    assert_eq!(color_hex(&a), "#0ea5e9");
  }

  #[test]
  fn color_falls_back_to_id_for_zero_group() {
    let mut e = event(12, utc(2024, 6, 10, 9, 0), utc(2024, 6, 10, 10, 0));
    e.group_id = Some(0);
    assert_eq!(color_for_event(&e), 2);
  }

  #[test]
  fn markers_cap_at_three_with_overflow() {
    let events: Vec<Event> = (1..=5)
      .map(|id| event(id, utc(2024, 6, 10, 8 + id as u32, 0), utc(2024, 6, 10, 9 + id as u32, 0)))
      .collect();
    let markers = day_markers(&events, &june(10));
    assert_eq!(markers.shown.len(), 3);
    assert_eq!(markers.overflow, 2);
    assert_eq!(markers.shown[0], Marker { event_id: 1, color: 1 });
    assert_eq!(markers.shown[2].hex(), PALETTE[3]);
  }

  #[test]
  fn month_view_flags_event_starts_and_deadlines() {
    let events = [event(1, utc(2024, 6, 9, 23, 0), utc(2024, 6, 10, 1, 0))];
    let tasks = [task(1, utc(2024, 6, 20, 12, 0))];
    let cells = month_view(&events, &tasks, 2024, 6, Utc).unwrap();

    assert_eq!(cells.len(), 30);
    assert!(cells[8].has_events);
    assert!(!cells[9].has_events);
    assert_eq!(cells[9].markers.shown.len(), 1);
    assert!(cells[19].has_tasks);
    assert_eq!(cells.iter().filter(|c| c.has_tasks).count(), 1);
  }

  #[test]
  fn month_view_rejects_bad_month() {
    assert!(matches!(month_view(&[], &[], 2024, 13, Utc), Err(Error::InvalidInput(_))));
  }

  #[test]
  fn agenda_combines_events_and_tasks() {
    let events = [event(1, utc(2024, 6, 10, 9, 0), utc(2024, 6, 10, 10, 0))];
    let tasks = [task(2, utc(2024, 6, 10, 12, 0)), task(3, utc(2024, 6, 11, 12, 0))];
    let agenda = day_agenda(&events, &tasks, &june(10));
    assert_eq!(agenda.events.len(), 1);
    assert_eq!(agenda.tasks.len(), 1);
    assert!(day_agenda(&events, &tasks, &june(12)).is_empty());
  }

  // ── Zones with DST transitions at midnight ─────────────────────────────────

  fn instant(s: &str) -> DateTime<Utc> { s.parse().unwrap() }

  #[test]
  fn skipped_midnight_starts_day_at_first_valid_instant() {
    // Santiago springs forward from 00:00 -04 to 01:00 -03.
    let tz = chrono_tz::America::Santiago;
    let day = CalendarDay::new(NaiveDate::from_ymd_opt(2024, 9, 8).unwrap(), tz).unwrap();

    assert_eq!(day.start(), instant("2024-09-08T04:00:00Z"));
    assert_eq!(day.start().with_timezone(&tz).format("%H:%M").to_string(), "01:00");
    assert_eq!(day.end(), instant("2024-09-09T02:59:59.999Z"));
    assert!(!day.contains(instant("2024-09-08T03:59:00Z")));
  }

  #[test]
  fn ambiguous_end_takes_later_reading() {
    // Santiago falls back from 24:00 -03 to 23:00 -04, so 23:59 happens twice.
    let tz = chrono_tz::America::Santiago;
    let day = CalendarDay::new(NaiveDate::from_ymd_opt(2024, 4, 6).unwrap(), tz).unwrap();

    assert_eq!(day.start(), instant("2024-04-06T03:00:00Z"));
    assert_eq!(day.end(), instant("2024-04-07T03:59:59.999Z"));
    assert_eq!(day.next().unwrap().start(), instant("2024-04-07T04:00:00Z"));
  }

  #[test]
  fn ambiguous_start_takes_earlier_reading() {
    // Havana falls back from 01:00 -04 to 00:00 -05, so midnight happens twice.
    let tz = chrono_tz::America::Havana;
    let day = CalendarDay::new(NaiveDate::from_ymd_opt(2024, 11, 3).unwrap(), tz).unwrap();

    assert_eq!(day.start(), instant("2024-11-03T04:00:00Z"));
    assert_eq!(day.end(), instant("2024-11-04T04:59:59.999Z"));
  }

  #[test]
  fn skipped_day_is_invalid_input() {
    // Apia moved across the date line and never had 2011-12-30.
    let tz = chrono_tz::Pacific::Apia;
    let date = NaiveDate::from_ymd_opt(2011, 12, 30).unwrap();
    assert!(matches!(CalendarDay::new(date, tz), Err(Error::InvalidInput(_))));
  }
}
