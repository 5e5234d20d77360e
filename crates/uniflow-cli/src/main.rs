//! `uniflow`: command-line front-end for the UniFlow planner API.
//!
//! # Usage
//!
//! ```text
//! uniflow dashboard --filter HIGH --sort priority
//! uniflow calendar --month 2024-06
//! uniflow tasks add --title "Essay" --deadline 2024-06-12T23:59:00Z --priority HIGH
//! uniflow --config ~/.config/uniflow/cli.toml day
//! ```

mod app;
mod client;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use app::App;
use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client::ApiClient;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uniflow_core::{
  calendar::{CalendarDay, day_agenda, month_view},
  event::{EventPatch, NewEvent},
  group::{GroupPatch, NewGroup},
  patch::Patch,
  task::{NewTask, Priority, TaskPatch},
  user::NewUser,
  view::{DashboardState, PriorityFilter, TaskSortKey},
};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "uniflow", about = "Command-line front-end for the UniFlow planner")]
struct Args {
  /// Path to a TOML config file (url, user_id).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the UniFlow server (default: http://localhost:3000).
  #[arg(long, env = "UNIFLOW_URL")]
  url: Option<String>,

  /// Id of the user that owns new events and tasks (default: 1).
  #[arg(long, env = "UNIFLOW_USER_ID")]
  user_id: Option<i64>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Filtered task list and upcoming events.
  Dashboard {
    /// ALL, LOW, MEDIUM or HIGH.
    #[arg(long, default_value = "ALL")]
    filter: PriorityFilter,
    /// deadline, priority or title.
    #[arg(long, default_value = "deadline")]
    sort:   TaskSortKey,
    /// Sort tasks descending.
    #[arg(long)]
    desc:   bool,
    /// Sort upcoming events descending.
    #[arg(long)]
    events_desc: bool,
  },
  /// Month grid with event markers.
  Calendar {
    /// Month as YYYY-MM (default: the current month).
    #[arg(long, value_parser = parse_month)]
    month: Option<NaiveDate>,
  },
  /// Events and tasks on a single day.
  Day {
    /// Date as YYYY-MM-DD (default: today).
    #[arg(long)]
    date: Option<NaiveDate>,
  },
  #[command(subcommand)]
  Users(UserCommand),
  #[command(subcommand)]
  Groups(GroupCommand),
  #[command(subcommand)]
  Events(EventCommand),
  #[command(subcommand)]
  Tasks(TaskCommand),
}

#[derive(Subcommand, Debug)]
enum UserCommand {
  List,
  Add {
    #[arg(long)]
    email: String,
    #[arg(long)]
    name:  Option<String>,
  },
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
  List,
  Add {
    #[arg(long)]
    name:    String,
    /// Member user id; repeat for several.
    #[arg(long = "member")]
    members: Vec<i64>,
  },
  Update {
    id:      i64,
    #[arg(long)]
    name:    Option<String>,
    /// Replace the member set; repeat for several.
    #[arg(long = "member")]
    members: Option<Vec<i64>>,
  },
  Delete {
    id: i64,
  },
}

/// Fields shared by `events add` and `events update`.
#[derive(ClapArgs, Debug)]
struct EventFields {
  #[arg(long)]
  title: Option<String>,
  #[arg(long)]
  notes: Option<String>,
  /// RFC 3339 start time.
  #[arg(long)]
  start: Option<DateTime<Utc>>,
  /// RFC 3339 end time.
  #[arg(long)]
  end:   Option<DateTime<Utc>>,
  /// Group id; 0 for none.
  #[arg(long)]
  group: Option<i64>,
}

#[derive(Subcommand, Debug)]
enum EventCommand {
  Add(EventFields),
  Update {
    id:          i64,
    #[command(flatten)]
    fields:      EventFields,
    /// Remove the event's notes.
    #[arg(long, conflicts_with = "notes")]
    clear_notes: bool,
  },
  Delete {
    id: i64,
  },
}

/// Fields shared by `tasks add` and `tasks update`.
#[derive(ClapArgs, Debug)]
struct TaskFields {
  #[arg(long)]
  title:       Option<String>,
  #[arg(long)]
  description: Option<String>,
  /// RFC 3339 deadline.
  #[arg(long)]
  deadline:    Option<DateTime<Utc>>,
  /// LOW, MEDIUM or HIGH.
  #[arg(long)]
  priority:    Option<Priority>,
  /// Group id; 0 for none.
  #[arg(long)]
  group:       Option<i64>,
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
  Add(TaskFields),
  /// Mark a task completed (or not, with --undo).
  Done {
    id:   i64,
    #[arg(long)]
    undo: bool,
  },
  Update {
    id:                i64,
    #[command(flatten)]
    fields:            TaskFields,
    /// Remove the task's description.
    #[arg(long, conflicts_with = "description")]
    clear_description: bool,
  },
  Delete {
    id: i64,
  },
}

fn parse_month(s: &str) -> Result<NaiveDate, String> {
  NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
    .map_err(|_| format!("expected YYYY-MM, got {s:?}"))
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:     String,
  #[serde(default)]
  user_id: Option<i64>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| "http://localhost:3000".to_string());
  let user_id = args.user_id.or(file_cfg.user_id).unwrap_or(1);

  let client = ApiClient::new(base_url)?;
  let mut app = App::new(client, user_id);

  match args.command {
    Command::Dashboard { filter, sort, desc, events_desc } => {
      let mut state = DashboardState::default().with_filter(filter).with_sort_key(sort);
      if desc {
        state = state.toggle_task_direction();
      }
      if events_desc {
        state = state.toggle_event_direction();
      }
      app.refresh().await;
      print_load_errors(&app);
      let today = Local::now().date_naive();
      let dashboard = state.render(app.tasks(), app.events(), app.groups(), today, &Local);
      print!("{}", ui::dashboard::render(&dashboard, &Local));
    }
    Command::Calendar { month } => {
      let first = month.unwrap_or_else(|| Local::now().date_naive());
      app.refresh().await;
      print_load_errors(&app);
      let cells = month_view(app.events(), app.tasks(), first.year(), first.month(), Local)?;
      print!("{}", ui::calendar::render_month(&cells));
    }
    Command::Day { date } => {
      let date = date.unwrap_or_else(|| Local::now().date_naive());
      app.refresh().await;
      print_load_errors(&app);
      let day = CalendarDay::new(date, Local)?;
      let agenda = day_agenda(app.events(), app.tasks(), &day);
      print!("{}", ui::calendar::render_agenda(&agenda, app.groups(), &Local));
    }
    Command::Users(cmd) => run_users(&mut app, cmd).await?,
    Command::Groups(cmd) => run_groups(&mut app, cmd).await?,
    Command::Events(cmd) => run_events(&mut app, cmd).await?,
    Command::Tasks(cmd) => run_tasks(&mut app, cmd).await?,
  }

  Ok(())
}

fn print_load_errors(app: &App) {
  for error in app.load_errors() {
    println!("! {error}");
  }
}

/// Print the status line and fail the process on a failed mutation.
fn finish<T>(app: &App, result: Result<T>) -> Result<()> {
  println!("{}", app.status_msg);
  result.map(|_| ())
}

// ─── Subcommands ──────────────────────────────────────────────────────────────

async fn run_users(app: &mut App, cmd: UserCommand) -> Result<()> {
  match cmd {
    UserCommand::List => {
      app.refresh().await;
      print_load_errors(app);
      for user in app.users() {
        let name = user.name.as_deref().unwrap_or("-");
        println!("#{:<4} {:<30} {name}", user.id, user.email);
      }
      Ok(())
    }
    UserCommand::Add { email, name } => {
      let result = app.add_user(NewUser { email, name }).await;
      finish(app, result)
    }
  }
}

async fn run_groups(app: &mut App, cmd: GroupCommand) -> Result<()> {
  match cmd {
    GroupCommand::List => {
      app.refresh().await;
      print_load_errors(app);
      for group in app.groups() {
        let members: Vec<&str> = group.members.iter().map(|u| u.email.as_str()).collect();
        println!("#{:<4} {}  [{}]", group.id, group.name, members.join(", "));
      }
      Ok(())
    }
    GroupCommand::Add { name, members } => {
      let result = app.add_group(NewGroup { name, member_ids: members }).await;
      finish(app, result)
    }
    GroupCommand::Update { id, name, members } => {
      let patch = GroupPatch { name, member_ids: members };
      if patch.is_empty() {
        bail!("nothing to update");
      }
      let result = app.update_group(id, patch).await;
      finish(app, result)
    }
    GroupCommand::Delete { id } => {
      let result = app.delete_group(id).await;
      finish(app, result)
    }
  }
}

/// `--group 0` clears the group; no flag leaves it unchanged.
fn group_patch(group: Option<i64>) -> Patch<i64> {
  group.map(Patch::Value).unwrap_or_default().normalize_group()
}

async fn run_events(app: &mut App, cmd: EventCommand) -> Result<()> {
  match cmd {
    EventCommand::Add(fields) => {
      let (Some(title), Some(start_time), Some(end_time)) = (fields.title, fields.start, fields.end)
      else {
        bail!("--title, --start and --end are required");
      };
      let input = NewEvent {
        title,
        notes: fields.notes,
        start_time,
        end_time,
        user_id: app.user_id,
        group_id: fields.group,
      };
      let result = app.add_event(input).await;
      finish(app, result)
    }
    EventCommand::Update { id, fields, clear_notes } => {
      let notes = if clear_notes {
        Patch::Null
      } else {
        fields.notes.map(Patch::Value).unwrap_or_default()
      };
      let patch = EventPatch {
        title: fields.title,
        notes,
        start_time: fields.start,
        end_time: fields.end,
        group_id: group_patch(fields.group),
      };
      if patch.is_empty() {
        bail!("nothing to update");
      }
      let result = app.update_event(id, patch).await;
      finish(app, result)
    }
    EventCommand::Delete { id } => {
      let result = app.delete_event(id).await;
      finish(app, result)
    }
  }
}

async fn run_tasks(app: &mut App, cmd: TaskCommand) -> Result<()> {
  match cmd {
    TaskCommand::Add(fields) => {
      let (Some(title), Some(deadline), Some(priority)) =
        (fields.title, fields.deadline, fields.priority)
      else {
        bail!("--title, --deadline and --priority are required");
      };
      let input = NewTask {
        title,
        description: fields.description,
        deadline,
        priority,
        user_id: app.user_id,
        group_id: fields.group,
      };
      let result = app.add_task(input).await;
      finish(app, result)
    }
    TaskCommand::Done { id, undo } => {
      let result = app.set_task_done(id, !undo).await;
      finish(app, result)
    }
    TaskCommand::Update { id, fields, clear_description } => {
      let description = if clear_description {
        Patch::Null
      } else {
        fields.description.map(Patch::Value).unwrap_or_default()
      };
      let patch = TaskPatch {
        title: fields.title,
        description,
        deadline: fields.deadline,
        priority: fields.priority,
        completed: None,
        group_id: group_patch(fields.group),
      };
      if patch.is_empty() {
        bail!("nothing to update");
      }
      let result = app.update_task(id, patch).await;
      finish(app, result)
    }
    TaskCommand::Delete { id } => {
      let result = app.delete_task(id).await;
      finish(app, result)
    }
  }
}
