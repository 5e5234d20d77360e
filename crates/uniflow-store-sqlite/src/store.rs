//! [`SqliteStore`], the SQLite implementation of [`PlannerStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uniflow_core::{
  Entity,
  event::{Event, EventPatch, NewEvent},
  group::{Group, GroupPatch, NewGroup},
  patch::normalize_group_id,
  store::PlannerStore,
  task::{NewTask, Task, TaskPatch},
  user::{NewUser, User},
};

use crate::{
  Error, Result,
  assign::Assignments,
  encode::{
    EVENT_COLUMNS, RawEvent, RawGroup, RawTask, RawUser, TASK_COLUMNS, USER_COLUMNS, decode_dt,
    encode_dt, encode_priority,
  },
  error::is_unique_violation,
  schema::SCHEMA,
};

/// Outcome of a closure that may find a dangling or missing id.
type Lookup<T> = std::result::Result<T, uniflow_core::Error>;

fn missing(entity: Entity, id: i64) -> uniflow_core::Error {
  uniflow_core::Error::NotFound { entity, id }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A UniFlow store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let conn = tokio_rusqlite::Connection::open(&path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened sqlite store");
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Delete the row `id` from `table`, or report it missing.
  async fn delete_row(&self, table: &'static str, entity: Entity, id: i64) -> Result<()> {
    let deleted = self
      .conn
      .call(move |conn| Ok(conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), [id])?))
      .await?;

    if deleted == 0 {
      return Err(missing(entity, id).into());
    }
    tracing::debug!(%entity, id, "deleted row");
    Ok(())
  }
}

// ─── Connection-level helpers ────────────────────────────────────────────────

fn exists(conn: &rusqlite::Connection, table: &str, id: i64) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(&format!("SELECT 1 FROM {table} WHERE id = ?1"), [id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

/// The first dangling reference among an owner and a group, if any.
fn dangling_reference(
  conn: &rusqlite::Connection,
  user_id: Option<i64>,
  group_id: Option<i64>,
) -> rusqlite::Result<Option<uniflow_core::Error>> {
  if let Some(uid) = user_id
    && !exists(conn, "users", uid)?
  {
    return Ok(Some(missing(Entity::User, uid)));
  }
  if let Some(gid) = group_id
    && !exists(conn, "study_groups", gid)?
  {
    return Ok(Some(missing(Entity::Group, gid)));
  }
  Ok(None)
}

fn first_missing_user(
  conn: &rusqlite::Connection,
  user_ids: &[i64],
) -> rusqlite::Result<Option<uniflow_core::Error>> {
  for &uid in user_ids {
    if !exists(conn, "users", uid)? {
      return Ok(Some(missing(Entity::User, uid)));
    }
  }
  Ok(None)
}

fn insert_members(conn: &rusqlite::Connection, group_id: i64, user_ids: &[i64]) -> rusqlite::Result<()> {
  let mut stmt =
    conn.prepare("INSERT OR IGNORE INTO group_members (group_id, user_id) VALUES (?1, ?2)")?;
  for &uid in user_ids {
    stmt.execute([group_id, uid])?;
  }
  Ok(())
}

fn select_members(conn: &rusqlite::Connection, group_id: i64) -> rusqlite::Result<Vec<RawUser>> {
  let mut stmt = conn.prepare(
    "SELECT u.id, u.email, u.name, u.created_at
     FROM group_members m
     JOIN users u ON u.id = m.user_id
     WHERE m.group_id = ?1
     ORDER BY u.id",
  )?;
  stmt
    .query_map([group_id], RawUser::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

fn select_group(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<Option<RawGroup>> {
  let Some(name) = conn
    .query_row("SELECT name FROM study_groups WHERE id = ?1", [id], |r| r.get::<_, String>(0))
    .optional()?
  else {
    return Ok(None);
  };
  let members = select_members(conn, id)?;
  Ok(Some(RawGroup { id, name, members }))
}

// ─── PlannerStore impl ───────────────────────────────────────────────────────

impl PlannerStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let at_str = encode_dt(Utc::now());
    let created_at = decode_dt(&at_str)?;
    let NewUser { email, name } = input;
    let (email_c, name_c) = (email.clone(), name.clone());

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (email, name, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![email_c, name_c, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(|e| {
        if is_unique_violation(&e) {
          tracing::debug!("rejected duplicate user email");
          Error::Core(uniflow_core::Error::Conflict(
            "A user with this email already exists.".into(),
          ))
        } else {
          Error::Database(e)
        }
      })?;

    Ok(User { id, email, name, created_at })
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  async fn create_group(&self, input: NewGroup) -> Result<Group> {
    let outcome: Lookup<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(err) = first_missing_user(&tx, &input.member_ids)? {
          return Ok(Err(err));
        }
        tx.execute("INSERT INTO study_groups (name) VALUES (?1)", [&input.name])?;
        let id = tx.last_insert_rowid();
        insert_members(&tx, id, &input.member_ids)?;
        tx.commit()?;
        Ok(Ok(id))
      })
      .await?;

    let id = outcome?;
    self
      .get_group(id)
      .await?
      .ok_or_else(|| missing(Entity::Group, id).into())
  }

  async fn list_groups(&self) -> Result<Vec<Group>> {
    let raws: Vec<RawGroup> = self
      .conn
      .call(|conn| {
        let ids = {
          let mut stmt = conn.prepare("SELECT id FROM study_groups ORDER BY id")?;
          stmt
            .query_map([], |r| r.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        let mut groups = Vec::with_capacity(ids.len());
        for id in ids {
          if let Some(g) = select_group(conn, id)? {
            groups.push(g);
          }
        }
        Ok(groups)
      })
      .await?;

    raws.into_iter().map(RawGroup::into_group).collect()
  }

  async fn get_group(&self, id: i64) -> Result<Option<Group>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_group(conn, id)?))
      .await?;
    raw.map(RawGroup::into_group).transpose()
  }

  async fn update_group(&self, id: i64, patch: GroupPatch) -> Result<Group> {
    let outcome: Lookup<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, "study_groups", id)? {
          return Ok(Err(missing(Entity::Group, id)));
        }
        if let Some(name) = &patch.name {
          tx.execute("UPDATE study_groups SET name = ?1 WHERE id = ?2", rusqlite::params![name, id])?;
        }
        if let Some(member_ids) = &patch.member_ids {
          if let Some(err) = first_missing_user(&tx, member_ids)? {
            return Ok(Err(err));
          }
          tx.execute("DELETE FROM group_members WHERE group_id = ?1", [id])?;
          insert_members(&tx, id, member_ids)?;
        }
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    outcome?;
    self
      .get_group(id)
      .await?
      .ok_or_else(|| missing(Entity::Group, id).into())
  }

  async fn delete_group(&self, id: i64) -> Result<()> {
    self.delete_row("study_groups", Entity::Group, id).await
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn create_event(&self, input: NewEvent) -> Result<Event> {
    let start_str = encode_dt(input.start_time);
    let end_str = encode_dt(input.end_time);
    let group_id = normalize_group_id(input.group_id);

    let outcome: Lookup<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(err) = dangling_reference(&tx, Some(input.user_id), group_id)? {
          return Ok(Err(err));
        }
        tx.execute(
          "INSERT INTO events (title, notes, start_time, end_time, user_id, group_id)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            input.title,
            input.notes,
            start_str,
            end_str,
            input.user_id,
            group_id,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(id))
      })
      .await?;

    let id = outcome?;
    self
      .get_event(id)
      .await?
      .ok_or_else(|| missing(Entity::Event, id).into())
  }

  async fn list_events(&self) -> Result<Vec<Event>> {
    let raws: Vec<RawEvent> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY id"))?;
        let rows = stmt
          .query_map([], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn get_event(&self, id: i64) -> Result<Option<Event>> {
    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
              [id],
              RawEvent::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn update_event(&self, id: i64, patch: EventPatch) -> Result<Event> {
    let group_update = patch.group_id.normalize_group().into_update();
    let group_check = group_update.flatten();

    let mut set = Assignments::new();
    if let Some(title) = patch.title {
      set.set("title", title);
    }
    if let Some(notes) = patch.notes.into_update() {
      set.set_nullable("notes", notes);
    }
    if let Some(start) = patch.start_time {
      set.set("start_time", encode_dt(start));
    }
    if let Some(end) = patch.end_time {
      set.set("end_time", encode_dt(end));
    }
    if let Some(group) = group_update {
      set.set_nullable("group_id", group);
    }

    let outcome: Lookup<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, "events", id)? {
          return Ok(Err(missing(Entity::Event, id)));
        }
        if let Some(err) = dangling_reference(&tx, None, group_check)? {
          return Ok(Err(err));
        }
        if !set.is_empty() {
          set.execute(&tx, "events", id)?;
        }
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    outcome?;
    self
      .get_event(id)
      .await?
      .ok_or_else(|| missing(Entity::Event, id).into())
  }

  async fn delete_event(&self, id: i64) -> Result<()> {
    self.delete_row("events", Entity::Event, id).await
  }

  // ── Tasks ─────────────────────────────────────────────────────────────────

  async fn create_task(&self, input: NewTask) -> Result<Task> {
    let deadline_str = encode_dt(input.deadline);
    let priority_str = encode_priority(input.priority);
    let group_id = normalize_group_id(input.group_id);

    let outcome: Lookup<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(err) = dangling_reference(&tx, Some(input.user_id), group_id)? {
          return Ok(Err(err));
        }
        tx.execute(
          "INSERT INTO tasks (title, description, deadline, priority, completed, user_id, group_id)
           VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
          rusqlite::params![
            input.title,
            input.description,
            deadline_str,
            priority_str,
            input.user_id,
            group_id,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(id))
      })
      .await?;

    let id = outcome?;
    self
      .get_task(id)
      .await?
      .ok_or_else(|| missing(Entity::Task, id).into())
  }

  async fn list_tasks(&self) -> Result<Vec<Task>> {
    let raws: Vec<RawTask> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"))?;
        let rows = stmt
          .query_map([], RawTask::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTask::into_task).collect()
  }

  async fn get_task(&self, id: i64) -> Result<Option<Task>> {
    let raw: Option<RawTask> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
              [id],
              RawTask::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTask::into_task).transpose()
  }

  async fn update_task(&self, id: i64, patch: TaskPatch) -> Result<Task> {
    let group_update = patch.group_id.normalize_group().into_update();
    let group_check = group_update.flatten();

    let mut set = Assignments::new();
    if let Some(title) = patch.title {
      set.set("title", title);
    }
    if let Some(description) = patch.description.into_update() {
      set.set_nullable("description", description);
    }
    if let Some(deadline) = patch.deadline {
      set.set("deadline", encode_dt(deadline));
    }
    if let Some(priority) = patch.priority {
      set.set("priority", encode_priority(priority));
    }
    if let Some(completed) = patch.completed {
      set.set("completed", completed);
    }
    if let Some(group) = group_update {
      set.set_nullable("group_id", group);
    }

    let outcome: Lookup<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, "tasks", id)? {
          return Ok(Err(missing(Entity::Task, id)));
        }
        if let Some(err) = dangling_reference(&tx, None, group_check)? {
          return Ok(Err(err));
        }
        if !set.is_empty() {
          set.execute(&tx, "tasks", id)?;
        }
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    outcome?;
    self
      .get_task(id)
      .await?
      .ok_or_else(|| missing(Entity::Task, id).into())
  }

  async fn delete_task(&self, id: i64) -> Result<()> {
    self.delete_row("tasks", Entity::Task, id).await
  }
}
