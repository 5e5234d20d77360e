//! Application state: the four loaded collections and the mutations that
//! change them.

use anyhow::Result;
use uniflow_core::{
  event::{Event, EventPatch, NewEvent},
  group::{Group, GroupPatch, NewGroup},
  loader::{Loadable, Outcome},
  task::{NewTask, Task, TaskPatch},
  user::{NewUser, User},
};

use crate::client::ApiClient;

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Shared HTTP client.
  pub client: ApiClient,

  /// Owner of newly created events and tasks.
  pub user_id: i64,

  pub users:  Loadable<Vec<User>>,
  pub groups: Loadable<Vec<Group>>,
  pub events: Loadable<Vec<Event>>,
  pub tasks:  Loadable<Vec<Task>>,

  /// One-line status message for the last mutation.
  pub status_msg: String,
}

fn slice<T>(slot: &Loadable<Vec<T>>) -> &[T] { slot.value().map(Vec::as_slice).unwrap_or(&[]) }

fn settle(name: &str, outcome: Outcome) {
  match outcome {
    Outcome::Applied => tracing::debug!(collection = name, "loaded"),
    Outcome::Failed => tracing::warn!(collection = name, "load failed"),
    Outcome::Stale => tracing::debug!(collection = name, "dropped stale response"),
  }
}

impl App {
  pub fn new(client: ApiClient, user_id: i64) -> Self {
    Self {
      client,
      user_id,
      users: Loadable::new(),
      groups: Loadable::new(),
      events: Loadable::new(),
      tasks: Loadable::new(),
      status_msg: String::new(),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch all four collections concurrently.
  ///
  /// A failed load leaves its slot's previous value in place and records an
  /// inline error; the other slots are unaffected.
  pub async fn refresh(&mut self) {
    let users_ticket = self.users.begin();
    let groups_ticket = self.groups.begin();
    let events_ticket = self.events.begin();
    let tasks_ticket = self.tasks.begin();

    let (users, groups, events, tasks) = tokio::join!(
      self.client.list_users(),
      self.client.list_groups(),
      self.client.list_events(),
      self.client.list_tasks(),
    );

    settle("users", self.users.complete(users_ticket, users));
    settle("groups", self.groups.complete(groups_ticket, groups));
    settle("events", self.events.complete(events_ticket, events));
    settle("tasks", self.tasks.complete(tasks_ticket, tasks));
  }

  /// Inline load errors, one per failed collection.
  pub fn load_errors(&self) -> Vec<String> {
    [
      ("users", self.users.error()),
      ("groups", self.groups.error()),
      ("events", self.events.error()),
      ("tasks", self.tasks.error()),
    ]
    .into_iter()
    .filter_map(|(name, err)| err.map(|e| format!("could not load {name}: {e}")))
    .collect()
  }

  pub fn users(&self) -> &[User] { slice(&self.users) }

  pub fn groups(&self) -> &[Group] { slice(&self.groups) }

  pub fn events(&self) -> &[Event] { slice(&self.events) }

  pub fn tasks(&self) -> &[Task] { slice(&self.tasks) }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Record the outcome of a mutation in `status_msg` and pass it on.
  fn report<T>(&mut self, result: Result<T>, describe: impl FnOnce(&T) -> String) -> Result<T> {
    match &result {
      Ok(value) => self.status_msg = describe(value),
      Err(e) => self.status_msg = format!("Error: {e:#}"),
    }
    result
  }

  pub async fn add_user(&mut self, input: NewUser) -> Result<User> {
    let result = self.client.create_user(&input).await;
    self.report(result, |u| format!("Created user {} <{}>", u.id, u.email))
  }

  pub async fn add_group(&mut self, input: NewGroup) -> Result<Group> {
    let result = self.client.create_group(&input).await;
    self.report(result, |g| format!("Created group {} \"{}\"", g.id, g.name))
  }

  pub async fn update_group(&mut self, id: i64, patch: GroupPatch) -> Result<Group> {
    let result = self.client.update_group(id, &patch).await;
    self.report(result, |g| format!("Updated group {} \"{}\"", g.id, g.name))
  }

  pub async fn delete_group(&mut self, id: i64) -> Result<()> {
    let result = self.client.delete_group(id).await;
    self.report(result, |_| format!("Deleted group {id}"))
  }

  /// Create an event owned by the configured user.
  pub async fn add_event(&mut self, mut input: NewEvent) -> Result<Event> {
    input.user_id = self.user_id;
    let result = self.client.create_event(&input).await;
    self.report(result, |e| format!("Created event {} \"{}\"", e.id, e.title))
  }

  pub async fn update_event(&mut self, id: i64, patch: EventPatch) -> Result<Event> {
    let result = self.client.update_event(id, &patch).await;
    self.report(result, |e| format!("Updated event {} \"{}\"", e.id, e.title))
  }

  pub async fn delete_event(&mut self, id: i64) -> Result<()> {
    let result = self.client.delete_event(id).await;
    self.report(result, |_| format!("Deleted event {id}"))
  }

  /// Create a task owned by the configured user.
  pub async fn add_task(&mut self, mut input: NewTask) -> Result<Task> {
    input.user_id = self.user_id;
    let result = self.client.create_task(&input).await;
    self.report(result, |t| format!("Created task {} \"{}\"", t.id, t.title))
  }

  /// Set a task's completion flag.
  pub async fn set_task_done(&mut self, id: i64, done: bool) -> Result<Task> {
    let result = self.client.update_task(id, &TaskPatch::completed(done)).await;
    self.report(result, |t| {
      let state = if t.completed { "done" } else { "not done" };
      format!("Marked task {} \"{}\" {state}", t.id, t.title)
    })
  }

  pub async fn update_task(&mut self, id: i64, patch: TaskPatch) -> Result<Task> {
    let result = self.client.update_task(id, &patch).await;
    self.report(result, |t| format!("Updated task {} \"{}\"", t.id, t.title))
  }

  pub async fn delete_task(&mut self, id: i64) -> Result<()> {
    let result = self.client.delete_task(id).await;
    self.report(result, |_| format!("Deleted task {id}"))
  }
}

#[cfg(test)]
mod tests {
  use mockito::{Matcher, Server};
  use serde_json::json;

  use super::*;

  async fn json_mock(server: &mut Server, path: &str, body: serde_json::Value) -> mockito::Mock {
    server
      .mock("GET", path)
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(body.to_string())
      .create_async()
      .await
  }

  #[tokio::test]
  async fn refresh_keeps_other_slots_when_one_fails() {
    let mut server = Server::new_async().await;
    let _users = json_mock(&mut server, "/users", json!([])).await;
    let _groups = json_mock(&mut server, "/groups", json!([{ "id": 2, "name": "CS101" }])).await;
    let _events = json_mock(&mut server, "/events", json!([])).await;
    let _tasks = server
      .mock("GET", "/tasks")
      .with_status(500)
      .with_body(r#"{"error":"Internal server error."}"#)
      .create_async()
      .await;

    let mut app = App::new(ApiClient::new(server.url()).unwrap(), 1);
    app.refresh().await;

    assert_eq!(app.groups().len(), 1);
    assert!(app.tasks().is_empty());
    let errors = app.load_errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("could not load tasks"));
    assert!(!app.tasks.is_loading());
  }

  #[tokio::test]
  async fn add_task_uses_configured_user() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("POST", "/tasks")
      .match_body(Matcher::PartialJson(json!({ "userId": 7, "priority": "MEDIUM" })))
      .with_status(201)
      .with_header("content-type", "application/json")
      .with_body(
        json!({
          "id": 1,
          "title": "Read ch. 3",
          "deadline": "2024-06-12T12:00:00Z",
          "priority": "MEDIUM",
          "completed": false,
          "userId": 7,
          "groupId": null,
        })
        .to_string(),
      )
      .create_async()
      .await;

    let mut app = App::new(ApiClient::new(server.url()).unwrap(), 7);
    let input = NewTask {
      title:       "Read ch. 3".into(),
      description: None,
      deadline:    "2024-06-12T12:00:00Z".parse().unwrap(),
      priority:    uniflow_core::task::Priority::Medium,
      user_id:     0,
      group_id:    None,
    };
    let task = app.add_task(input).await.unwrap();

    mock.assert_async().await;
    assert_eq!(task.user_id, 7);
    assert_eq!(app.status_msg, "Created task 1 \"Read ch. 3\"");
  }

  #[tokio::test]
  async fn failed_mutation_sets_inline_error() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("DELETE", "/tasks/5")
      .with_status(404)
      .with_body(r#"{"error":"task 5 not found"}"#)
      .create_async()
      .await;

    let mut app = App::new(ApiClient::new(server.url()).unwrap(), 1);
    assert!(app.delete_task(5).await.is_err());
    assert!(app.status_msg.starts_with("Error:"));
    assert!(app.status_msg.contains("task 5 not found"));
  }
}
