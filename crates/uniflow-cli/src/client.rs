//! Async HTTP client wrapping the UniFlow JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Method, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uniflow_core::{
  event::{Event, EventPatch, NewEvent},
  group::{Group, GroupPatch, NewGroup},
  task::{NewTask, Task, TaskPatch},
  user::{NewUser, User},
};

/// Async HTTP client for the UniFlow REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

/// Body of every non-2xx response from the server.
#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  /// Pass a success through; turn anything else into the server's message.
  async fn check(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = match resp.json::<ErrorBody>().await {
      Ok(body) => body.error,
      Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
    };
    Err(anyhow!("{what} → {status}: {message}"))
  }

  async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let what = format!("GET {path}");
    let resp = self
      .client
      .get(self.url(path))
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    Self::check(resp, &what)
      .await?
      .json()
      .await
      .with_context(|| format!("deserialising {path}"))
  }

  async fn send<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let what = format!("{method} {path}");
    let resp = self
      .client
      .request(method, self.url(path))
      .json(body)
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    Self::check(resp, &what)
      .await?
      .json()
      .await
      .with_context(|| format!("deserialising {path}"))
  }

  async fn delete(&self, path: &str) -> Result<()> {
    let what = format!("DELETE {path}");
    let resp = self
      .client
      .delete(self.url(path))
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    Self::check(resp, &what).await?;
    Ok(())
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  /// `GET /users`
  pub async fn list_users(&self) -> Result<Vec<User>> { self.get("/users").await }

  /// `POST /users`
  pub async fn create_user(&self, input: &NewUser) -> Result<User> {
    self.send(Method::POST, "/users", input).await
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  /// `GET /groups`
  pub async fn list_groups(&self) -> Result<Vec<Group>> { self.get("/groups").await }

  /// `POST /groups`
  pub async fn create_group(&self, input: &NewGroup) -> Result<Group> {
    self.send(Method::POST, "/groups", input).await
  }

  /// `PATCH /groups/{id}`
  pub async fn update_group(&self, id: i64, patch: &GroupPatch) -> Result<Group> {
    self.send(Method::PATCH, &format!("/groups/{id}"), patch).await
  }

  /// `DELETE /groups/{id}`
  pub async fn delete_group(&self, id: i64) -> Result<()> {
    self.delete(&format!("/groups/{id}")).await
  }

  // ── Events ────────────────────────────────────────────────────────────────

  /// `GET /events`
  pub async fn list_events(&self) -> Result<Vec<Event>> { self.get("/events").await }

  /// `POST /events`
  pub async fn create_event(&self, input: &NewEvent) -> Result<Event> {
    self.send(Method::POST, "/events", input).await
  }

  /// `PATCH /events/{id}`
  pub async fn update_event(&self, id: i64, patch: &EventPatch) -> Result<Event> {
    self.send(Method::PATCH, &format!("/events/{id}"), patch).await
  }

  /// `DELETE /events/{id}`
  pub async fn delete_event(&self, id: i64) -> Result<()> {
    self.delete(&format!("/events/{id}")).await
  }

  // ── Tasks ─────────────────────────────────────────────────────────────────

  /// `GET /tasks`
  pub async fn list_tasks(&self) -> Result<Vec<Task>> { self.get("/tasks").await }

  /// `POST /tasks`
  pub async fn create_task(&self, input: &NewTask) -> Result<Task> {
    self.send(Method::POST, "/tasks", input).await
  }

  /// `PATCH /tasks/{id}`
  pub async fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<Task> {
    self.send(Method::PATCH, &format!("/tasks/{id}"), patch).await
  }

  /// `DELETE /tasks/{id}`
  pub async fn delete_task(&self, id: i64) -> Result<()> {
    self.delete(&format!("/tasks/{id}")).await
  }
}

#[cfg(test)]
mod tests {
  use mockito::{Matcher, Server};
  use serde_json::json;
  use uniflow_core::task::Priority;

  use super::*;

  #[tokio::test]
  async fn lists_tasks_from_server() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/tasks")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(
        json!([{
          "id": 4,
          "title": "Essay",
          "description": null,
          "deadline": "2024-06-12T23:59:00Z",
          "priority": "HIGH",
          "completed": false,
          "userId": 1,
          "groupId": null,
        }])
        .to_string(),
      )
      .create_async()
      .await;

    let client = ApiClient::new(format!("{}/", server.url())).unwrap();
    let tasks = client.list_tasks().await.unwrap();

    mock.assert_async().await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].priority, Priority::High);
    assert_eq!(tasks[0].group_id, None);
  }

  #[tokio::test]
  async fn toggle_sends_only_completed() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("PATCH", "/tasks/4")
      .match_body(Matcher::Json(json!({ "completed": true })))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(
        json!({
          "id": 4,
          "title": "Essay",
          "deadline": "2024-06-12T23:59:00Z",
          "priority": "LOW",
          "completed": true,
          "userId": 1,
          "groupId": null,
        })
        .to_string(),
      )
      .create_async()
      .await;

    let client = ApiClient::new(server.url()).unwrap();
    let task = client.update_task(4, &TaskPatch::completed(true)).await.unwrap();

    mock.assert_async().await;
    assert!(task.completed);
  }

  #[tokio::test]
  async fn error_body_becomes_message() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", "/users")
      .with_status(409)
      .with_header("content-type", "application/json")
      .with_body(r#"{"error":"A user with this email already exists."}"#)
      .create_async()
      .await;

    let client = ApiClient::new(server.url()).unwrap();
    let err = client
      .create_user(&NewUser { email: "ada@uni.edu".into(), name: None })
      .await
      .unwrap_err();

    assert!(err.to_string().contains("A user with this email already exists."));
  }

  #[tokio::test]
  async fn delete_accepts_no_content() {
    let mut server = Server::new_async().await;
    let mock = server.mock("DELETE", "/events/9").with_status(204).create_async().await;

    let client = ApiClient::new(server.url()).unwrap();
    client.delete_event(9).await.unwrap();
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn missing_resource_is_an_error() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("DELETE", "/groups/3")
      .with_status(404)
      .with_body(r#"{"error":"group 3 not found"}"#)
      .create_async()
      .await;

    let client = ApiClient::new(server.url()).unwrap();
    let err = client.delete_group(3).await.unwrap_err();
    assert!(err.to_string().contains("404"));
  }
}
