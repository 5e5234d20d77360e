//! Event and task responses with the referenced group inlined as `group`.

use std::collections::HashMap;

use serde::Serialize;
use uniflow_core::{event::Event, group::Group, store::PlannerStore, task::Task};

use crate::error::ApiError;

/// The group fields inlined into an event or task.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
  pub id:   i64,
  pub name: String,
}

impl From<Group> for GroupSummary {
  fn from(g: Group) -> Self { Self { id: g.id, name: g.name } }
}

/// A row serialised with its group alongside `groupId`.
#[derive(Debug, Serialize)]
pub struct WithGroup<T> {
  #[serde(flatten)]
  pub item:  T,
  pub group: Option<GroupSummary>,
}

/// Rows that may reference a group.
pub trait GroupRef {
  fn group_id(&self) -> Option<i64>;
}

impl GroupRef for Event {
  fn group_id(&self) -> Option<i64> { self.group_id }
}

impl GroupRef for Task {
  fn group_id(&self) -> Option<i64> { self.group_id }
}

pub(crate) async fn one<S, T>(store: &S, item: T) -> Result<WithGroup<T>, ApiError>
where
  S: PlannerStore,
  T: GroupRef,
{
  let group = match item.group_id() {
    Some(id) => store.get_group(id).await.map_err(ApiError::store)?.map(GroupSummary::from),
    None => None,
  };
  Ok(WithGroup { item, group })
}

pub(crate) async fn all<S, T>(store: &S, items: Vec<T>) -> Result<Vec<WithGroup<T>>, ApiError>
where
  S: PlannerStore,
  T: GroupRef,
{
  let groups: HashMap<i64, GroupSummary> = store
    .list_groups()
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|g| (g.id, GroupSummary::from(g)))
    .collect();

  Ok(
    items
      .into_iter()
      .map(|item| {
        let group = item.group_id().and_then(|id| groups.get(&id).cloned());
        WithGroup { item, group }
      })
      .collect(),
  )
}
