//! Tri-state field updates.
//!
//! A JSON patch body distinguishes three states for a nullable field: the key
//! is missing (leave the column alone), the key is `null` (clear the column),
//! or the key carries a value (overwrite). `Option<T>` collapses the first two,
//! so nullable columns use [`Patch`] instead.
//!
//! Deserialising relies on `#[serde(default)]` on the containing field: serde
//! never calls [`Patch::deserialize`] for a missing key, so the default
//! (`Absent`) wins.

use std::fmt;

use serde::{
  Deserialize, Deserializer, Serialize, Serializer,
  de::{self, Unexpected, Visitor},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
  #[default]
  Absent,
  Null,
  Value(T),
}

impl<T> Patch<T> {
  pub fn is_absent(&self) -> bool { matches!(self, Self::Absent) }

  /// `None` when the field should be left unchanged; otherwise the new column
  /// value.
  pub fn into_update(self) -> Option<Option<T>> {
    match self {
      Self::Absent => None,
      Self::Null => Some(None),
      Self::Value(v) => Some(Some(v)),
    }
  }

  /// Apply this patch to an existing nullable value.
  pub fn apply_to(self, current: &mut Option<T>) {
    if let Some(next) = self.into_update() {
      *current = next;
    }
  }
}

impl Patch<i64> {
  /// Treat a group reference of `0` as "no group".
  pub fn normalize_group(self) -> Self {
    match self {
      Self::Value(0) => Self::Null,
      other => other,
    }
  }
}

impl<T> From<Option<T>> for Patch<T> {
  fn from(value: Option<T>) -> Self {
    match value {
      Some(v) => Self::Value(v),
      None => Self::Null,
    }
  }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    Option::<T>::deserialize(deserializer).map(Patch::from)
  }
}

/// Pair with `#[serde(skip_serializing_if = "Patch::is_absent")]` so that an
/// absent field is omitted from the request body.
impl<T: Serialize> Serialize for Patch<T> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Self::Absent | Self::Null => serializer.serialize_none(),
      Self::Value(v) => serializer.serialize_some(v),
    }
  }
}

/// Normalise a create-time group reference: `0` means "no group".
pub fn normalize_group_id(group_id: Option<i64>) -> Option<i64> {
  group_id.filter(|id| *id != 0)
}

// ─── Group references ────────────────────────────────────────────────────────

/// Accepts an integer id or any falsy JSON value (`null`, `0`, `false`, `""`).
/// Falsy values mean "no group".
struct GroupRefVisitor;

impl<'de> Visitor<'de> for GroupRefVisitor {
  type Value = Option<i64>;

  fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("a group id, or null/0/false/\"\" for no group")
  }

  fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
    Ok(normalize_group_id(Some(v)))
  }

  fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
    let id = i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))?;
    Ok(normalize_group_id(Some(id)))
  }

  fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
    if v {
      return Err(E::invalid_type(Unexpected::Bool(v), &self));
    }
    Ok(None)
  }

  fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
    if !v.is_empty() {
      return Err(E::invalid_type(Unexpected::Str(v), &self));
    }
    Ok(None)
  }

  fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> { Ok(None) }

  fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> { Ok(None) }

  fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
    deserializer.deserialize_any(self)
  }
}

/// `deserialize_with` helper for a create-time `groupId`.
pub fn deserialize_group_id<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<Option<i64>, D::Error> {
  deserializer.deserialize_any(GroupRefVisitor)
}

/// `deserialize_with` helper for a `groupId` patch. Only called when the key
/// is present, so a falsy value clears the group.
pub fn deserialize_group_patch<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<Patch<i64>, D::Error> {
  deserialize_group_id(deserializer).map(Patch::from)
}
