//! Builder for `UPDATE ... SET` statements that touch only the columns a
//! patch provides.

use rusqlite::types::Value;

#[derive(Debug, Default)]
pub struct Assignments {
  columns: Vec<&'static str>,
  values:  Vec<Value>,
}

impl Assignments {
  pub fn new() -> Self { Self::default() }

  pub fn set(&mut self, column: &'static str, value: impl Into<Value>) {
    self.columns.push(column);
    self.values.push(value.into());
  }

  /// Set a nullable column.
  pub fn set_nullable<T: Into<Value>>(&mut self, column: &'static str, value: Option<T>) {
    self.set(column, value.map_or(Value::Null, Into::into));
  }

  pub fn is_empty(&self) -> bool { self.columns.is_empty() }

  /// Execute `UPDATE <table> SET ... WHERE id = ?` and return the number of
  /// rows changed.
  pub fn execute(self, conn: &rusqlite::Connection, table: &str, id: i64) -> rusqlite::Result<usize> {
    let sets = self
      .columns
      .iter()
      .enumerate()
      .map(|(i, c)| format!("{c} = ?{}", i + 1))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!("UPDATE {table} SET {sets} WHERE id = ?{}", self.columns.len() + 1);

    let mut values = self.values;
    values.push(Value::Integer(id));
    conn.execute(&sql, rusqlite::params_from_iter(values))
  }
}
