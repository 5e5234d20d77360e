//! Request-generation guard for client-side data loads.
//!
//! Every fetch takes a [`Ticket`] before it is issued. When responses arrive
//! out of order, only one newer than the last settled ticket may touch the
//! slot, so a slow stale response never overwrites fresher data.

use std::fmt;

/// Sequence number handed out by [`Loadable::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
  pub fn sequence(self) -> u64 { self.0 }
}

/// What [`Loadable::complete`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// The value replaced the slot's contents.
  Applied,
  /// The error was recorded; the previous value is kept.
  Failed,
  /// A newer request had already settled; the response was dropped.
  Stale,
}

/// A value loaded from the network, with its last error.
#[derive(Debug, Clone)]
pub struct Loadable<T> {
  value:   Option<T>,
  error:   Option<String>,
  issued:  u64,
  settled: u64,
}

impl<T> Default for Loadable<T> {
  fn default() -> Self { Self { value: None, error: None, issued: 0, settled: 0 } }
}

impl<T> Loadable<T> {
  pub fn new() -> Self { Self::default() }

  /// Reserve the next sequence number for a request about to be sent.
  pub fn begin(&mut self) -> Ticket {
    self.issued += 1;
    Ticket(self.issued)
  }

  /// Settle the request identified by `ticket`.
  ///
  /// A failure leaves the previously displayed value in place and records an
  /// inline error message; a later success clears it.
  pub fn complete<E: fmt::Display>(&mut self, ticket: Ticket, result: Result<T, E>) -> Outcome {
    if ticket.0 <= self.settled {
      return Outcome::Stale;
    }
    self.settled = ticket.0;
    match result {
      Ok(value) => {
        self.value = Some(value);
        self.error = None;
        Outcome::Applied
      }
      Err(e) => {
        self.error = Some(e.to_string());
        Outcome::Failed
      }
    }
  }

  pub fn value(&self) -> Option<&T> { self.value.as_ref() }

  pub fn error(&self) -> Option<&str> { self.error.as_deref() }

  /// Whether the most recently issued request has not settled yet.
  pub fn is_loading(&self) -> bool { self.settled < self.issued }
}

impl<T: Default> Loadable<T> {
  /// The loaded value, or an empty default before the first success.
  pub fn value_or_default(&self) -> T
  where
    T: Clone,
  {
    self.value.clone().unwrap_or_default()
  }
}
