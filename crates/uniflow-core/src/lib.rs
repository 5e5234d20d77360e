//! Core types, trait definitions, and view-model logic for UniFlow.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Everything under [`calendar`], [`view`], and [`loader`] is pure and can be
//! exercised without a store or a renderer.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod calendar;
pub mod error;
pub mod event;
pub mod group;
pub mod loader;
pub mod patch;
pub mod store;
pub mod task;
pub mod user;
pub mod view;

pub use error::{Classify, Entity, Error, ErrorClass, Result};
