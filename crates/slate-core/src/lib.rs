//! Core types and trait definitions for the Slate timetable service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod auth;
pub mod class;
pub mod error;
pub mod schedule;
pub mod service;
pub mod store;
pub mod subject;
pub mod user;

pub use error::{Error, Result};
