// src/lib.rs
// Query runner - saved query cache and subscription notifier

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod error;
pub mod frontend;
pub mod http;
pub mod notify;
pub mod saved_query;
pub mod web;

pub use error::{QueryRunnerError, Result};
