//! Library Loading Integration Tests
//!
//! Exercise library images end to end: containers written to disk, opened
//! under a session configuration, and materialized through the registry.

#![allow(clippy::unwrap_used, reason = "integration tests panic on setup failure")]

pub mod loading;
pub mod util;
