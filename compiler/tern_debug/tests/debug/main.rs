//! Debug Info Integration Tests
//!
//! Drive header and symbol emission through the public API against the
//! in-memory metadata artifact.

pub mod emission;
pub mod util;
