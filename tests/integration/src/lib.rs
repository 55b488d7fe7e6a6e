//! Integration test utilities for the moderation bot
//!
//! In-memory stores, a recording messaging gateway and update builders for
//! driving the dispatcher end to end, plus a local webhook server.

pub mod fixtures;
pub mod helpers;
pub mod platform;
pub mod store;

pub use fixtures::*;
pub use helpers::*;
pub use platform::*;
pub use store::MemoryStore;
