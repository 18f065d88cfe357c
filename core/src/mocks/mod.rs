//! Mock store implementations for testing.
//!
//! Simple, in-memory implementations of [`crate::providers::SessionStore`]
//! for use in unit and integration tests.

pub mod session;

pub use session::MockSessionStore;
