//! # Redis Session Core
//!
//! Server-side sessions keyed by an opaque cookie id and persisted in a
//! key-value store.
//!
//! This crate holds everything that does not depend on the HTTP framework:
//!
//! - **[`SessionRecord`]**: per-request data plus `changed`/`empty` flags,
//!   with `load`, `save` and `destroy` against the store
//! - **[`SessionId`]**: minting and validation of cookie-safe identifiers
//! - **[`PathFilter`]**: enable/disable decision per request path
//! - **[`SessionStore`]**: the `SETEX`/`GET`/`DEL` contract, implemented by
//!   [`stores::RedisSessionStore`] and, for tests, `mocks::MockSessionStore`
//!
//! ## Lifecycle
//!
//! ```text
//! cookie id? ──yes──► SessionRecord::new(id) ──► load()
//!     │                                              │
//!     no ──► SessionRecord::new(generate()) ─────────┤
//!                                                    ▼
//!                                  handler: get / set / del / destroy
//!                                                    │
//!                          changed()? ──no──► nothing written
//!                                │
//!                               yes ──► cookie decision ──► save()
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use redis_session_core::{SessionId, SessionRecord, stores::RedisSessionStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisSessionStore::new("redis://127.0.0.1:6379").await?;
//!
//! let mut record = SessionRecord::new(SessionId::generate(), store, 86_400);
//! record.set("user", "alice");
//! record.save().await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod environment;
pub mod error;
pub mod filter;
pub mod id;
pub mod providers;
pub mod record;
pub mod stores;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use config::{SameSitePolicy, SessionConfig};
pub use environment::{Clock, SystemClock};
pub use error::{Result, SessionError};
pub use filter::PathFilter;
pub use id::SessionId;
pub use providers::SessionStore;
pub use record::SessionRecord;
pub use serde_json::Value;
