//! Axum integration for Redis-backed sessions.
//!
//! This crate plugs [`redis_session_core`] into an Axum application:
//!
//! - **[`SessionLayer`]**: a Tower layer that resolves the session cookie,
//!   loads the session before the handler runs, and sets the cookie and saves
//!   after it returns
//! - **[`Session`]**: the extractor handlers use to read and mutate the session
//! - **[`cookies`]**: cookie parsing and the set/clear/skip cookie policy
//! - **[`AppError`]**: JSON error responses, including session store outages
//!
//! # Request Flow
//!
//! ```text
//! ┌──────────────┐   path filtered?  ┌──────────────┐
//! │   request    │ ────── yes ─────► │   handler    │  (no session)
//! └──────┬───────┘                   └──────────────┘
//!        │ no
//!        ▼
//! cookie id ──► load ──► Session extension ──► handler ──► changed?
//!                                                            │ yes
//!                                                            ▼
//!                                          Set-Cookie (if id differs) + save
//! ```
//!
//! # Example
//!
//! ```ignore
//! use axum::{routing::get, Router};
//! use redis_session_core::{stores::RedisSessionStore, SessionConfig};
//! use redis_session_web::{Session, SessionLayer};
//!
//! async fn counter(session: Session) -> String {
//!     let n = session.get("n").and_then(|v| v.as_i64()).unwrap_or(0) + 1;
//!     session.set("n", n);
//!     n.to_string()
//! }
//!
//! let store = RedisSessionStore::new("redis://127.0.0.1:6379").await?;
//! let app = Router::new()
//!     .route("/", get(counter))
//!     .layer(SessionLayer::new(store, SessionConfig::default()));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cookies;
pub mod error;
pub mod extractors;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::Session;
pub use middleware::{SessionLayer, SessionMiddleware};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
