//! The `Session` extractor handed to request handlers.
//!
//! # Examples
//!
//! ```ignore
//! use redis_session_web::Session;
//!
//! async fn visit(session: Session) -> String {
//!     let visits = session.get("visits").and_then(|v| v.as_i64()).unwrap_or(0) + 1;
//!     session.set("visits", visits);
//!     format!("visit #{visits}")
//! }
//!
//! // Routes that may be excluded by the path filters take an `Option`
//! async fn asset(session: Option<Session>) -> &'static str {
//!     if session.is_some() { "with session" } else { "static" }
//! }
//! ```

use crate::error::AppError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use redis_session_core::{
    stores::RedisSessionStore, SessionId, SessionRecord, SessionStore, Value,
};
use serde_json::Map;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Handle to the current request's [`SessionRecord`].
///
/// The middleware and the handler share the record, so the handle is a
/// cheap clone. It is never shared across requests.
pub struct Session<S: SessionStore = RedisSessionStore> {
    record: Arc<Mutex<SessionRecord<S>>>,
}

impl<S: SessionStore> Clone for Session<S> {
    fn clone(&self) -> Self {
        Self {
            record: Arc::clone(&self.record),
        }
    }
}

impl<S: SessionStore> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let record = self.lock();
        f.debug_struct("Session")
            .field("id", record.id())
            .field("changed", &record.changed())
            .field("empty", &record.empty())
            .finish_non_exhaustive()
    }
}

impl<S: SessionStore> Session<S> {
    /// Wrap a record for one request.
    #[must_use]
    pub fn new(record: SessionRecord<S>) -> Self {
        Self {
            record: Arc::new(Mutex::new(record)),
        }
    }

    // A panic while holding the lock cannot leave the record half-updated:
    // every mutation is a single map operation plus flag writes.
    fn lock(&self) -> MutexGuard<'_, SessionRecord<S>> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current session id.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.lock().id().clone()
    }

    /// Value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.lock().get(name).cloned()
    }

    /// Value stored under `name`, or `default` when absent.
    #[must_use]
    pub fn get_or(&self, name: &str, default: Value) -> Value {
        self.lock().get_or(name, default)
    }

    /// Whether `name` is present.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.lock().has(name)
    }

    /// Insert or overwrite `name`.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.lock().set(name, value);
    }

    /// Remove `name` if present.
    pub fn del(&self, name: &str) {
        self.lock().del(name);
    }

    /// Copy of all stored values.
    #[must_use]
    pub fn data(&self) -> Map<String, Value> {
        self.lock().data().clone()
    }

    /// Clear the session and rotate to a fresh id.
    pub fn destroy(&self) {
        self.lock().destroy();
    }

    /// Whether the session was mutated during this request.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.lock().changed()
    }

    /// Whether the session holds no values.
    #[must_use]
    pub fn empty(&self) -> bool {
        self.lock().empty()
    }

    /// Copy of the record if it needs saving.
    pub(crate) fn changed_snapshot(&self) -> Option<SessionRecord<S>> {
        let record = self.lock();
        record.changed().then(|| record.clone())
    }
}

#[async_trait]
impl<S, T> FromRequestParts<T> for Session<S>
where
    S: SessionStore,
    T: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &T) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            AppError::internal("No session for this request; is SessionLayer installed and the path enabled?")
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use redis_session_core::mocks::MockSessionStore;
    use serde_json::json;

    fn session() -> Session<MockSessionStore> {
        Session::new(SessionRecord::new(
            SessionId::generate(),
            MockSessionStore::new(),
            60,
        ))
    }

    #[test]
    fn test_clones_share_the_record() {
        let a = session();
        let b = a.clone();

        a.set("foo", "bar");

        assert_eq!(b.get("foo"), Some(json!("bar")));
        assert!(b.changed());
    }

    #[test]
    fn test_snapshot_only_when_changed() {
        let s = session();
        assert!(s.changed_snapshot().is_none());

        s.set("n", 1);
        let snapshot = s.changed_snapshot().unwrap();
        assert_eq!(snapshot.get("n"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_extractor_rejects_without_layer() {
        let (mut parts, ()) = axum::http::Request::new(()).into_parts();

        let result = Session::<MockSessionStore>::from_request_parts(&mut parts, &()).await;

        assert_eq!(
            result.unwrap_err().status(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_extractor_reads_extension() {
        let s = session();
        s.set("foo", "bar");
        let (mut parts, ()) = axum::http::Request::new(()).into_parts();
        parts.extensions.insert(s.clone());

        let extracted = Session::<MockSessionStore>::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(extracted.id(), s.id());
        assert_eq!(extracted.get_or("foo", Value::Null), json!("bar"));
    }
}
