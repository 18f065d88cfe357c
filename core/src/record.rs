//! Per-request session record.
//!
//! A [`SessionRecord`] holds one client's session data for the duration of a
//! single request, tracks whether it diverged from the store, and knows how
//! to load, save and destroy itself.
//!
//! # Flags
//!
//! - `changed` turns on with the first `set` or effective `del` and never
//!   turns off again; it is the only trigger for a save.
//! - `empty` mirrors `data.is_empty()` after every mutation and load.

use crate::error::{Result, SessionError};
use crate::id::SessionId;
use crate::providers::SessionStore;
use serde_json::{Map, Value};

/// Session data and dirty tracking for one request.
#[derive(Debug, Clone)]
pub struct SessionRecord<S> {
    id: SessionId,
    store: S,
    expires: u64,
    data: Map<String, Value>,
    changed: bool,
    empty: bool,
}

impl<S: SessionStore> SessionRecord<S> {
    /// Create an empty, unchanged record.
    ///
    /// # Arguments
    ///
    /// * `id` - Fresh id for a new session, or the cookie id pending `load()`
    /// * `store` - Shared store handle
    /// * `expires` - Store TTL in seconds applied on every save
    #[must_use]
    pub fn new(id: SessionId, store: S, expires: u64) -> Self {
        Self {
            id,
            store,
            expires,
            data: Map::new(),
            changed: false,
            empty: true,
        }
    }

    /// Current session id.
    #[must_use]
    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    /// Value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Value stored under `name`, or `default` when absent.
    #[must_use]
    pub fn get_or(&self, name: &str, default: Value) -> Value {
        self.data.get(name).cloned().unwrap_or(default)
    }

    /// Whether `name` is present.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// Insert or overwrite `name`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(name.into(), value.into());
        self.changed = true;
        self.empty = false;
    }

    /// Remove `name`. Removing an absent name leaves both flags untouched.
    pub fn del(&mut self, name: &str) {
        if self.data.remove(name).is_some() {
            self.changed = true;
            self.empty = self.data.is_empty();
        }
    }

    /// Whether the record was mutated since construction or load.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.changed
    }

    /// Whether the record holds no values.
    #[must_use]
    pub const fn empty(&self) -> bool {
        self.empty
    }

    /// Borrow the whole data mapping.
    #[must_use]
    pub const fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Persist the data under `session:<id>` with the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the store write fails.
    pub async fn save(&self) -> Result<()> {
        let payload = serde_json::to_string(&self.data)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;

        self.store
            .set_ex(&self.id.store_key(), self.expires, payload)
            .await?;

        tracing::debug!(
            session_id = %self.id,
            ttl_seconds = self.expires,
            keys = self.data.len(),
            "Saved session"
        );

        Ok(())
    }

    /// Replace the data with the stored entry for this id.
    ///
    /// A missing entry is an unknown or expired session and leaves the record
    /// empty. `changed` is never touched.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::StoreConnectivity`] if the read fails, or
    /// [`SessionError::Deserialization`] if the stored value is not a JSON
    /// object. The data is left untouched in both cases.
    pub async fn load(&mut self) -> Result<()> {
        let Some(raw) = self.store.get(&self.id.store_key()).await? else {
            tracing::debug!(session_id = %self.id, "No stored session for id");
            return Ok(());
        };

        let data: Map<String, Value> = serde_json::from_str(&raw)
            .map_err(|e| SessionError::Deserialization(e.to_string()))?;

        self.data = data;
        self.empty = self.data.is_empty();

        tracing::debug!(session_id = %self.id, keys = self.data.len(), "Loaded session");

        Ok(())
    }

    /// Drop all data and rotate to a fresh, unsaved id.
    ///
    /// The old store entry is deleted on a detached task; its outcome is only
    /// logged and never blocks or fails the caller.
    pub fn destroy(&mut self) {
        self.data.clear();
        self.changed = true;
        self.empty = true;

        let old_id = std::mem::replace(&mut self.id, SessionId::generate());
        spawn_delete(self.store.clone(), old_id);

        metrics::counter!("sessions_destroyed_total").increment(1);
    }
}

/// Delete a session entry in the background.
fn spawn_delete<S: SessionStore>(store: S, id: SessionId) {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        tracing::warn!(
            session_id = %id,
            "No async runtime to delete destroyed session; entry left to expire"
        );
        return;
    };

    runtime.spawn(async move {
        match store.del(&id.store_key()).await {
            Ok(()) => tracing::debug!(session_id = %id, "Deleted destroyed session"),
            Err(error) => tracing::warn!(
                session_id = %id,
                error = %error,
                "Failed to delete destroyed session; entry left to expire"
            ),
        }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::MockSessionStore;
    use serde_json::json;

    fn new_record(store: &MockSessionStore) -> SessionRecord<MockSessionStore> {
        SessionRecord::new(SessionId::generate(), store.clone(), 60)
    }

    #[test]
    fn test_new_record_is_empty_and_unchanged() {
        let record = new_record(&MockSessionStore::new());

        assert!(record.empty());
        assert!(!record.changed());
        assert_eq!(record.get("foo"), None);
        assert_eq!(record.get_or("foo", Value::Null), Value::Null);
    }

    #[test]
    fn test_set_marks_changed() {
        let mut record = new_record(&MockSessionStore::new());
        record.set("foo", "bar");

        assert!(record.changed());
        assert!(!record.empty());
        assert!(record.has("foo"));
        assert_eq!(record.get_or("foo", Value::Null), json!("bar"));
    }

    #[test]
    fn test_del_of_absent_name_is_noop() {
        let mut record = new_record(&MockSessionStore::new());
        record.del("missing");

        assert!(!record.changed());
        assert!(record.empty());
    }

    #[test]
    fn test_del_keeps_changed_after_emptying() {
        let mut record = new_record(&MockSessionStore::new());
        record.set("a", 1);
        record.set("b", 2);

        record.del("a");
        assert!(!record.empty());

        record.del("b");
        assert!(record.empty());
        assert!(record.changed());
    }

    #[tokio::test]
    async fn test_save_writes_json_with_ttl() {
        let store = MockSessionStore::new();
        let mut record = new_record(&store);
        record.set("foo", "bar");
        record.set("nested", json!({"list": [1, 2, 3], "flag": true}));

        record.save().await.unwrap();

        let key = record.id().store_key();
        assert_eq!(store.ttl_of(&key).unwrap(), Some(60));
        let stored: Value = serde_json::from_str(&store.raw(&key).unwrap().unwrap()).unwrap();
        assert_eq!(stored, json!({"foo": "bar", "nested": {"list": [1, 2, 3], "flag": true}}));
    }

    #[tokio::test]
    async fn test_load_restores_data_without_marking_changed() {
        let store = MockSessionStore::new();
        let mut original = new_record(&store);
        original.set("foo", "bar");
        original.save().await.unwrap();

        let mut loaded = SessionRecord::new(original.id().clone(), store.clone(), 60);
        loaded.load().await.unwrap();

        assert_eq!(loaded.get("foo"), Some(&json!("bar")));
        assert!(!loaded.empty());
        assert!(!loaded.changed());
    }

    #[tokio::test]
    async fn test_load_unknown_id_is_empty_session() {
        let store = MockSessionStore::new();
        let mut record = SessionRecord::new(SessionId::parse("unknown").unwrap(), store, 60);

        record.load().await.unwrap();

        assert!(record.empty());
        assert!(!record.changed());
        assert_eq!(record.get_or("foo", Value::Null), Value::Null);
    }

    #[tokio::test]
    async fn test_load_of_stored_empty_map() {
        let store = MockSessionStore::new();
        let id = SessionId::generate();
        store.insert_raw(&id.store_key(), "{}").unwrap();

        let mut record = SessionRecord::new(id, store, 60);
        record.load().await.unwrap();

        assert!(record.empty());
    }

    #[tokio::test]
    async fn test_load_rejects_corrupted_data() {
        let store = MockSessionStore::new();
        let id = SessionId::generate();

        for corrupted in ["not json", "[1, 2]", "\"string\""] {
            store.insert_raw(&id.store_key(), corrupted).unwrap();

            let mut record = SessionRecord::new(id.clone(), store.clone(), 60);
            let result = record.load().await;

            assert!(matches!(result, Err(SessionError::Deserialization(_))), "{corrupted}");
            assert!(record.empty());
        }
    }

    #[tokio::test]
    async fn test_store_failures_propagate() {
        let store = MockSessionStore::new();
        store.set_available(false);

        let mut record = new_record(&store);
        assert!(matches!(record.load().await, Err(SessionError::StoreConnectivity(_))));

        record.set("foo", "bar");
        assert!(matches!(record.save().await, Err(SessionError::StoreConnectivity(_))));
    }

    #[tokio::test]
    async fn test_destroy_rotates_id_and_deletes_old_entry() {
        let store = MockSessionStore::new();
        let mut record = new_record(&store);
        record.set("foo", "bar");
        record.save().await.unwrap();
        let old_id = record.id().clone();

        record.destroy();

        assert_ne!(record.id(), &old_id);
        assert!(record.empty());
        assert!(record.changed());
        assert!(!record.has("foo"));

        // Let the background delete run
        tokio::task::yield_now().await;
        assert_eq!(store.raw(&old_id.store_key()).unwrap(), None);
    }

    #[tokio::test]
    async fn test_destroy_tolerates_store_failure() {
        let store = MockSessionStore::new();
        let mut record = new_record(&store);
        store.set_available(false);

        record.destroy();
        tokio::task::yield_now().await;

        assert!(record.empty());
        assert!(record.changed());
    }

    #[test]
    fn test_destroy_without_runtime_still_rotates() {
        let mut record = new_record(&MockSessionStore::new());
        let old_id = record.id().clone();

        record.destroy();

        assert_ne!(record.id(), &old_id);
    }
}
