//! Mock session store for testing.

use crate::error::{Result, SessionError};
use crate::providers::SessionStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct StoredEntry {
    value: String,
    ttl_seconds: u64,
}

#[derive(Debug, Default)]
struct MockState {
    entries: Mutex<HashMap<String, StoredEntry>>,
    unavailable: AtomicBool,
    closed: AtomicBool,
    writes: AtomicUsize,
}

/// Mock session store.
///
/// Uses in-memory storage for testing. TTLs are recorded, not enforced.
/// Clones share the same storage, like clones of a real client.
#[derive(Debug, Clone, Default)]
pub struct MockSessionStore {
    state: Arc<MockState>,
}

impl MockSessionStore {
    /// Create a new mock session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, StoredEntry>>> {
        self.state
            .entries
            .lock()
            .map_err(|_| SessionError::StoreConnectivity("Mutex lock failed".to_string()))
    }

    fn check_available(&self) -> Result<()> {
        if self.state.unavailable.load(Ordering::SeqCst) {
            return Err(SessionError::StoreConnectivity(
                "Mock store unavailable".to_string(),
            ));
        }
        Ok(())
    }

    /// Simulate the store going down (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.state.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Store a raw payload, bypassing serialization (for corrupted data).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn insert_raw(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(
            key.to_string(),
            StoredEntry {
                value: value.to_string(),
                ttl_seconds: 0,
            },
        );
        Ok(())
    }

    /// Raw payload under `key` (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).map(|e| e.value.clone()))
    }

    /// TTL of the last write under `key` (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn ttl_of(&self, key: &str) -> Result<Option<u64>> {
        Ok(self.entries()?.get(key).map(|e| e.ttl_seconds))
    }

    /// Get count of stored sessions (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn entry_count(&self) -> Result<usize> {
        Ok(self.entries()?.len())
    }

    /// Number of successful `set_ex` calls so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.state.writes.load(Ordering::SeqCst)
    }

    /// Whether `close` was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }
}

impl SessionStore for MockSessionStore {
    async fn set_ex(&self, key: &str, ttl_seconds: u64, value: String) -> Result<()> {
        self.check_available()?;

        self.entries()?.insert(key.to_string(), StoredEntry { value, ttl_seconds });
        self.state.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        self.raw(key)
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.check_available()?;

        self.entries()?.remove(key);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.state.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
