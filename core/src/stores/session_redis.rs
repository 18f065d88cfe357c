//! Redis-based session store implementation.
//!
//! Sessions are stored in Redis with:
//! - **Key**: `session:{session_id}` → JSON-serialized session data
//! - **TTL**: the configured session expiry, refreshed on every save
//!
//! # Example
//!
//! ```no_run
//! use redis_session_core::stores::RedisSessionStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisSessionStore::new("redis://127.0.0.1:6379").await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SessionError};
use crate::providers::SessionStore;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

/// Redis-based session store with TTL-based expiration.
///
/// Clones share one multiplexed connection through `ConnectionManager`,
/// which also reconnects after transient failures.
#[derive(Clone)]
pub struct RedisSessionStore {
    /// Connection manager shared by all clones.
    conn_manager: ConnectionManager,
}

impl std::fmt::Debug for RedisSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionStore").finish_non_exhaustive()
    }
}

impl RedisSessionStore {
    /// Create a new Redis session store.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    ///
    /// # Errors
    ///
    /// Returns error if connection to Redis fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            SessionError::StoreConnectivity(format!("Failed to create Redis client: {e}"))
        })?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            SessionError::StoreConnectivity(format!(
                "Failed to create Redis connection manager: {e}"
            ))
        })?;

        tracing::info!(redis_url = %redis_url, "Connected session store to Redis");

        Ok(Self { conn_manager })
    }
}

impl SessionStore for RedisSessionStore {
    async fn set_ex(&self, key: &str, ttl_seconds: u64, value: String) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let _: () = conn.set_ex(key, value, ttl_seconds).await.map_err(|e| {
            SessionError::StoreConnectivity(format!("Failed to write session: {e}"))
        })?;

        tracing::debug!(key = %key, ttl_seconds = ttl_seconds, "Wrote session to Redis");

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn_manager.clone();

        let value: Option<String> = conn.get(key).await.map_err(|e| {
            SessionError::StoreConnectivity(format!("Failed to get session from Redis: {e}"))
        })?;

        Ok(value)
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let _: () = conn.del(key).await.map_err(|e| {
            SessionError::StoreConnectivity(format!("Failed to delete session from Redis: {e}"))
        })?;

        tracing::debug!(key = %key, "Deleted session from Redis");

        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let _: () = redis::cmd("QUIT").query_async(&mut conn).await?;

        tracing::info!("Closed Redis session store connection");

        Ok(())
    }
}
