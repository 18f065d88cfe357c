//! Session store trait.

use crate::error::Result;
use std::future::Future;

/// Key-value store holding serialized sessions.
///
/// This trait abstracts over session storage (Redis). Only three commands
/// are needed: `SETEX`, `GET` and `DEL`.
///
/// # Implementation Notes
///
/// - One handle is shared by every concurrent request, so implementations
///   must be cheap to clone and safe to use from many tasks at once
/// - Expiry is a hint; the store may drop entries earlier
/// - Transport failures map to `SessionError::StoreConnectivity`
pub trait SessionStore: Clone + Send + Sync + 'static {
    /// Write `value` under `key` with a TTL, discarding the store's reply.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn set_ex(
        &self,
        key: &str,
        ttl_seconds: u64,
        value: String,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Read the value under `key`.
    ///
    /// # Returns
    ///
    /// `None` if the key does not exist (never written, expired or deleted).
    ///
    /// # Errors
    ///
    /// Returns error if the read fails.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Delete `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns error if the delete fails.
    fn del(&self, key: &str) -> impl Future<Output = Result<()>> + Send;

    /// Release the store connection on application shutdown.
    ///
    /// # Errors
    ///
    /// Returns error if the connection could not be closed cleanly.
    fn close(&self) -> impl Future<Output = Result<()>> + Send;
}
