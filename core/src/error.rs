//! Error types for session operations.

use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Failure modes of the session lifecycle.
///
/// Only [`SessionError::StoreConnectivity`] is meant to reach the client as a
/// failed request. The others are either downgraded by the middleware or
/// normalized away before a handler ever sees them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    // ═══════════════════════════════════════════════════════════
    // Store Errors
    // ═══════════════════════════════════════════════════════════

    /// The key-value store could not be reached or rejected a command.
    #[error("Session store error: {0}")]
    StoreConnectivity(String),

    /// Stored session content is not a valid serialized mapping.
    #[error("Stored session data is invalid: {0}")]
    Deserialization(String),

    /// Session data could not be serialized for storage.
    #[error("Failed to serialize session data: {0}")]
    Serialization(String),

    // ═══════════════════════════════════════════════════════════
    // Request Errors
    // ═══════════════════════════════════════════════════════════

    /// A session cookie value failed the identifier format.
    ///
    /// Never fatal: callers treat it as "no session id present".
    #[error("Malformed session cookie: {0}")]
    MalformedCookie(String),

    // ═══════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════

    /// Invalid session configuration.
    #[error("Invalid session configuration: {0}")]
    Config(String),
}

impl SessionError {
    /// Returns `true` if this error came from talking to the store.
    ///
    /// # Examples
    ///
    /// ```
    /// # use redis_session_core::SessionError;
    /// assert!(SessionError::StoreConnectivity("refused".into()).is_store_error());
    /// assert!(!SessionError::MalformedCookie("a b".into()).is_store_error());
    /// ```
    #[must_use]
    pub const fn is_store_error(&self) -> bool {
        matches!(self, Self::StoreConnectivity(_))
    }
}

impl From<redis::RedisError> for SessionError {
    fn from(error: redis::RedisError) -> Self {
        Self::StoreConnectivity(error.to_string())
    }
}
