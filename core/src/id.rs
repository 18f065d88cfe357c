//! Session identifiers.

use crate::error::{Result, SessionError};
use base64::Engine;
use rand::RngCore;
use std::fmt;

/// Number of random bytes behind every session id (128 bits of entropy).
pub const SESSION_ID_BYTES: usize = 16;

/// Upper bound on accepted cookie values, well above a minted id.
const MAX_SESSION_ID_LEN: usize = 128;

/// Prefix of every session entry in the key-value store.
pub const STORE_KEY_PREFIX: &str = "session:";

/// Opaque session identifier carried in the session cookie.
///
/// Minted ids are 16 random bytes encoded as base64url without padding, so
/// they only contain `[A-Za-z0-9_-]` and never need cookie quoting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Mint a fresh identifier from a cryptographically secure RNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut random_bytes = [0u8; SESSION_ID_BYTES];
        rand::thread_rng().fill_bytes(&mut random_bytes);
        Self(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes))
    }

    /// Validate a client-supplied value (usually a cookie) as a session id.
    ///
    /// Accepts non-empty values made of ASCII letters, digits, `-` and `_`.
    /// Unknown but well-formed ids are accepted; whether they exist is the
    /// store's business.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MalformedCookie`] if the value is empty, too
    /// long, or contains any other character.
    ///
    /// # Examples
    ///
    /// ```
    /// use redis_session_core::SessionId;
    ///
    /// assert!(SessionId::parse("unknown").is_ok());
    /// assert!(SessionId::parse("").is_err());
    /// assert!(SessionId::parse("a;b").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self> {
        if value.is_empty() || value.len() > MAX_SESSION_ID_LEN {
            return Err(SessionError::MalformedCookie(format!(
                "length {} outside 1..={MAX_SESSION_ID_LEN}",
                value.len()
            )));
        }

        if !value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(SessionError::MalformedCookie(
                "contains characters outside [A-Za-z0-9_-]".to_string(),
            ));
        }

        Ok(Self(value.to_string()))
    }

    /// The identifier as sent in the cookie.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of this session's entry in the store (`session:<id>`).
    #[must_use]
    pub fn store_key(&self) -> String {
        format!("{STORE_KEY_PREFIX}{}", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_cookie_safe() {
        let id = SessionId::generate();

        // 16 bytes -> 22 base64url characters without padding
        assert_eq!(id.as_str().len(), 22);
        assert!(SessionId::parse(id.as_str()).is_ok());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: std::collections::HashSet<_> = (0..1000).map(|_| SessionId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_store_key_format() {
        let id = SessionId::parse("abc123").unwrap();
        assert_eq!(id.store_key(), "session:abc123");
    }

    #[test]
    fn test_parse_rejects_malformed_values() {
        for value in ["", "has space", "semi;colon", "quote\"", "plus+slash/", "équipe"] {
            assert!(
                matches!(SessionId::parse(value), Err(SessionError::MalformedCookie(_))),
                "{value:?} should be rejected"
            );
        }

        let too_long = "a".repeat(MAX_SESSION_ID_LEN + 1);
        assert!(SessionId::parse(&too_long).is_err());
    }

    #[test]
    fn test_parse_accepts_url_safe_alphabet() {
        assert!(SessionId::parse("Abc-123_xyz").is_ok());
        assert!(SessionId::parse(&"a".repeat(MAX_SESSION_ID_LEN)).is_ok());
    }
}
