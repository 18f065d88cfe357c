//! # Redis Session Testing
//!
//! Testing utilities for applications using redis-session.
//!
//! This crate provides:
//! - [`FixedClock`] for deterministic cookie expiry
//! - [`TestClient`], a browser-like client that carries cookies between
//!   requests to an Axum `Router`
//! - proptest strategies for session mutations
//! - [`logs::capture_logs`] for asserting on emitted `tracing` events
//!
//! ## Example
//!
//! ```ignore
//! use redis_session_testing::TestClient;
//!
//! #[tokio::test]
//! async fn test_remembers_values() {
//!     let mut client = TestClient::new(app());
//!
//!     client.get("/login/alice").await?;
//!     let response = client.get("/whoami").await?;
//!
//!     assert_eq!(response.body, "alice");
//! }
//! ```

pub mod client;
pub mod logs;
pub mod properties;

use chrono::{DateTime, Utc};
use redis_session_core::environment::Clock;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use redis_session_testing::mocks::FixedClock;
    /// use redis_session_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Install a test-friendly tracing subscriber honoring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs it.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use client::{TestClient, TestResponse};
pub use logs::{capture_logs, CapturedLogs};
pub use mocks::{FixedClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }
}
