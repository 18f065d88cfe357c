//! Session configuration.
//!
//! Values are supplied by the application, either built in code or read
//! from the environment with [`SessionConfig::from_env`].

use crate::error::{Result, SessionError};
use crate::filter::{self, PathFilter};
use std::str::FromStr;

/// Default store connection target.
pub const DEFAULT_DATABASE_URL: &str = "redis://localhost";

/// Default store TTL: 24 hours.
pub const DEFAULT_SESSION_EXPIRES: u64 = 86_400;

/// Default cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "session";

/// SameSite cookie policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSitePolicy {
    /// Strict (same-site only).
    Strict,

    /// Lax (cross-site GET allowed).
    Lax,

    /// None (cross-site allowed, requires Secure).
    None,
}

impl FromStr for SameSitePolicy {
    type Err = SessionError;

    /// Case-insensitive `strict`, `lax` or `none`.
    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lax" => Ok(Self::Lax),
            "none" => Ok(Self::None),
            other => Err(SessionError::Config(format!(
                "unknown SameSite policy '{other}'"
            ))),
        }
    }
}

/// Session manager configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Store connection URL (e.g., "redis://127.0.0.1:6379").
    ///
    /// Default: `redis://localhost`
    pub database: String,

    /// Store TTL in seconds, refreshed on every save.
    ///
    /// Default: 86400 (24 hours)
    pub session_expires: u64,

    /// Cookie lifetime in seconds. `0` means a session-scoped cookie that
    /// the browser drops when it closes.
    ///
    /// Default: 0
    pub cookie_expires: u64,

    /// Name of the cookie carrying the session id.
    ///
    /// Default: `session`
    pub cookie_name: String,

    /// Paths that may get a session.
    ///
    /// Default: every path
    pub enable: PathFilter,

    /// Paths that never get a session, even when enabled.
    ///
    /// Default: static assets (see [`filter::STATIC_ASSET_PATTERN`])
    pub disable: PathFilter,

    /// `HttpOnly` cookie attribute.
    ///
    /// Default: `true`
    pub http_only: bool,

    /// `Secure` cookie attribute.
    ///
    /// Default: `false`
    pub secure: bool,

    /// `SameSite` cookie attribute.
    ///
    /// Default: Lax
    pub same_site: SameSitePolicy,
}

impl SessionConfig {
    /// Set the store connection URL.
    #[must_use]
    pub fn with_database(mut self, url: impl Into<String>) -> Self {
        self.database = url.into();
        self
    }

    /// Set the store TTL in seconds.
    #[must_use]
    pub const fn with_session_expires(mut self, seconds: u64) -> Self {
        self.session_expires = seconds;
        self
    }

    /// Set the cookie lifetime in seconds (`0` for a session cookie).
    #[must_use]
    pub const fn with_cookie_expires(mut self, seconds: u64) -> Self {
        self.cookie_expires = seconds;
        self
    }

    /// Set the cookie name.
    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set the enable filter.
    #[must_use]
    pub fn with_enable(mut self, filter: PathFilter) -> Self {
        self.enable = filter;
        self
    }

    /// Set the disable filter.
    #[must_use]
    pub fn with_disable(mut self, filter: PathFilter) -> Self {
        self.disable = filter;
        self
    }

    /// Set the cookie security attributes.
    #[must_use]
    pub const fn with_cookie_security(
        mut self,
        http_only: bool,
        secure: bool,
        same_site: SameSitePolicy,
    ) -> Self {
        self.http_only = http_only;
        self.secure = secure;
        self.same_site = same_site;
        self
    }

    /// Whether requests to `path` get a session.
    #[must_use]
    pub fn applies_to(&self, path: &str) -> bool {
        filter::is_session_path(&self.enable, &self.disable, path)
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable                  | Field            |
    /// |---------------------------|------------------|
    /// | `SESSION_DATABASE_URL`    | `database`       |
    /// | `SESSION_EXPIRES`         | `session_expires`|
    /// | `SESSION_COOKIE_EXPIRES`  | `cookie_expires` |
    /// | `SESSION_COOKIE_NAME`     | `cookie_name`    |
    /// | `SESSION_ENABLE_PATTERN`  | `enable`         |
    /// | `SESSION_DISABLE_PATTERN` | `disable`        |
    /// | `SESSION_COOKIE_SECURE`   | `secure`         |
    /// | `SESSION_COOKIE_SAMESITE` | `same_site`      |
    ///
    /// Unset or unparsable numbers fall back to the defaults. Pattern
    /// variables take `true`, `false` or a regex.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SessionError::Config`] if a pattern variable holds an
    /// invalid regex or `SESSION_COOKIE_SAMESITE` is not a known policy.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SessionConfig::from_env`] over an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SessionError::Config`] if a pattern variable holds an
    /// invalid regex or `SESSION_COOKIE_SAMESITE` is not a known policy.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let enable = match lookup("SESSION_ENABLE_PATTERN") {
            Some(value) => PathFilter::from_config_value(&value)?,
            None => defaults.enable,
        };
        let disable = match lookup("SESSION_DISABLE_PATTERN") {
            Some(value) => PathFilter::from_config_value(&value)?,
            None => defaults.disable,
        };

        let same_site = match lookup("SESSION_COOKIE_SAMESITE") {
            Some(value) => value.parse()?,
            None => defaults.same_site,
        };

        Ok(Self {
            database: lookup("SESSION_DATABASE_URL").unwrap_or(defaults.database),
            session_expires: lookup("SESSION_EXPIRES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.session_expires),
            cookie_expires: lookup("SESSION_COOKIE_EXPIRES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.cookie_expires),
            cookie_name: lookup("SESSION_COOKIE_NAME")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.cookie_name),
            enable,
            disable,
            http_only: defaults.http_only,
            secure: lookup("SESSION_COOKIE_SECURE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.secure),
            same_site,
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE_URL.to_string(),
            session_expires: DEFAULT_SESSION_EXPIRES,
            cookie_expires: 0,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            enable: PathFilter::Always(true),
            disable: PathFilter::static_assets(),
            http_only: true,
            secure: false,
            same_site: SameSitePolicy::Lax,
        }
    }
}
