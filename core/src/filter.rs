//! Path filters deciding which requests get a session.

use crate::error::{Result, SessionError};
use regex::Regex;
use std::sync::LazyLock;

/// Paths skipped by default: static assets never need session state.
pub const STATIC_ASSET_PATTERN: &str =
    r"\.(css|js|jpg|png|gif|svg|txt|pdf|xls|doc|docx|zip|tar|gz|xml)$";

#[allow(clippy::expect_used)] // Hardcoded pattern, always compiles
static STATIC_ASSETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(STATIC_ASSET_PATTERN).expect("static asset pattern compiles"));

/// Enable/disable predicate over request paths.
#[derive(Debug, Clone)]
pub enum PathFilter {
    /// Matches every path (`true`) or none (`false`).
    Always(bool),

    /// Matches paths where the regex finds a match.
    Matches(Regex),
}

impl PathFilter {
    /// Compile a regex filter.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if the pattern is not a valid regex.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self::Matches)
            .map_err(|e| SessionError::Config(format!("invalid path pattern {pattern:?}: {e}")))
    }

    /// The default disable filter: common static-asset extensions.
    #[must_use]
    pub fn static_assets() -> Self {
        Self::Matches(STATIC_ASSETS.clone())
    }

    /// Parse a configuration value: `true`/`false` or a regex.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if the value is neither a boolean
    /// nor a valid regex.
    pub fn from_config_value(value: &str) -> Result<Self> {
        match value.trim() {
            "true" => Ok(Self::Always(true)),
            "false" => Ok(Self::Always(false)),
            pattern => Self::pattern(pattern),
        }
    }

    /// Test the filter against a request path.
    ///
    /// # Examples
    ///
    /// ```
    /// use redis_session_core::PathFilter;
    ///
    /// assert!(PathFilter::Always(true).matches("/anything"));
    /// assert!(PathFilter::static_assets().matches("/img/logo.png"));
    /// assert!(!PathFilter::static_assets().matches("/account"));
    /// ```
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Always(enabled) => *enabled,
            Self::Matches(regex) => regex.is_match(path),
        }
    }
}

/// A path is session-eligible iff `enable` matches and `disable` does not.
#[must_use]
pub fn is_session_path(enable: &PathFilter, disable: &PathFilter, path: &str) -> bool {
    enable.matches(path) && !disable.matches(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters() {
        let enable = PathFilter::Always(true);
        let disable = PathFilter::static_assets();

        assert!(is_session_path(&enable, &disable, "/"));
        assert!(is_session_path(&enable, &disable, "/test1"));
        assert!(is_session_path(&enable, &disable, "/docs/readme"));

        for path in ["/test1.jpg", "/a.css", "/app.js", "/report.docx", "/feed.xml", "/b.tar.gz"] {
            assert!(!is_session_path(&enable, &disable, path), "{path} should be skipped");
        }
    }

    #[test]
    fn test_extension_must_be_suffix() {
        let disable = PathFilter::static_assets();
        assert!(!disable.matches("/jpg"));
        assert!(!disable.matches("/file.jpg/edit"));
        assert!(!disable.matches("/style.cssx"));
    }

    #[test]
    fn test_enable_pattern_restricts_paths() {
        let enable = PathFilter::pattern("^/app/").unwrap();
        let disable = PathFilter::Always(false);

        assert!(is_session_path(&enable, &disable, "/app/home"));
        assert!(!is_session_path(&enable, &disable, "/api/health"));
    }

    #[test]
    fn test_disable_always_wins() {
        let enable = PathFilter::Always(true);
        let disable = PathFilter::Always(true);
        assert!(!is_session_path(&enable, &disable, "/"));
    }

    #[test]
    fn test_config_values() {
        assert!(matches!(PathFilter::from_config_value("true"), Ok(PathFilter::Always(true))));
        assert!(matches!(PathFilter::from_config_value(" false "), Ok(PathFilter::Always(false))));
        assert!(matches!(PathFilter::from_config_value(r"\.ico$"), Ok(PathFilter::Matches(_))));
        assert!(matches!(
            PathFilter::from_config_value("(unclosed"),
            Err(SessionError::Config(_))
        ));
    }
}
