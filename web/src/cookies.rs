//! Session cookie parsing and the response-cookie policy.
//!
//! # Policy
//!
//! After a changed session is handled:
//!
//! | record id vs. request cookie | record empty | `Set-Cookie`                      |
//! |------------------------------|--------------|-----------------------------------|
//! | same                         | any          | none (browser already has it)     |
//! | different / no cookie        | yes          | `name=` (clears the cookie)       |
//! | different / no cookie        | no           | `name=<id>`, `Expires` if configured |
//!
//! The cookie path is always `/`.

use chrono::{DateTime, Utc};
use cookie::{Cookie, SameSite};
use http::{header::COOKIE, HeaderMap};
use redis_session_core::{SameSitePolicy, SessionConfig, SessionId, SessionRecord, SessionStore};
use time::OffsetDateTime;

/// Path scope of the session cookie.
pub const COOKIE_PATH: &str = "/";

/// Read and validate the session id from the request's `Cookie` headers.
///
/// The first well-formed value wins when the name repeats, e.g. a stale
/// `session=` scoped to another path. Missing and malformed values yield
/// `None`; a malformed cookie is never an error, it just means a new session
/// will be minted.
#[must_use]
pub fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| Cookie::split_parse(header))
        .filter_map(Result::ok)
        .filter(|cookie| cookie.name() == cookie_name)
        .find_map(|cookie| match SessionId::parse(cookie.value()) {
            Ok(id) => Some(id),
            Err(error) => {
                tracing::debug!(
                    cookie_name = %cookie_name,
                    error = %error,
                    "Ignoring malformed session cookie"
                );
                None
            }
        })
}

/// Decide the `Set-Cookie` for a changed record.
///
/// Returns `None` when the request already carried the record's id.
#[must_use]
pub fn response_cookie<S: SessionStore>(
    record: &SessionRecord<S>,
    incoming: Option<&SessionId>,
    config: &SessionConfig,
    now: DateTime<Utc>,
) -> Option<Cookie<'static>> {
    if incoming == Some(record.id()) {
        return None;
    }

    if record.empty() {
        return Some(build_cookie(config, String::new(), None));
    }

    let expires = match config.cookie_expires {
        0 => None,
        seconds => cookie_expiry(now, seconds),
    };

    Some(build_cookie(config, record.id().to_string(), expires))
}

/// Build the session cookie with the configured attributes.
#[must_use]
pub fn build_cookie(
    config: &SessionConfig,
    value: String,
    expires: Option<OffsetDateTime>,
) -> Cookie<'static> {
    let mut builder = Cookie::build((config.cookie_name.clone(), value))
        .path(COOKIE_PATH)
        .http_only(config.http_only)
        .secure(config.secure)
        .same_site(same_site(config.same_site));

    if let Some(at) = expires {
        builder = builder.expires(at);
    }

    builder.build()
}

/// Absolute expiry `seconds` after `now`, or `None` if it overflows.
fn cookie_expiry(now: DateTime<Utc>, seconds: u64) -> Option<OffsetDateTime> {
    let seconds = i64::try_from(seconds).ok()?;
    let at = now.checked_add_signed(chrono::Duration::try_seconds(seconds)?)?;

    match OffsetDateTime::from_unix_timestamp(at.timestamp()) {
        Ok(at) => Some(at),
        Err(error) => {
            tracing::warn!(error = %error, "Cookie expiry out of range; using a session cookie");
            None
        }
    }
}

const fn same_site(policy: SameSitePolicy) -> SameSite {
    match policy {
        SameSitePolicy::Strict => SameSite::Strict,
        SameSitePolicy::Lax => SameSite::Lax,
        SameSitePolicy::None => SameSite::None,
    }
}
