//! Demo routes.

use anyhow::Context;
use axum::{extract::Path, routing::get, Router};
use redis_session_core::SessionStore;
use redis_session_web::{AppError, Session, WebResult};
use serde_json::Value;

/// All demo routes; the caller adds the session layer.
pub fn router<S: SessionStore>() -> Router {
    Router::new()
        .route("/", get(visit::<S>))
        .route("/login/:name", get(login::<S>))
        .route("/logout", get(logout::<S>))
        .route("/whoami", get(whoami::<S>))
        .route("/session", get(dump::<S>))
        .route("/fail", get(fail::<S>))
}

async fn visit<S: SessionStore>(session: Session<S>) -> String {
    let visits = session.get("visits").and_then(|v| v.as_i64()).unwrap_or(0) + 1;
    session.set("visits", visits);
    format!("visit #{visits}")
}

async fn login<S: SessionStore>(session: Session<S>, Path(name): Path<String>) -> String {
    session.set("user", name.clone());
    format!("logged in as {name}")
}

async fn logout<S: SessionStore>(session: Session<S>) -> &'static str {
    session.destroy();
    "logged out"
}

async fn whoami<S: SessionStore>(session: Session<S>) -> String {
    match session.get_or("user", Value::Null) {
        Value::String(name) => name,
        _ => "anonymous".to_string(),
    }
}

/// Everything stored in the session, as pretty JSON.
async fn dump<S: SessionStore>(session: Session<S>) -> WebResult<String> {
    let body = serde_json::to_string_pretty(&session.data())
        .context("failed to render session data")?;
    Ok(body)
}

/// Records the attempt in the session, then fails.
async fn fail<S: SessionStore>(session: Session<S>) -> WebResult<&'static str> {
    let attempts = session
        .get("failed_attempts")
        .and_then(|v| v.as_i64())
        .unwrap_or(0);
    session.set("failed_attempts", attempts + 1);
    Err(AppError::bad_request("This route always fails"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use redis_session_core::{mocks::MockSessionStore, SessionConfig, SessionId};
    use redis_session_testing::TestClient;
    use redis_session_web::SessionLayer;

    fn client_with(store: &MockSessionStore) -> TestClient {
        let sessions = SessionLayer::new(store.clone(), SessionConfig::default());
        TestClient::new(router::<MockSessionStore>().layer(sessions))
    }

    fn client() -> TestClient {
        client_with(&MockSessionStore::new())
    }

    #[tokio::test]
    async fn test_visit_counter_increments() {
        let mut client = client();

        assert_eq!(client.get("/").await.unwrap().body, "visit #1");
        assert_eq!(client.get("/").await.unwrap().body, "visit #2");
    }

    #[tokio::test]
    async fn test_login_logout() {
        let mut client = client();

        client.get("/login/alice").await.unwrap();
        assert_eq!(client.get("/whoami").await.unwrap().body, "alice");

        client.get("/logout").await.unwrap();
        assert_eq!(client.cookie("session"), Some(""));
        assert_eq!(client.get("/whoami").await.unwrap().body, "anonymous");
    }

    #[tokio::test]
    async fn test_session_dump() {
        let mut client = client();
        assert_eq!(client.get("/session").await.unwrap().body, "{}");

        client.get("/login/alice").await.unwrap();
        client.get("/").await.unwrap();

        let response = client.get("/session").await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.json().unwrap(),
            serde_json::json!({"user": "alice", "visits": 1})
        );
    }

    #[tokio::test]
    async fn test_failed_request_keeps_attempt_count() {
        let store = MockSessionStore::new();
        let mut client = client_with(&store);

        let first = client.get("/fail").await.unwrap();
        let second = client.get("/fail").await.unwrap();

        assert_eq!(first.status, StatusCode::BAD_REQUEST);
        assert_eq!(second.status, StatusCode::BAD_REQUEST);

        let id = SessionId::parse(client.cookie("session").unwrap()).unwrap();
        assert_eq!(
            store.raw(&id.store_key()).unwrap().as_deref(),
            Some(r#"{"failed_attempts":2}"#)
        );
    }
}
