//! Browser-like test client for Axum routers.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use cookie::Cookie;
use std::collections::BTreeMap;
use tower::ServiceExt;

/// Response captured by [`TestClient`].
#[derive(Debug)]
pub struct TestResponse {
    /// Response status.
    pub status: StatusCode,
    /// Parsed `Set-Cookie` headers, in order.
    pub set_cookies: Vec<Cookie<'static>>,
    /// Response body as text.
    pub body: String,
}

impl TestResponse {
    /// The `Set-Cookie` for `name`, if the response set one.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&Cookie<'static>> {
        self.set_cookies.iter().find(|c| c.name() == name)
    }

    /// Parse the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns error if the body is not valid JSON.
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.body)
    }
}

/// Sends requests to a router and keeps cookies between them.
///
/// Cookies from `Set-Cookie` are stored as given, empty values included,
/// and replayed in a single `Cookie` header on every later request.
#[derive(Debug, Clone)]
pub struct TestClient {
    app: Router,
    jar: BTreeMap<String, String>,
}

impl TestClient {
    /// Create a client with an empty cookie jar.
    #[must_use]
    pub const fn new(app: Router) -> Self {
        Self {
            app,
            jar: BTreeMap::new(),
        }
    }

    /// Issue a `GET` request.
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be built or the body cannot be read.
    pub async fn get(&mut self, path: &str) -> anyhow::Result<TestResponse> {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(cookie_header) = self.cookie_header() {
            builder = builder.header(header::COOKIE, cookie_header);
        }
        let request = builder.body(Body::empty())?;

        let response = match self.app.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };

        let status = response.status();
        let set_cookies: Vec<Cookie<'static>> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| Cookie::parse(value.to_string()).ok())
            .collect();

        for cookie in &set_cookies {
            self.jar
                .insert(cookie.name().to_string(), cookie.value().to_string());
        }

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = String::from_utf8(bytes.to_vec())?;

        Ok(TestResponse {
            status,
            set_cookies,
            body,
        })
    }

    /// Current value of a cookie in the jar.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.jar.get(name).map(String::as_str)
    }

    /// Put a cookie in the jar, as if a server had set it.
    pub fn set_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.jar.insert(name.into(), value.into());
    }

    /// Forget all cookies.
    pub fn clear_cookies(&mut self) {
        self.jar.clear();
    }

    fn cookie_header(&self) -> Option<String> {
        if self.jar.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .jar
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        Some(pairs.join("; "))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, response::IntoResponse, routing::get};

    fn echo_app() -> Router {
        Router::new()
            .route(
                "/set",
                get(|| async { ([(header::SET_COOKIE, "token=abc; Path=/")], "set").into_response() }),
            )
            .route(
                "/echo",
                get(|headers: HeaderMap| async move {
                    headers
                        .get(header::COOKIE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string()
                }),
            )
    }

    #[tokio::test]
    async fn test_cookies_are_replayed() {
        let mut client = TestClient::new(echo_app());

        let first = client.get("/set").await.unwrap();
        assert_eq!(first.cookie("token").map(Cookie::value), Some("abc"));

        let second = client.get("/echo").await.unwrap();
        assert_eq!(second.body, "token=abc");
    }

    #[tokio::test]
    async fn test_manual_cookies() {
        let mut client = TestClient::new(echo_app());
        client.set_cookie("session", "unknown");

        assert_eq!(client.get("/echo").await.unwrap().body, "session=unknown");

        client.clear_cookies();
        assert_eq!(client.get("/echo").await.unwrap().body, "");
    }
}
