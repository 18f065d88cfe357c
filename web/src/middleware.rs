//! Axum middleware driving the session lifecycle.
//!
//! # Flow
//!
//! 1. **Filter** the request path; disabled paths pass straight through
//! 2. **Resolve** the id from the session cookie, or mint a new one
//! 3. **Load** the stored data for a cookie-supplied id; the handler does not
//!    run until this finishes
//! 4. **Attach** a [`Session`] to the request extensions
//! 5. **Run** the handler
//! 6. **Commit** if the session changed: set or clear the cookie when the id
//!    differs from the request's, then save
//!
//! Step 6 runs for every response the inner service produces, error
//! responses included, and also when the inner service itself fails.
//!
//! # Example
//!
//! ```ignore
//! use axum::{routing::get, Router};
//! use redis_session_core::{stores::RedisSessionStore, SessionConfig};
//! use redis_session_web::{Session, SessionLayer};
//!
//! let store = RedisSessionStore::new("redis://127.0.0.1:6379").await?;
//! let sessions = SessionLayer::new(store, SessionConfig::default());
//!
//! let app = Router::new()
//!     .route("/", get(|session: Session| async move { session.set("seen", true); "hi" }))
//!     .layer(sessions.clone());
//!
//! axum::serve(listener, app).await?;
//! sessions.shutdown().await?;
//! ```

use crate::cookies;
use crate::error::AppError;
use crate::extractors::Session;
use axum::{
    extract::Request,
    http::{header::SET_COOKIE, HeaderValue},
    response::{IntoResponse, Response},
};
use redis_session_core::{
    Clock, Result, SessionConfig, SessionError, SessionId, SessionRecord, SessionStore,
    SystemClock,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// State shared by the layer and every middleware instance.
struct Shared<S> {
    store: S,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
}

/// Layer adding server-side sessions to every eligible request.
///
/// Owns the store handle for the application's lifetime; call
/// [`SessionLayer::shutdown`] once the server has stopped.
pub struct SessionLayer<S: SessionStore> {
    shared: Arc<Shared<S>>,
}

impl<S: SessionStore> Clone for SessionLayer<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: SessionStore> SessionLayer<S> {
    /// Create a session layer over `store`.
    #[must_use]
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                config,
                clock: Arc::new(SystemClock),
            }),
        }
    }

    /// Replace the clock used for cookie expiry.
    #[must_use]
    pub fn with_clock(self, clock: impl Clock + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                store: self.shared.store.clone(),
                config: self.shared.config.clone(),
                clock: Arc::new(clock),
            }),
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    /// The shared store handle.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.shared.store
    }

    /// Release the store connection. Call after the server has stopped.
    ///
    /// # Errors
    ///
    /// Returns error if the store could not be closed cleanly.
    pub async fn shutdown(&self) -> Result<()> {
        self.shared.store.close().await
    }
}

impl<S: SessionStore, I> Layer<I> for SessionLayer<S> {
    type Service = SessionMiddleware<S, I>;

    fn layer(&self, inner: I) -> Self::Service {
        SessionMiddleware {
            inner,
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Middleware service created by [`SessionLayer`].
pub struct SessionMiddleware<S: SessionStore, I> {
    inner: I,
    shared: Arc<Shared<S>>,
}

impl<S: SessionStore, I: Clone> Clone for SessionMiddleware<S, I> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S, I> Service<Request> for SessionMiddleware<S, I>
where
    S: SessionStore,
    I: Service<Request, Response = Response> + Clone + Send + 'static,
    I::Future: Send + 'static,
    I::Error: Send + 'static,
{
    type Response = Response;
    type Error = I::Error;
    type Future = Pin<Box<dyn Future<Output = std::result::Result<Response, I::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        if !self.shared.config.applies_to(req.uri().path()) {
            return Box::pin(self.inner.call(req));
        }

        // Use the instance poll_ready was called on; leave a fresh clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let shared = Arc::clone(&self.shared);

        Box::pin(async move {
            let incoming =
                cookies::session_id_from_headers(req.headers(), &shared.config.cookie_name);

            let (session, load_error) = shared.open(incoming.clone()).await;

            if let Some(error) = load_error {
                let mut response = AppError::from(error).into_response();
                response.extensions_mut().insert(session.clone());
                shared.commit(&session, incoming.as_ref(), Some(&mut response)).await;
                return Ok(response);
            }

            req.extensions_mut().insert(session.clone());

            match inner.call(req).await {
                Ok(mut response) => {
                    shared.commit(&session, incoming.as_ref(), Some(&mut response)).await;
                    Ok(response)
                }
                Err(error) => {
                    shared.commit(&session, incoming.as_ref(), None).await;
                    Err(error)
                }
            }
        })
    }
}

impl<S: SessionStore> Shared<S> {
    /// Build the request's session, loading it when the id came from a cookie.
    ///
    /// Returns the load failure alongside the session, which stays usable
    /// (empty, with the resolved id) for error handling.
    async fn open(&self, incoming: Option<SessionId>) -> (Session<S>, Option<SessionError>) {
        let Some(id) = incoming else {
            let record = SessionRecord::new(
                SessionId::generate(),
                self.store.clone(),
                self.config.session_expires,
            );
            return (Session::new(record), None);
        };

        let mut record = SessionRecord::new(id, self.store.clone(), self.config.session_expires);

        match record.load().await {
            Ok(()) => {
                metrics::counter!("sessions_loaded_total").increment(1);
                (Session::new(record), None)
            }
            Err(SessionError::Deserialization(reason)) => {
                metrics::counter!("session_load_failures_total").increment(1);
                tracing::warn!(
                    session_id = %record.id(),
                    reason = %reason,
                    "Stored session is corrupted; continuing with an empty session"
                );
                (Session::new(record), None)
            }
            Err(error) => {
                metrics::counter!("session_load_failures_total").increment(1);
                tracing::error!(
                    session_id = %record.id(),
                    error = %error,
                    "Failed to load session"
                );
                (Session::new(record), Some(error))
            }
        }
    }

    /// Set the cookie and persist, if the session changed.
    async fn commit(
        &self,
        session: &Session<S>,
        incoming: Option<&SessionId>,
        response: Option<&mut Response>,
    ) {
        let Some(record) = session.changed_snapshot() else {
            return;
        };

        if let Some(response) = response {
            if let Some(cookie) =
                cookies::response_cookie(&record, incoming, &self.config, self.clock.now())
            {
                match HeaderValue::from_str(&cookie.to_string()) {
                    Ok(value) => {
                        response.headers_mut().append(SET_COOKIE, value);
                    }
                    Err(error) => tracing::error!(
                        error = %error,
                        "Session cookie is not a valid header value"
                    ),
                }
            }
        }

        let created = incoming != Some(record.id());
        persist(record, created).await;
    }
}

/// Save on a spawned task that also reports the outcome, so neither the
/// write nor its logging depends on the response future being polled.
///
/// `created` marks the first save under a freshly minted id.
async fn persist<S: SessionStore>(record: SessionRecord<S>, created: bool) {
    let session_id = record.id().clone();

    let write = tokio::spawn(async move {
        match record.save().await {
            Ok(()) => {
                metrics::counter!("sessions_saved_total").increment(1);
                if created {
                    metrics::counter!("sessions_created_total").increment(1);
                    tracing::debug!(session_id = %record.id(), "Created session");
                }
            }
            Err(error) => {
                metrics::counter!("session_save_failures_total").increment(1);
                tracing::error!(
                    session_id = %record.id(),
                    error = %error,
                    "Failed to save session"
                );
            }
        }
    });

    if let Err(error) = write.await {
        metrics::counter!("session_save_failures_total").increment(1);
        tracing::error!(
            session_id = %session_id,
            error = %error,
            "Session save task did not complete"
        );
    }
}
