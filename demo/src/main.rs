//! Session demo server
//!
//! Small Axum application whose state lives in Redis-backed sessions.
//!
//! # Usage
//!
//! ```bash
//! # Start Redis
//! docker run --rm -p 6379:6379 redis:7
//!
//! # Run server (reads .env if present)
//! SESSION_COOKIE_EXPIRES=3600 cargo run --bin session-demo
//!
//! curl -c jar -b jar localhost:3000/login/alice
//! curl -c jar -b jar localhost:3000/whoami
//! ```

mod routes;

use anyhow::Context;
use redis_session_core::{stores::RedisSessionStore, SessionConfig};
use redis_session_web::SessionLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,redis_session_core=debug,redis_session_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SessionConfig::from_env().context("invalid session configuration")?;
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    info!(
        database = %config.database,
        session_expires = config.session_expires,
        cookie_expires = config.cookie_expires,
        cookie_name = %config.cookie_name,
        "Configuration loaded"
    );

    let store = RedisSessionStore::new(&config.database)
        .await
        .context("failed to connect to session store")?;
    let sessions = SessionLayer::new(store, config);

    let app = routes::router::<RedisSessionStore>().layer(sessions.clone());

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped, closing session store");
    if let Err(error) = sessions.shutdown().await {
        warn!(error = %error, "Session store did not close cleanly");
    }

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            warn!(error = %error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(error = %error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        () = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
