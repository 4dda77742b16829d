//! # forum-web
//!
//! The forum's HTTP surface: an axum router over [`forum_db::service::ForumService`],
//! plus server startup and shutdown. The `forum` binary in this crate wraps
//! [`serve`] with configuration loading and logging.

pub mod auth;
pub mod error;
mod routes;
pub mod state;

use anyhow::Context;
use axum::Router;
use forum_config::ForumConfig;
use forum_db::service::ForumService;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use state::AppState;

/// The full application: routes, request tracing, and the body size limit.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(state.config.server.body_limit_bytes));

    routes::routes().layer(middleware).with_state(state)
}

/// Open the store named in `config` and build handler state around it.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated.
pub async fn build_state(config: ForumConfig) -> anyhow::Result<AppState> {
    let ttl = chrono::Duration::hours(i64::from(config.auth.session_ttl_hours));
    let forum = ForumService::new_local(&config.database.path)
        .await
        .with_context(|| format!("failed to open database '{}'", config.database.path))?
        .with_session_ttl(ttl);
    Ok(AppState::new(forum, config))
}

/// Bind the configured address and serve until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the database cannot be opened, the address cannot be
/// bound, or the server fails.
pub async fn serve(config: ForumConfig) -> anyhow::Result<()> {
    let address = config.server.address();
    if !config.server.is_localhost() {
        warn!(%address, "listening on a non-local address");
    }
    if config.database.is_in_memory() {
        warn!("using an in-memory database; nothing will persist");
    }

    let state = build_state(config).await?;
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(address = %listener.local_addr()?, "forum listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("received SIGTERM, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
