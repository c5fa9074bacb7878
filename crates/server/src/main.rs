//! mantel server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use mantel_api::{AppState, auth_middleware, router as api_router};
use mantel_common::Config;
use mantel_core::Services;
use mantel_db::Repositories;
use mantel_db::deadline::Deadline;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mantel=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting mantel server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = mantel_db::init(&config).await?;
    info!(
        query_timeout_ms = config.database.query_timeout_ms,
        statement_timeout_ms = config.database.statement_timeout_ms(),
        "Connected to database"
    );

    // Run migrations
    info!("Running database migrations...");
    mantel_db::migrate(&db).await?;
    info!("Migrations completed");

    let repos = Repositories::new(Arc::new(db), Deadline::from_config(&config.database));
    let state = AppState::new(Services::new(repos), config.pagination.into());

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn(auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
