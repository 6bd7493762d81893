//! Streamify Server Library
//!
//! REST backend for the Streamify language-exchange app: accounts and
//! onboarding, the friend graph, and chat credentials for the external
//! chat provider.

pub mod chat;
pub mod core;
pub mod friends;

use axum::Router;
use http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::core::{AppState, Db, ServerConfig};

/// Full HTTP application: API routes plus CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    crate::core::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        // Already set, ignore
    }
}

pub async fn run() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    info!("=== Streamify Server ===");

    let config = ServerConfig::from_env()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let db = Db::connect(&config.database_url).await?;
    info!("Database ready at {}", config.database_url);
    info!("CORS origins: {}", config.allowed_origins.join(", "));

    let state = AppState::from_config(config, db.clone());
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
