//! Registry API Server implementation
//!
//! HTTP REST API server using Axum. Exposes the import preview/submit flow,
//! exports, the template and date normalization.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::handlers;
use crate::backend::{Backend, HttpBackend};
use crate::config::RegistryConfig;

/// API Server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub version: String,
    pub config: RegistryConfig,
    pub backend: Arc<dyn Backend>,
}

impl AppState {
    pub fn new(config: RegistryConfig, backend: Arc<dyn Backend>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config,
            backend,
        }
    }
}

/// Routes and middleware, without binding a socket
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Core API endpoints
        .route("/api/v1/import/preview", post(handlers::import_preview))
        .route("/api/v1/import/submit", post(handlers::import_submit))
        .route("/api/v1/export", post(handlers::export))
        .route("/api/v1/template", post(handlers::template))
        .route("/api/v1/dates/normalize", post(handlers::normalize_dates))
        // State and middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig, registry: RegistryConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "worker_registry=info,tower_http=info".into()),
        )
        .init();

    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(&registry.backend));
    info!(base_url = %registry.backend.base_url, "backend configured");
    let state = Arc::new(AppState::new(registry, backend));
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Registry API Server starting on http://{}", addr);
    info!("   Endpoints: /api/v1/import/preview, /api/v1/import/submit, /api/v1/export, /api/v1/template, /api/v1/dates/normalize");
    info!("   Health: /health, Version: /version");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Registry API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}
