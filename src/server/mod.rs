//! HTTP server exposing the rates and conversion API.

pub mod error;
pub mod routes;
pub mod seo;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::core::RateProvider;
use crate::core::config::AppConfig;
use crate::providers::ExchangeRateApiProvider;

/// Read-only state shared by all handlers.
pub struct AppState {
    pub provider: Arc<dyn RateProvider>,
    pub public_url: Option<String>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(provider: Arc<dyn RateProvider>, public_url: Option<String>) -> Self {
        Self {
            provider,
            public_url,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let provider = ExchangeRateApiProvider::new(&config.provider_base_url, &config.api_key)
            .context("Failed to build exchange rate client")?;
        Ok(Self::new(Arc::new(provider), config.public_url.clone()))
    }
}

/// Build the application router with the given state.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(seo::index))
        .route("/rates", get(routes::rates))
        .route("/convert", post(routes::convert))
        .route("/robots.txt", get(seo::robots_txt))
        .route("/sitemap.xml", get(seo::sitemap_xml))
        .route("/health", get(routes::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Binds `config.listen_addr` and serves until Ctrl-C.
pub async fn serve(config: &AppConfig) -> Result<()> {
    let state = Arc::new(AppState::from_config(config)?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "xrate listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
