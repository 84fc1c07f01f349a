//! HTTP API
//!
//! Axum router exposing the label analysis endpoints.

pub mod routes;

use crate::adapters;
use crate::config::{AppConfig, DEFAULT_MAX_BODY_BYTES};
use crate::core::analyzer::LabelAnalyzer;
use crate::utils::error::{MedGuardError, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// 所有 handler 共用的唯讀狀態
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<LabelAnalyzer>,
    pub started_at: DateTime<Utc>,
    pub body_limit: usize,
}

impl AppState {
    pub fn new(analyzer: LabelAnalyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            started_at: Utc::now(),
            body_limit: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = adapters::build_http_client(config)?;
        let analyzer = LabelAnalyzer::from_config(
            config,
            adapters::build_llm(config, &client),
            adapters::build_lookup(config, &client),
            adapters::build_ocr(config, &client),
        );
        Ok(Self::new(analyzer).with_body_limit(config.max_body_bytes()))
    }
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/analyze", post(routes::analyze))
        .route("/check", post(routes::quick_check))
        .route("/interactions", post(routes::interactions))
        .route("/scan", post(routes::scan));

    Router::new()
        .route("/health", get(routes::health))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(state.body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server until the process receives Ctrl-C.
pub async fn run_server(config: &AppConfig) -> Result<()> {
    let state = AppState::from_config(config)?;
    tracing::info!(
        provider = state.analyzer.llm_provider().unwrap_or("none"),
        ocr = state.analyzer.ocr_enabled(),
        "Analyzer ready"
    );
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("🚀 MedGuard API listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(MedGuardError::IoError)?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
