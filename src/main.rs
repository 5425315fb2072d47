//! PPE Sentinel
//!
//! HTTP service for PPE (personal protective equipment) compliance checks.
//! A client POSTs a base64-encoded image; an ONNX PPE model detects people
//! and equipment, the labels are normalized into a fixed vocabulary, and a
//! compliance policy decides approval and enumerates the missing items.
//!
//! ```text
//! client ──POST /api/analyze──▶ handler ──▶ YoloDetector (ort)
//!                                  │              │
//!                                  ▼              ▼
//!                           ComplianceResult ◀─ label normalization
//!                                               + compliance policy
//! ```

mod compliance;
mod config;
mod detector;
mod error;
mod handlers;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use detector::{yolo::YoloDetector, Detector};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ppe_sentinel=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("PPE Sentinel starting...");

    // A failed model load is not fatal: the service still answers health
    // checks and rejects analysis requests until the model is fixed.
    let detector: Option<Arc<dyn Detector>> = match YoloDetector::load(&config.model_path) {
        Ok(d) => Some(Arc::new(d)),
        Err(e) => {
            tracing::error!("failed to initialize detector: {}", e);
            None
        }
    };

    let state = AppState { detector };
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub detector: Option<Arc<dyn Detector>>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::check))
        .route("/api/analyze", post(handlers::analyze::analyze))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
