//! ReviewGuard API Server
//!
//! Real-time fake review detection over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    REVIEWGUARD API                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────────────────┐     ┌─────────────────────────┐  │
//! │  │  Router (Axum)        │     │  Detector               │  │
//! │  │  /health  /predict    │────▶│  (loaded once, shared   │  │
//! │  │  /predict/batch  /    │     │   read-only)            │  │
//! │  └───────────────────────┘     └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod detector;
mod error;
mod handlers;
mod models;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use detector::{LinearDetector, ReviewDetector};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| config.default_log_filter().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("ReviewGuard API Server starting...");
    tracing::info!("Starting server on {}:{}", config.host, config.port);
    tracing::info!("Debug mode: {}", config.debug);
    if config.is_production() && config.debug {
        tracing::warn!("Debug logging is enabled in production");
    }

    // Load detector; the server still starts without one
    let detector: Option<Arc<dyn ReviewDetector>> = match LinearDetector::load(&config.model_path) {
        Ok(detector) => {
            tracing::info!(
                "ReviewGuard API initialized successfully (model {}, threshold {}, loaded at {})",
                detector.version(),
                detector.threshold(),
                detector.loaded_at()
            );
            Some(Arc::new(detector))
        }
        Err(e) => {
            tracing::error!("Failed to initialize detector: {}", e);
            None
        }
    };

    let addr = config.bind_addr()?;
    let state = AppState::new(detector, config);
    let app = create_router(state);

    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub detector: Option<Arc<dyn ReviewDetector>>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(detector: Option<Arc<dyn ReviewDetector>>, config: config::Config) -> Self {
        Self { detector, config }
    }

    /// The loaded detector, or 503 when startup failed to load one
    pub fn detector(&self) -> AppResult<&dyn ReviewDetector> {
        self.detector.as_deref().ok_or(AppError::ModelNotLoaded)
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home::index))
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::single))
        .route("/predict/batch", post(handlers::predict::batch))
        .layer(CatchPanicLayer::custom(handlers::handle_panic))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
