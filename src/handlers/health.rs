//! Health check handler

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    model_version: String,
    version: &'static str,
    environment: String,
    timestamp: i64,
}

#[derive(Serialize)]
pub struct UnhealthyResponse {
    status: &'static str,
    message: &'static str,
}

pub async fn check(State(state): State<AppState>) -> Response {
    match state.detector.as_deref() {
        Some(detector) => Json(HealthResponse {
            status: "healthy",
            model_loaded: true,
            model_version: detector.version().to_string(),
            version: env!("CARGO_PKG_VERSION"),
            environment: state.config.environment.clone(),
            timestamp: chrono::Utc::now().timestamp(),
        })
        .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(UnhealthyResponse {
                status: "unhealthy",
                message: "Model not loaded",
            }),
        )
            .into_response(),
    }
}
