//! Prediction handlers

use std::panic::{catch_unwind, AssertUnwindSafe};

use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

use crate::detector::{DetectorError, ReviewDetector};
use crate::models::{BatchItemResult, BatchPredictResponse, ReviewInput};
use crate::{AppError, AppResult, AppState};

/// Classify a single review
pub async fn single(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let detector = state.detector()?;

    // An empty body is treated like a missing one
    let data: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::InternalError(format!("Failed to parse request body: {}", e)))?
    };

    let input = ReviewInput::from_json(&data)?;

    match detector.predict(&input) {
        Ok(result) => Ok(Json(result)),
        Err(DetectorError::InvalidInput(msg)) => Err(AppError::ValidationError(msg)),
        Err(e) => Err(AppError::InternalError(e.to_string())),
    }
}

/// Classify a list of reviews, isolating per-item failures
pub async fn batch(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<BatchPredictResponse>> {
    let detector = state.detector()?;

    let data: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::InternalError(format!("Failed to parse batch body: {}", e)))?;

    let Value::Object(obj) = &data else {
        return Err(AppError::InternalError("Batch body is not a JSON object".to_string()));
    };

    let reviews: &[Value] = match obj.get("reviews") {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items,
        Some(_) => return Err(AppError::ValidationError("reviews must be a list".to_string())),
    };

    let results: Vec<BatchItemResult> = reviews
        .iter()
        .enumerate()
        .map(|(index, item)| predict_item(detector, index, item))
        .collect();

    let failed = results.iter().filter(|r| r.is_failed()).count();
    tracing::debug!("Batch processed: {} reviews, {} invalid", results.len(), failed);

    Ok(Json(BatchPredictResponse { results }))
}

fn predict_item(detector: &dyn ReviewDetector, index: usize, item: &Value) -> BatchItemResult {
    let input = match ReviewInput::from_json(item) {
        Ok(input) => input,
        Err(e) => {
            tracing::debug!("Batch item {} rejected: {}", index, e);
            return BatchItemResult::invalid();
        }
    };

    // A panicking item must not take the rest of the batch down with it
    let outcome = match catch_unwind(AssertUnwindSafe(|| detector.predict(&input))) {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::error!("Batch item {} panicked in detector", index);
            return BatchItemResult::invalid();
        }
    };

    match outcome {
        Ok(result) => BatchItemResult::Prediction(result),
        Err(DetectorError::InvalidInput(msg)) => {
            tracing::debug!("Batch item {} rejected by detector: {}", index, msg);
            BatchItemResult::invalid()
        }
        Err(e) => {
            tracing::warn!("Batch item {} failed: {}", index, e);
            BatchItemResult::invalid()
        }
    }
}
