//! Detector Module - review classification backend
//!
//! The HTTP layer only talks to [`ReviewDetector`]. Backends are swappable;
//! the bundled one is a linear scoring model over lexical and reviewer
//! features.

pub mod layout;
pub mod features;
pub mod linear;

use serde_json::Value;
use thiserror::Error;

use crate::models::ReviewInput;

pub use linear::LinearDetector;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// A loaded classifier, shared read-only by all requests.
pub trait ReviewDetector: Send + Sync {
    /// Classify one review. The returned JSON is sent to the client as-is.
    fn predict(&self, input: &ReviewInput) -> Result<Value, DetectorError>;

    fn version(&self) -> &str {
        "unknown"
    }
}
