//! Linear Detector - logistic scoring over the feature layout
//!
//! Weights come from a JSON file:
//!
//! ```json
//! {
//!   "version": "2024.06",
//!   "bias": -2.1,
//!   "threshold": 0.5,
//!   "weights": { "promo_density": 3.2, "single_review_account": 1.4 }
//! }
//! ```
//!
//! Features missing from `weights` get weight 0. Unknown names are a load
//! error so a model trained on a different layout never loads silently.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use super::features::extract;
use super::layout::{feature_index, FEATURE_COUNT, FEATURE_LAYOUT};
use super::{DetectorError, ReviewDetector};
use crate::models::ReviewInput;

const TOP_SIGNALS: usize = 3;
const MEDIUM_RISK: f32 = 0.4;
const HIGH_RISK: f32 = 0.7;

/// On-disk model description
#[derive(Debug, Clone, Deserialize)]
pub struct ModelWeights {
    pub version: String,
    pub bias: f32,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    pub weights: BTreeMap<String, f32>,
}

fn default_threshold() -> f32 {
    0.5
}

#[derive(Debug, Clone)]
pub struct LinearDetector {
    weights: [f32; FEATURE_COUNT],
    bias: f32,
    threshold: f32,
    version: String,
    loaded_at: DateTime<Utc>,
}

impl LinearDetector {
    /// Load weights from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DetectorError> {
        let path = path.as_ref();
        tracing::info!("Loading detector model from: {}", path.display());

        let bytes = std::fs::read(path)
            .map_err(|e| DetectorError::ModelLoad(format!("{}: {}", path.display(), e)))?;

        let model: ModelWeights = serde_json::from_slice(&bytes)
            .map_err(|e| DetectorError::ModelLoad(format!("{}: {}", path.display(), e)))?;

        let digest = format!("{:x}", Sha256::digest(&bytes));
        let mut detector = Self::from_weights(model)?;
        detector.version = format!("{}+{}", detector.version, &digest[..12]);

        tracing::info!("Detector model loaded (version {})", detector.version);
        Ok(detector)
    }

    pub fn from_weights(model: ModelWeights) -> Result<Self, DetectorError> {
        if !(model.threshold > 0.0 && model.threshold < 1.0) {
            return Err(DetectorError::ModelLoad(format!(
                "threshold must be in (0, 1), got {}",
                model.threshold
            )));
        }
        if !model.bias.is_finite() {
            return Err(DetectorError::ModelLoad("bias must be finite".to_string()));
        }

        let mut weights = [0.0f32; FEATURE_COUNT];
        for (name, weight) in &model.weights {
            let index = feature_index(name)
                .ok_or_else(|| DetectorError::ModelLoad(format!("unknown feature: {}", name)))?;
            if !weight.is_finite() {
                return Err(DetectorError::ModelLoad(format!("weight for {} must be finite", name)));
            }
            weights[index] = *weight;
        }

        Ok(Self {
            weights,
            bias: model.bias,
            threshold: model.threshold,
            version: model.version,
            loaded_at: Utc::now(),
        })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    fn check_input(input: &ReviewInput) -> Result<(), DetectorError> {
        if input.review_text.trim().is_empty() {
            return Err(DetectorError::InvalidInput("review_text is empty".to_string()));
        }
        if !input.rating.is_finite() || !(1.0..=5.0).contains(&input.rating) {
            return Err(DetectorError::InvalidInput(format!("rating out of range: {}", input.rating)));
        }
        if input.reviewer_total_reviews < 1 {
            return Err(DetectorError::InvalidInput(format!(
                "reviewer_total_reviews must be at least 1, got {}",
                input.reviewer_total_reviews
            )));
        }
        if let Some(avg) = input.reviewer_avg_rating {
            if !avg.is_finite() || !(1.0..=5.0).contains(&avg) {
                return Err(DetectorError::InvalidInput(format!(
                    "reviewer_avg_rating out of range: {}",
                    avg
                )));
            }
        }
        Ok(())
    }
}

impl ReviewDetector for LinearDetector {
    fn predict(&self, input: &ReviewInput) -> Result<Value, DetectorError> {
        Self::check_input(input)?;

        let features = extract(input);
        tracing::trace!(features = ?features.named().collect::<Vec<_>>(), "Extracted review features");
        let contributions: Vec<f32> = features
            .values
            .iter()
            .zip(self.weights.iter())
            .map(|(x, w)| x * w)
            .collect();

        let logit = self.bias + contributions.iter().sum::<f32>();
        let probability = 1.0 / (1.0 + (-logit).exp());
        if !probability.is_finite() {
            return Err(DetectorError::Inference(format!("non-finite score for logit {}", logit)));
        }

        let is_fake = probability >= self.threshold;
        let confidence = probability.max(1.0 - probability);
        let risk_level = if probability >= HIGH_RISK {
            "high"
        } else if probability >= MEDIUM_RISK {
            "medium"
        } else {
            "low"
        };

        // Largest positive contributions first
        let mut ranked: Vec<(usize, f32)> = contributions
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, c)| *c > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        let top_signals: Vec<&str> = ranked
            .iter()
            .take(TOP_SIGNALS)
            .map(|(i, _)| FEATURE_LAYOUT[*i])
            .collect();

        Ok(json!({
            "prediction": if is_fake { "fake" } else { "genuine" },
            "is_fake": is_fake,
            "fake_probability": probability,
            "confidence": confidence,
            "risk_level": risk_level,
            "top_signals": top_signals,
            "model_version": self.version,
        }))
    }

    fn version(&self) -> &str {
        &self.version
    }
}
