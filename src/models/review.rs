//! Review request/response model

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use validator::Validate;

pub const DEFAULT_REVIEWER_TOTAL_REVIEWS: i64 = 1;

/// Placeholder placed at the position of a batch item that failed
pub const INVALID_REVIEW_DATA: &str = "Invalid review data";

/// One review to classify, after shape validation and rating coercion
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ReviewInput {
    pub review_text: String,

    #[validate(range(min = 1.0, max = 5.0))]
    pub rating: f64,

    pub reviewer_total_reviews: i64,

    pub reviewer_avg_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReviewInputError {
    #[error("No JSON data provided")]
    NoData,

    #[error("Missing review_text or rating")]
    MissingFields,

    #[error("review_text must be a string")]
    InvalidText,

    #[error("Rating must be a number")]
    NonNumericRating,

    #[error("Rating must be between 1 and 5")]
    RatingOutOfRange,

    #[error("{0} must be a number")]
    InvalidReviewerStats(&'static str),
}

impl ReviewInput {
    pub fn new(review_text: impl Into<String>, rating: f64) -> Self {
        Self {
            review_text: review_text.into(),
            rating,
            reviewer_total_reviews: DEFAULT_REVIEWER_TOTAL_REVIEWS,
            reviewer_avg_rating: None,
        }
    }

    /// Build a review from an untyped JSON body.
    ///
    /// `null` and `{}` count as no data. Keys other than the four known ones
    /// are ignored. `null` reviewer stats fall back to their defaults.
    pub fn from_json(value: &Value) -> Result<Self, ReviewInputError> {
        let obj = match value {
            Value::Null => return Err(ReviewInputError::NoData),
            Value::Object(obj) if obj.is_empty() => return Err(ReviewInputError::NoData),
            Value::Object(obj) => obj,
            _ => return Err(ReviewInputError::MissingFields),
        };

        let (Some(text), Some(rating)) = (obj.get("review_text"), obj.get("rating")) else {
            return Err(ReviewInputError::MissingFields);
        };

        let review_text = text
            .as_str()
            .ok_or(ReviewInputError::InvalidText)?
            .to_string();

        let rating = coerce_number(rating).ok_or(ReviewInputError::NonNumericRating)?;
        if !rating.is_finite() {
            return Err(ReviewInputError::RatingOutOfRange);
        }

        let mut input = Self::new(review_text, rating);
        input.reviewer_total_reviews = reviewer_total_reviews(obj)?;
        input.reviewer_avg_rating = reviewer_avg_rating(obj)?;

        input
            .validate()
            .map_err(|_| ReviewInputError::RatingOutOfRange)?;

        Ok(input)
    }
}

/// Numbers pass through and numeric strings are parsed. Booleans are rejected.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn reviewer_total_reviews(obj: &Map<String, Value>) -> Result<i64, ReviewInputError> {
    const FIELD: &str = "reviewer_total_reviews";

    match obj.get(FIELD) {
        None | Some(Value::Null) => Ok(DEFAULT_REVIEWER_TOTAL_REVIEWS),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or(ReviewInputError::InvalidReviewerStats(FIELD)),
        Some(_) => Err(ReviewInputError::InvalidReviewerStats(FIELD)),
    }
}

fn reviewer_avg_rating(obj: &Map<String, Value>) -> Result<Option<f64>, ReviewInputError> {
    const FIELD: &str = "reviewer_avg_rating";

    match obj.get(FIELD) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => coerce_number(v)
            .map(Some)
            .ok_or(ReviewInputError::InvalidReviewerStats(FIELD)),
    }
}

/// Outcome of one item in a batch request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchItemResult {
    Prediction(Value),
    Failed { error: &'static str },
}

impl BatchItemResult {
    pub fn invalid() -> Self {
        BatchItemResult::Failed { error: INVALID_REVIEW_DATA }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BatchItemResult::Failed { .. })
    }
}

#[derive(Debug, Serialize)]
pub struct BatchPredictResponse {
    pub results: Vec<BatchItemResult>,
}
