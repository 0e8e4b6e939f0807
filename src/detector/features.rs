//! Feature extraction for a single review
//!
//! Turns a validated [`ReviewInput`] into the fixed-order vector described by
//! [`super::layout`]. All features are finite for finite inputs.

use serde::Serialize;

use super::layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
use crate::models::ReviewInput;

const PROMO_WORDS: &[&str] = &[
    "amazing", "awesome", "best", "excellent", "fantastic", "flawless",
    "greatest", "incredible", "outstanding", "perfect", "recommend", "wow",
];

const PROMO_PHRASES: &[&str] = &[
    "highly recommend", "must buy", "five stars", "5 stars", "best ever",
    "life changing", "buy it now", "changed my life",
];

const FIRST_PERSON: &[&str] = &["i", "me", "my", "mine", "myself", "we", "our", "us"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub version: u8,
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    /// (name, value) pairs in layout order
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        FEATURE_LAYOUT.iter().copied().zip(self.values.iter().copied())
    }
}

/// Extract features from a review. Expects input already range-checked.
pub fn extract(input: &ReviewInput) -> FeatureVector {
    let text = input.review_text.trim();
    let lowered = text.to_lowercase();
    let words = tokenize(&lowered);
    let word_count = words.len().max(1) as f32;

    let mut values = [0.0f32; FEATURE_COUNT];

    values[0] = (1.0 + text.chars().count() as f32).ln();
    values[1] = (1.0 + words.len() as f32).ln();

    values[2] = text.matches('!').count() as f32 / word_count;

    let (upper, letters) = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(u, l), c| (u + c.is_uppercase() as usize, l + 1));
    values[3] = if letters > 0 { upper as f32 / letters as f32 } else { 0.0 };

    let promo_words = words.iter().filter(|w| PROMO_WORDS.contains(w)).count();
    let promo_phrases: usize = PROMO_PHRASES.iter().map(|p| lowered.matches(p).count()).sum();
    values[4] = (promo_words + promo_phrases) as f32 / word_count;

    values[5] = words.iter().filter(|w| FIRST_PERSON.contains(w)).count() as f32 / word_count;

    values[6] = if words.is_empty() {
        0.0
    } else {
        let mut unique = words.clone();
        unique.sort_unstable();
        unique.dedup();
        unique.len() as f32 / words.len() as f32
    };

    let rating = input.rating as f32;
    values[7] = ((rating - 3.0).abs() / 2.0).min(1.0);

    let total = input.reviewer_total_reviews.max(1) as f32;
    values[8] = 1.0 / (1.0 + total.ln());

    match input.reviewer_avg_rating {
        Some(avg) => {
            values[9] = ((rating - avg as f32).abs() / 4.0).min(1.0);
            values[10] = 0.0;
        }
        None => {
            values[9] = 0.0;
            values[10] = 1.0;
        }
    }

    FeatureVector {
        version: FEATURE_VERSION,
        values,
    }
}

fn tokenize(lowered: &str) -> Vec<&str> {
    lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .collect()
}
