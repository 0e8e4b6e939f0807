//! Feature Layout
//!
//! Order of the feature vector fed to the scoring model. Weights files
//! refer to features by name, so renaming or removing an entry breaks
//! existing model files: bump FEATURE_VERSION when that happens.

pub const FEATURE_VERSION: u8 = 1;

pub const FEATURE_LAYOUT: &[&str] = &[
    // === Text shape (0-1) ===
    "text_length_log",       // 0: ln(1 + chars)
    "word_count_log",        // 1: ln(1 + words)

    // === Style (2-6) ===
    "exclamation_density",   // 2: '!' per word
    "uppercase_ratio",       // 3: uppercase letters / letters
    "promo_density",         // 4: promotional phrases per word
    "first_person_density",  // 5: I/me/my/... per word
    "lexical_diversity",     // 6: unique words / words

    // === Rating & reviewer (7-10) ===
    "rating_extremity",      // 7: |rating - 3| / 2
    "single_review_account", // 8: 1 / (1 + ln(total_reviews))
    "rating_deviation",      // 9: |rating - reviewer_avg| / 4
    "missing_reviewer_avg",  // 10: 1 when no reviewer average was given
];

pub const FEATURE_COUNT: usize = 11;

/// Index of a feature by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|f| *f == name)
}
