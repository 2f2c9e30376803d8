//! # Normalizer
//! Maps raw indicator values onto the common 0–100 score scale.
//!
//! Every indicator feeding the index goes through one of these two
//! functions so all scores share the same "higher = more bullish"
//! polarity before weighting.

/// Linear map of `value` from `[min, max]` onto `[0, 100]`, clamped.
///
/// Degenerate ranges (`min >= max`) return the neutral 50.0 instead of
/// letting a division by zero leak NaN into the index.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if min >= max {
        return 50.0;
    }
    (((value - min) / (max - min)) * 100.0).clamp(0.0, 100.0)
}

/// `100 - normalize(...)`, for indicators where a higher raw value is
/// economically worse (inflation, country risk, government debt).
pub fn normalize_inverted(value: f64, min: f64, max: f64) -> f64 {
    100.0 - normalize(value, min, max)
}
