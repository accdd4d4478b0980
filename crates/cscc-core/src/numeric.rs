//! Float helpers for the derived metrics.

use crate::CoreError;

/// Absolute and relative comparison bounds for derived values.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: f64, b: f64, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

/// Reject NaN and infinities coming from user input.
pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// `log10(v)` for strictly positive values, 0 otherwise.
pub fn log10_or_zero(v: f64) -> f64 {
    if v > 0.0 { v.log10() } else { 0.0 }
}

/// `numerator / denominator`, or 0 when the denominator is zero or not finite.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}
