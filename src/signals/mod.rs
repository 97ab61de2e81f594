//! Signal normalization: raw evidence counts into bounded [0,1] scores.
//!
//! Linear mapping for signals with a natural ceiling, logarithmic mapping
//! for heavy-tailed ones (star counts, follower counts) so a single outlier
//! cannot dominate a composite.

/// Linearly normalize `value` against `max`, clamped to [0,1].
///
/// Non-finite or negative inputs normalize to 0.
#[must_use]
pub fn normalize_linear(value: f64, max: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 || max <= 0.0 {
        return 0.0;
    }
    (value / max).min(1.0)
}

/// Logarithmically normalize `value` against `max`: `ln(1+v) / ln(1+max)`.
///
/// Non-finite or negative inputs normalize to 0.
#[must_use]
pub fn normalize_log(value: f64, max: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 || max <= 0.0 {
        return 0.0;
    }
    ((1.0 + value).ln() / (1.0 + max).ln()).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_bounds() {
        assert!((normalize_linear(25.0, 50.0) - 0.5).abs() < 1e-12);
        assert!((normalize_linear(100.0, 50.0) - 1.0).abs() < 1e-12);
        assert!(normalize_linear(-3.0, 50.0).abs() < 1e-12);
        assert!(normalize_linear(f64::NAN, 50.0).abs() < 1e-12);
    }

    #[test]
    fn log_compresses_heavy_tail() {
        let mid = normalize_log(100.0, 10_000.0);
        let high = normalize_log(5_000.0, 10_000.0);
        // Two orders of magnitude apart in raw counts, but much closer
        // after the log mapping.
        assert!(mid > 0.4);
        assert!(high < 1.0);
        assert!(high - mid < 0.5);
    }

    #[test]
    fn log_caps_at_one() {
        assert!((normalize_log(1e9, 10_000.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_and_negative_map_to_zero() {
        assert!(normalize_log(0.0, 100.0).abs() < 1e-12);
        assert!(normalize_log(-1.0, 100.0).abs() < 1e-12);
        assert!(normalize_log(5.0, 0.0).abs() < 1e-12);
    }
}
