//! Division with a designed default for empty denominators.

/// Default number of decimal digits kept by ratio metrics.
pub const DEFAULT_PRECISION: u32 = 2;

/// How a ratio handles a zero denominator and how it rounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioPolicy {
    /// Returned (unrounded) when the denominator is zero.
    pub invalid_default: f64,
    /// Decimal digits kept after rounding.
    pub precision: u32,
}

impl RatioPolicy {
    pub const fn new(invalid_default: f64, precision: u32) -> Self {
        Self {
            invalid_default,
            precision,
        }
    }

    /// Same policy with a different precision.
    pub const fn with_precision(self, precision: u32) -> Self {
        Self { precision, ..self }
    }

    pub fn apply(&self, numerator: f64, denominator: f64) -> f64 {
        safe_ratio(numerator, denominator, self.invalid_default, self.precision)
    }
}

impl Default for RatioPolicy {
    fn default() -> Self {
        Self::new(0.0, DEFAULT_PRECISION)
    }
}

/// `numerator / denominator` rounded to `precision` decimal digits.
///
/// A zero denominator is an expected case, not an error: `invalid_default` is returned as-is.
pub fn safe_ratio(numerator: f64, denominator: f64, invalid_default: f64, precision: u32) -> f64 {
    if denominator == 0.0 {
        return invalid_default;
    }
    round_to(numerator / denominator, precision)
}

/// Largest precision that still changes an `f64`; anything finer returns the value unchanged.
pub const MAX_PRECISION: u32 = 15;

/// Round half away from zero to `precision` decimal digits.
///
/// Finite input always gives finite output: precisions above [`MAX_PRECISION`], and values too
/// large to scale, come back as-is.
pub fn round_to(value: f64, precision: u32) -> f64 {
    if precision == 0 {
        return value.round();
    }
    if precision > MAX_PRECISION {
        return value;
    }
    let factor = 10f64.powi(precision as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_denominator_returns_default_unrounded() {
        assert_eq!(safe_ratio(5.0, 0.0, 0.0, 2), 0.0);
        assert_eq!(safe_ratio(5.0, 0.0, 1.23456, 2), 1.23456);
        assert_eq!(safe_ratio(0.0, 0.0, -1.0, 0), -1.0);
    }

    #[test]
    fn rounds_to_requested_precision() {
        assert_eq!(safe_ratio(1.0, 3.0, 0.0, 2), 0.33);
        assert_eq!(safe_ratio(2.0, 3.0, 0.0, 2), 0.67);
        assert_eq!(safe_ratio(2.0, 3.0, 0.0, 0), 1.0);
        assert_eq!(safe_ratio(2.0, 3.0, 0.0, 4), 0.6667);
        assert_eq!(safe_ratio(2.0, 10.0, 0.0, 2), 0.2);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(0.125, 2), 0.13);
    }

    #[test]
    fn large_precision_keeps_value_finite() {
        assert_eq!(safe_ratio(1.0, 3.0, 0.0, 400), 1.0 / 3.0);
        assert_eq!(safe_ratio(1.0, 3.0, 0.0, u32::MAX), 1.0 / 3.0);
        assert_eq!(safe_ratio(1e10, 3.0, 0.0, 300), 1e10 / 3.0);
        assert_eq!(round_to(f64::MAX, 2), f64::MAX);
        assert_eq!(round_to(0.5, MAX_PRECISION), 0.5);
    }

    #[test]
    fn policy_applies_its_settings() {
        let policy = RatioPolicy::default();
        assert_eq!(policy.apply(1.0, 8.0), 0.13);
        assert_eq!(policy.with_precision(3).apply(1.0, 8.0), 0.125);
        assert_eq!(RatioPolicy::new(7.0, 2).apply(1.0, 0.0), 7.0);
    }
}
