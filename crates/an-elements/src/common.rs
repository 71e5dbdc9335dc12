//! Common utilities for element calculations.

use crate::error::{ElementError, ElementResult};
use an_core::ensure_finite;

/// Ensure a value is finite, returning ElementError if not.
pub fn check_finite(value: f64, what: &'static str) -> ElementResult<()> {
    ensure_finite(value, what).map_err(|_| ElementError::NonPhysical { what })?;
    Ok(())
}

/// Split a signed pressure drop into magnitude and sign.
///
/// Zero maps to a positive sign so ṁ(0) = 0 regardless.
pub fn split_dp(delta_p: f64) -> (f64, f64) {
    let sign = if delta_p >= 0.0 { 1.0 } else { -1.0 };
    (delta_p.abs(), sign)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_dp_signs() {
        assert_eq!(split_dp(5.0), (5.0, 1.0));
        assert_eq!(split_dp(-5.0), (5.0, -1.0));
        assert_eq!(split_dp(0.0), (0.0, 1.0));
    }

    #[test]
    fn check_finite_rejects_nan() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::NAN, "test").is_err());
        assert!(check_finite(f64::INFINITY, "test").is_err());
    }
}
