//! # Exact Numerics
//!
//! Checked decimal arithmetic and the explicit rounding policy.
//!
//! `Decimal` operators panic on overflow and division by zero; the CORE
//! never panics, so every multiplication and division on a safety-critical
//! path goes through the checked helpers below.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::PressfitError;

/// Checked multiplication.
pub fn mul(a: Decimal, b: Decimal) -> Result<Decimal, PressfitError> {
    a.checked_mul(b)
        .ok_or_else(|| PressfitError::Arithmetic(format!("overflow computing {} × {}", a, b)))
}

/// Checked division.
pub fn div(a: Decimal, b: Decimal) -> Result<Decimal, PressfitError> {
    if b.is_zero() {
        return Err(PressfitError::Arithmetic(format!(
            "division of {} by zero",
            a
        )));
    }
    a.checked_div(b)
        .ok_or_else(|| PressfitError::Arithmetic(format!("overflow computing {} ÷ {}", a, b)))
}

/// Checked subtraction.
pub fn sub(a: Decimal, b: Decimal) -> Result<Decimal, PressfitError> {
    a.checked_sub(b)
        .ok_or_else(|| PressfitError::Arithmetic(format!("overflow computing {} − {}", a, b)))
}

/// Checked addition.
pub fn add(a: Decimal, b: Decimal) -> Result<Decimal, PressfitError> {
    a.checked_add(b)
        .ok_or_else(|| PressfitError::Arithmetic(format!("overflow computing {} + {}", a, b)))
}

/// `|a − b| / |a|`, or `|a − b|` when either value is zero.
///
/// Saturates to `Decimal::MAX` instead of overflowing; a saturated
/// difference always exceeds any tolerance.
#[must_use]
pub fn relative_difference(a: Decimal, b: Decimal) -> Decimal {
    let diff = match a.checked_sub(b) {
        Some(d) => d.abs(),
        None => return Decimal::MAX,
    };
    if a.is_zero() || b.is_zero() {
        return diff;
    }
    diff.checked_div(a.abs()).unwrap_or(Decimal::MAX)
}

/// Round to `dp` places, ties away from zero (round half-up for positive
/// values).
#[must_use]
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncate toward zero at `dp` places. Never rounds a positive value up.
#[must_use]
pub fn truncate(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::ToZero)
}

/// Clamp into `[lo, hi]`.
#[must_use]
pub fn clamp(value: Decimal, lo: Decimal, hi: Decimal) -> Decimal {
    value.max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_difference_uses_primary_magnitude() {
        let d = relative_difference(Decimal::new(200, 0), Decimal::new(201, 0));
        assert_eq!(d, Decimal::new(5, 3));
    }

    #[test]
    fn relative_difference_is_absolute_near_zero() {
        assert_eq!(
            relative_difference(Decimal::ZERO, Decimal::new(3, 4)),
            Decimal::new(3, 4)
        );
        assert_eq!(
            relative_difference(Decimal::new(3, 4), Decimal::ZERO),
            Decimal::new(3, 4)
        );
        assert_eq!(relative_difference(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn relative_difference_saturates() {
        assert_eq!(relative_difference(Decimal::MAX, Decimal::MIN), Decimal::MAX);
    }

    #[test]
    fn half_up_rounds_midpoint_up() {
        assert_eq!(round_half_up(Decimal::new(14205, 4), 3), Decimal::new(1421, 3));
        assert_eq!(round_half_up(Decimal::new(14204, 4), 3), Decimal::new(1420, 3));
    }

    #[test]
    fn truncate_never_rounds_up() {
        assert_eq!(truncate(Decimal::new(129999, 4), 2), Decimal::new(1299, 2));
        assert_eq!(truncate(Decimal::new(73333, 5), 3), Decimal::new(733, 3));
    }

    #[test]
    fn checked_division_by_zero_is_an_error() {
        assert!(matches!(
            div(Decimal::ONE, Decimal::ZERO),
            Err(PressfitError::Arithmetic(_))
        ));
    }

    #[test]
    fn checked_multiplication_overflow_is_an_error() {
        assert!(mul(Decimal::MAX, Decimal::TWO).is_err());
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp(Decimal::new(12, 1), Decimal::ZERO, Decimal::ONE), Decimal::ONE);
        assert_eq!(clamp(Decimal::new(-2, 1), Decimal::ZERO, Decimal::ONE), Decimal::ZERO);
    }
}
