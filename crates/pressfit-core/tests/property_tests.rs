//! # Property-Based Tests
//!
//! Invariants of the engine that must hold for every valid input, checked
//! with proptest. Inputs are generated as scaled integers so no binary
//! floating point is involved.

#![allow(clippy::panic)]

use pressfit_core::{CalculationEngine, ConfidenceLevel, PressfitError, VerifiedResult};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Decimal with `scale` fractional digits from an integer strategy.
fn decimal(range: std::ops::Range<i64>, scale: u32) -> impl Strategy<Value = Decimal> {
    range.prop_map(move |n| Decimal::new(n, scale))
}

fn confidence() -> impl Strategy<Value = ConfidenceLevel> {
    prop_oneof![
        Just(ConfidenceLevel::Conservative),
        Just(ConfidenceLevel::Average),
        Just(ConfidenceLevel::Optimistic),
    ]
}

/// Successful results satisfy their tolerance; a discrepancy is never
/// acceptable for these generated inputs.
fn assert_dual_path(result: Result<VerifiedResult, PressfitError>) {
    match result {
        Ok(result) => assert!(
            result.path_difference() <= result.tolerance_used,
            "{} paths differ by {} (tolerance {})",
            result.quantity,
            result.path_difference(),
            result.tolerance_used
        ),
        Err(PressfitError::Discrepancy(d)) => panic!("unexpected discrepancy: {}", d),
        Err(_) => {}
    }
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Thickness grows with pressure.
    #[test]
    fn thickness_increases_with_pressure(
        pressure in decimal(50..3000, 0),
        bump in decimal(1..500, 0),
        radius in decimal(60..1200, 1),
        stress in decimal(15_000..25_000, 0),
        efficiency in decimal(70..101, 2),
    ) {
        let engine = CalculationEngine::new();
        let low = engine.minimum_required_thickness(pressure, radius, stress, efficiency);
        let high = engine.minimum_required_thickness(pressure + bump, radius, stress, efficiency);
        if let (Ok(low), Ok(high)) = (low, high) {
            prop_assert!(high.primary_value > low.primary_value);
            prop_assert!(high.value >= low.value);
        }
    }

    /// Thickness shrinks as allowable stress grows.
    #[test]
    fn thickness_decreases_with_stress(
        pressure in decimal(50..3000, 0),
        radius in decimal(60..1200, 1),
        stress in decimal(15_000..25_000, 0),
        bump in decimal(100..5000, 0),
    ) {
        let engine = CalculationEngine::new();
        let weak = engine.minimum_required_thickness(pressure, radius, stress, Decimal::ONE);
        let strong = engine.minimum_required_thickness(pressure, radius, stress + bump, Decimal::ONE);
        if let (Ok(weak), Ok(strong)) = (weak, strong) {
            prop_assert!(strong.primary_value < weak.primary_value);
            prop_assert!(strong.value <= weak.value);
        }
    }

    /// RSF is within [0, 1] whatever the thicknesses.
    #[test]
    fn rsf_is_bounded(
        current in decimal(1..3000, 3),
        minimum in decimal(1..1500, 3),
        extra in decimal(1..1500, 3),
        fca in decimal(0..200, 3),
    ) {
        let nominal = minimum + extra;
        let result = CalculationEngine::new()
            .remaining_strength_factor(current, minimum, nominal, fca)
            .expect("valid inputs");
        prop_assert!(result.value >= Decimal::ZERO);
        prop_assert!(result.value <= Decimal::ONE);
        prop_assert!(result.value <= result.primary_value);
    }

    /// Every successful result satisfies its own tolerance.
    #[test]
    fn dual_path_invariant(
        pressure in decimal(50..3000, 0),
        radius in decimal(60..1200, 1),
        stress in decimal(15_000..25_000, 0),
        efficiency in decimal(70..101, 2),
        current in decimal(200..2000, 3),
        rate in decimal(1..100, 3),
        level in confidence(),
    ) {
        let engine = CalculationEngine::new();
        let t_min = engine.minimum_required_thickness(pressure, radius, stress, efficiency);
        if let Ok(t_min) = &t_min {
            assert_dual_path(engine.remaining_life(current, t_min.value, rate, level));
        }
        assert_dual_path(t_min);
        assert_dual_path(engine.maximum_allowable_working_pressure(
            current, radius, stress, efficiency, Decimal::ZERO,
        ));
        assert_dual_path(engine.remaining_strength_factor(
            current, Decimal::new(1, 1), current + Decimal::ONE, Decimal::ZERO,
        ));
    }

    /// Doubling the corrosion rate shortens the remaining life.
    #[test]
    fn life_decreases_with_rate(
        minimum in decimal(100..800, 3),
        margin in decimal(50..500, 3),
        rate in decimal(5..100, 3),
        level in confidence(),
    ) {
        let engine = CalculationEngine::new();
        let current = minimum + margin;
        let slow = engine
            .remaining_life(current, minimum, rate, level)
            .expect("valid inputs");
        let fast = engine
            .remaining_life(current, minimum, rate * Decimal::TWO, level)
            .expect("valid inputs");
        prop_assert!(fast.value < slow.value);
    }

    /// The reported life never rounds up.
    #[test]
    fn life_is_truncated(
        minimum in decimal(100..800, 3),
        margin in decimal(1..500, 3),
        rate in decimal(1..100, 3),
    ) {
        let result = CalculationEngine::new()
            .remaining_life(minimum + margin, minimum, rate, ConfidenceLevel::Average)
            .expect("valid inputs");
        prop_assert!(result.value <= result.primary_value);
    }
}
