//! # Innate Primitives
//!
//! Compiled-in constants for the pressfit CORE.
//!
//! These values are fixed at build time and immutable at runtime. Tolerances
//! here are NOT part of [`crate::EngineSettings`]: loosening a
//! dual-path tolerance changes what the engine is willing to certify.
//!
//! Units throughout the crate are US customary: inches, psi, degrees
//! Fahrenheit, years, inches per year.

use rust_decimal::Decimal;

// =============================================================================
// DUAL-PATH TOLERANCES (relative)
// =============================================================================

/// Minimum required thickness: primary closed form vs. Newton solve.
///
/// 1e-5 relative. The tightest of the four operations.
pub const THICKNESS_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 5);

/// MAWP: primary closed form vs. reverse solve / diameter formulation.
///
/// 1e-4 relative.
pub const MAWP_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// RSF: primary ratio vs. metal-loss formulation.
///
/// 1e-3 relative.
pub const RSF_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Remaining life: direct formula vs. year-by-year depletion.
///
/// 1e-3 relative.
pub const REMAINING_LIFE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Convergence criterion for the Newton thickness solve:
/// `|implied_pressure - pressure| / pressure <= 1e-12`.
pub const NEWTON_CONVERGENCE: Decimal = Decimal::from_parts(1, 0, 0, false, 12);

/// Back-solved thickness must match the available thickness to 1e-6
/// relative, otherwise the MAWP secondary switches to the diameter formula.
pub const REVERSE_SOLVE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

// =============================================================================
// FORMULA COEFFICIENTS
// =============================================================================

/// Thin-wall radius correction coefficient (`0.6` in `S·E − 0.6·P`).
pub const THIN_WALL_COEFFICIENT: Decimal = Decimal::from_parts(6, 0, 0, false, 1);

/// Diameter-form correction coefficient (`1.2` in `D + 1.2·t`).
pub const DIAMETER_COEFFICIENT: Decimal = Decimal::from_parts(12, 0, 0, false, 1);

/// Thin-wall assumption holds while `t / R <= 0.1`.
pub const THIN_WALL_RATIO_LIMIT: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Thin-wall formula applies while `P <= 0.385·S·E`.
pub const THIN_WALL_PRESSURE_LIMIT: Decimal = Decimal::from_parts(385, 0, 0, false, 3);

// =============================================================================
// RSF THRESHOLDS
// =============================================================================

/// Allowable remaining strength factor (RSF_a). Below this the component
/// fails Level 1 screening.
pub const RSF_ACCEPTANCE: Decimal = Decimal::from_parts(90, 0, 0, false, 2);

/// Below this RSF the inspection frequency must increase.
pub const RSF_MONITORING: Decimal = Decimal::from_parts(80, 0, 0, false, 2);

/// Below this RSF immediate action is required.
pub const RSF_IMMEDIATE_ACTION: Decimal = Decimal::from_parts(60, 0, 0, false, 2);

/// An RSF at or above this level is expected to coincide with a long life.
pub const RSF_HIGH: Decimal = Decimal::from_parts(95, 0, 0, false, 2);

// =============================================================================
// REMAINING LIFE / INSPECTION
// =============================================================================

/// Remaining life above which a low RSF is considered inconsistent (years).
pub const LONG_LIFE_YEARS: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Remaining life below which a high RSF is considered inconsistent (years).
pub const SHORT_LIFE_YEARS: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// Absolute inspection interval ceiling (years), whatever the equipment.
pub const MAX_INSPECTION_INTERVAL_YEARS: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Interval ceiling applied when RSF < [`RSF_ACCEPTANCE`] (years).
pub const LOW_RSF_INTERVAL_YEARS: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

// =============================================================================
// STANDARD REFERENCES
// =============================================================================

/// Citation attached to minimum required thickness results.
pub const REF_MIN_THICKNESS: &str = "API 579-1/ASME FFS-1 Annex 2C, Eq. 2C.3 (ASME VIII-1 UG-27(c)(1))";

/// Citation attached to RSF results.
pub const REF_RSF: &str = "API 579-1/ASME FFS-1 Part 4, Eq. 4.7";

/// Citation attached to MAWP results.
pub const REF_MAWP: &str = "API 579-1/ASME FFS-1 Annex 2C, Eq. 2C.4 (ASME VIII-1 UG-27(c)(1))";

/// Citation attached to remaining life results.
pub const REF_REMAINING_LIFE: &str = "API 510 Sec. 7.1.1 / API 579-1 Part 4, Sec. 4.5";

/// Citation attached to inspection interval validation.
pub const REF_INSPECTION_INTERVAL: &str = "API 510 Sec. 6.5 / API 570 Table 2";
