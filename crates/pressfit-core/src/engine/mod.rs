//! # Calculation Engine
//!
//! Dual-path calculation of the four safety-critical quantities.
//!
//! Every operation computes its quantity twice, by a primary closed form and
//! by an independent secondary method, and only returns a
//! [`VerifiedResult`] if the two agree within the quantity's tolerance:
//!
//! | Operation | Primary | Secondary | Tolerance | Rounding |
//! |-----------|---------|-----------|-----------|----------|
//! | [`CalculationEngine::minimum_required_thickness`] | `P·R / (S·E − 0.6·P)` | Newton solve | 1e-5 | half-up |
//! | [`CalculationEngine::remaining_strength_factor`] | `(t − FCA − t_min) / (t_nom − t_min)` | metal-loss ratio | 1e-3 | toward zero |
//! | [`CalculationEngine::maximum_allowable_working_pressure`] | `S·E·t / (R + 0.6·t)` | reverse solve / diameter form | 1e-4 | toward zero |
//! | [`CalculationEngine::remaining_life`] | `(t − t_min) / (rate·CF)` | depletion simulation | 1e-3 | toward zero |
//!
//! The engine holds no mutable state. Each call ends in exactly one of:
//! a `VerifiedResult`, a [`PressfitError::Discrepancy`], or an input
//! validation / infeasibility error.

mod life;
mod mawp;
mod rsf;
mod thickness;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::numeric::relative_difference;
use crate::{CalculationDiscrepancy, PressfitError, Quantity, VerificationMethod, VerifiedResult};

// =============================================================================
// SETTINGS
// =============================================================================

/// Tunable safety margins of the engine.
///
/// Iteration caps and decimal precisions are implementation choices rather
/// than code-mandated constants, so they are configurable. Tolerances are
/// not; see [`crate::primitives`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Maximum Newton iterations for the thickness solve.
    pub newton_max_iterations: u32,
    /// Maximum simulated years before the remaining-life secondary falls
    /// back to the direct formula.
    pub simulation_max_years: u32,
    /// "Effectively infinite" remaining life (years).
    pub remaining_life_cap_years: u32,
    /// Decimal places kept on minimum thickness (inches).
    pub thickness_decimals: u32,
    /// Decimal places kept on RSF.
    pub rsf_decimals: u32,
    /// Decimal places kept on MAWP (psi).
    pub mawp_decimals: u32,
    /// Decimal places kept on remaining life (years).
    pub life_decimals: u32,
}

/// Upper bound on any configured decimal precision.
pub const MAX_DECIMALS: u32 = 10;

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            newton_max_iterations: 50,
            simulation_max_years: 200,
            remaining_life_cap_years: 999,
            thickness_decimals: 3,
            rsf_decimals: 3,
            mawp_decimals: 1,
            life_decimals: 2,
        }
    }
}

impl EngineSettings {
    /// Reject settings that would make a solver unbounded or meaningless.
    pub fn validate(&self) -> Result<(), PressfitError> {
        if self.newton_max_iterations == 0 {
            return Err(PressfitError::Config(
                "newton_max_iterations must be at least 1".to_string(),
            ));
        }
        if self.simulation_max_years == 0 {
            return Err(PressfitError::Config(
                "simulation_max_years must be at least 1".to_string(),
            ));
        }
        if self.remaining_life_cap_years == 0 {
            return Err(PressfitError::Config(
                "remaining_life_cap_years must be at least 1".to_string(),
            ));
        }
        for (name, dp) in [
            ("thickness_decimals", self.thickness_decimals),
            ("rsf_decimals", self.rsf_decimals),
            ("mawp_decimals", self.mawp_decimals),
            ("life_decimals", self.life_decimals),
        ] {
            if dp > MAX_DECIMALS {
                return Err(PressfitError::Config(format!(
                    "{} must be at most {} (got {})",
                    name, MAX_DECIMALS, dp
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Stateless dual-path calculation engine.
///
/// Cheap to clone and safe to share across threads; calls never block.
#[derive(Debug, Clone, Default)]
pub struct CalculationEngine {
    settings: EngineSettings,
}

impl CalculationEngine {
    /// Engine with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with validated custom settings.
    pub fn with_settings(settings: EngineSettings) -> Result<Self, PressfitError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Active settings.
    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

// =============================================================================
// DUAL-PATH GATE
// =============================================================================

/// Compare two independent results of the same quantity.
///
/// Returns the observed difference when it is within `tolerance`, otherwise
/// a [`PressfitError::Discrepancy`] carrying both values. The gate never
/// picks one path over the other.
pub fn check_agreement(
    quantity: Quantity,
    primary: Decimal,
    secondary: Decimal,
    tolerance: Decimal,
    standard_reference: &str,
) -> Result<Decimal, PressfitError> {
    let difference = relative_difference(primary, secondary);
    if difference > tolerance {
        return Err(PressfitError::Discrepancy(CalculationDiscrepancy {
            quantity,
            primary,
            secondary,
            difference,
            tolerance,
            standard_reference: standard_reference.to_string(),
        }));
    }
    Ok(difference)
}

/// Everything an operation has computed, before the agreement gate.
struct Computation {
    quantity: Quantity,
    primary: Decimal,
    secondary: Decimal,
    method: VerificationMethod,
    tolerance: Decimal,
    reference: &'static str,
    assumptions: Vec<String>,
    warnings: Vec<String>,
}

impl Computation {
    /// Run the agreement gate and seal the result with `value`.
    fn accept(self, value: Decimal) -> Result<VerifiedResult, PressfitError> {
        check_agreement(
            self.quantity,
            self.primary,
            self.secondary,
            self.tolerance,
            self.reference,
        )?;
        Ok(VerifiedResult {
            quantity: self.quantity,
            value,
            primary_value: self.primary,
            secondary_value: self.secondary,
            verification_method: self.method,
            timestamp: Utc::now(),
            calculation_id: Uuid::new_v4(),
            standard_reference: self.reference.to_string(),
            tolerance_used: self.tolerance,
            assumptions: self.assumptions,
            warnings: self.warnings,
        })
    }
}

// =============================================================================
// INPUT VALIDATION
// =============================================================================

fn require_positive(field: &'static str, value: Decimal) -> Result<(), PressfitError> {
    if value <= Decimal::ZERO {
        return Err(PressfitError::invalid(
            field,
            format!("must be strictly positive (got {})", value),
        ));
    }
    Ok(())
}

fn require_non_negative(field: &'static str, value: Decimal) -> Result<(), PressfitError> {
    if value < Decimal::ZERO {
        return Err(PressfitError::invalid(
            field,
            format!("must not be negative (got {})", value),
        ));
    }
    Ok(())
}

fn require_efficiency(value: Decimal) -> Result<(), PressfitError> {
    if value <= Decimal::ZERO || value > Decimal::ONE {
        return Err(PressfitError::invalid(
            "efficiency",
            format!("must be in (0, 1] (got {})", value),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::primitives::RSF_TOLERANCE;

    #[test]
    fn default_settings_are_valid() {
        assert!(EngineSettings::default().validate().is_ok());
    }

    #[test]
    fn zero_caps_are_rejected() {
        let settings = EngineSettings {
            newton_max_iterations: 0,
            ..EngineSettings::default()
        };
        assert!(matches!(
            CalculationEngine::with_settings(settings),
            Err(PressfitError::Config(_))
        ));

        let settings = EngineSettings {
            simulation_max_years: 0,
            ..EngineSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn excessive_precision_is_rejected() {
        let settings = EngineSettings {
            life_decimals: 11,
            ..EngineSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn gate_accepts_agreeing_paths() {
        let diff = check_agreement(
            Quantity::RemainingStrengthFactor,
            Decimal::new(7333, 4),
            Decimal::new(7334, 4),
            RSF_TOLERANCE,
            "ref",
        )
        .expect("within tolerance");
        assert!(diff <= RSF_TOLERANCE);
    }

    #[test]
    fn gate_surfaces_disagreeing_paths() {
        let err = check_agreement(
            Quantity::RemainingStrengthFactor,
            Decimal::new(73, 2),
            Decimal::new(80, 2),
            RSF_TOLERANCE,
            "Part 4",
        )
        .expect_err("outside tolerance");
        match err {
            PressfitError::Discrepancy(d) => {
                assert_eq!(d.primary, Decimal::new(73, 2));
                assert_eq!(d.secondary, Decimal::new(80, 2));
                assert_eq!(d.tolerance, RSF_TOLERANCE);
                assert_eq!(d.standard_reference, "Part 4");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn gate_uses_absolute_difference_at_zero() {
        assert!(
            check_agreement(
                Quantity::RemainingLife,
                Decimal::ZERO,
                Decimal::new(1, 4),
                Decimal::new(1, 3),
                "ref"
            )
            .is_ok()
        );
        assert!(
            check_agreement(
                Quantity::RemainingLife,
                Decimal::ZERO,
                Decimal::new(1, 2),
                Decimal::new(1, 3),
                "ref"
            )
            .is_err()
        );
    }
}
