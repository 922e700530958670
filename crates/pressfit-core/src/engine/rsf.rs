//! Remaining strength factor: thickness ratio vs. metal-loss ratio.

use rust_decimal::Decimal;

use super::{CalculationEngine, Computation, require_non_negative, require_positive};
use crate::numeric::{clamp, div, sub, truncate};
use crate::primitives::{REF_RSF, RSF_ACCEPTANCE, RSF_IMMEDIATE_ACTION, RSF_TOLERANCE};
use crate::{PressfitError, Quantity, RecommendedAction, VerificationMethod, VerifiedResult};

impl CalculationEngine {
    /// Remaining strength factor for general metal loss.
    ///
    /// Primary: `(t − FCA − t_min) / (t_nom − t_min)`.
    /// Secondary: `1 − metal_loss / allowable_loss` with
    /// `metal_loss = t_nom − (t − FCA)` and `allowable_loss = t_nom − t_min`.
    /// Both are clamped to `[0, 1]`; the value is truncated to
    /// `rsf_decimals`.
    pub fn remaining_strength_factor(
        &self,
        current_thickness: Decimal,
        minimum_thickness: Decimal,
        nominal_thickness: Decimal,
        future_corrosion_allowance: Decimal,
    ) -> Result<VerifiedResult, PressfitError> {
        require_positive("current_thickness", current_thickness)?;
        require_positive("minimum_thickness", minimum_thickness)?;
        require_positive("nominal_thickness", nominal_thickness)?;
        require_non_negative("future_corrosion_allowance", future_corrosion_allowance)?;
        if nominal_thickness <= minimum_thickness {
            return Err(PressfitError::infeasible(format!(
                "nominal thickness {} in must exceed minimum thickness {} in",
                nominal_thickness, minimum_thickness
            )));
        }

        let available = sub(current_thickness, future_corrosion_allowance)?;
        let allowable_loss = sub(nominal_thickness, minimum_thickness)?;

        let raw_primary = div(sub(available, minimum_thickness)?, allowable_loss)?;
        let metal_loss = sub(nominal_thickness, available)?;
        let raw_secondary = sub(Decimal::ONE, div(metal_loss, allowable_loss)?)?;

        let primary = clamp(raw_primary, Decimal::ZERO, Decimal::ONE);
        let secondary = clamp(raw_secondary, Decimal::ZERO, Decimal::ONE);

        let mut warnings = Vec::new();
        if raw_primary > Decimal::ONE {
            warnings.push(format!(
                "Computed RSF {} exceeds 1.0 (available thickness above nominal); clamped to 1.0",
                raw_primary.round_dp(4)
            ));
        } else if raw_primary < Decimal::ZERO {
            warnings.push(format!(
                "Computed RSF {} is negative (available thickness below minimum); clamped to 0.0",
                raw_primary.round_dp(4)
            ));
        }

        let value = truncate(primary, self.settings.rsf_decimals);
        let action = RecommendedAction::for_rsf(value);
        if value < RSF_IMMEDIATE_ACTION {
            warnings.push(format!(
                "RSF {} is below the immediate-action threshold {}",
                value, RSF_IMMEDIATE_ACTION
            ));
            warnings.push(format!("Recommended action: {}", action));
        } else if value < RSF_ACCEPTANCE {
            warnings.push(format!(
                "RSF {} is below the allowable RSF_a {}; Level 1 screening not satisfied",
                value, RSF_ACCEPTANCE
            ));
            warnings.push(format!("Recommended action: {}", action));
        }

        let computation = Computation {
            quantity: Quantity::RemainingStrengthFactor,
            primary,
            secondary,
            method: VerificationMethod::MetalLossRatio,
            tolerance: RSF_TOLERANCE,
            reference: REF_RSF,
            assumptions: vec![
                "General (uniform) metal loss; local thin areas require Part 5".to_string(),
                format!("Allowable RSF_a = {}", RSF_ACCEPTANCE),
                format!(
                    "t = {} in, t_min = {} in, t_nom = {} in, FCA = {} in",
                    current_thickness, minimum_thickness, nominal_thickness, future_corrosion_allowance
                ),
                format!(
                    "Value truncated to {} decimal places",
                    self.settings.rsf_decimals
                ),
            ],
            warnings,
        };
        computation.accept(value)
    }
}
