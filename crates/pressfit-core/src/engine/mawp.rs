//! MAWP: closed form vs. reverse solve of the thickness formula.

use rust_decimal::Decimal;

use super::{
    CalculationEngine, Computation, require_efficiency, require_non_negative, require_positive,
};
use crate::numeric::{add, div, mul, relative_difference, sub, truncate};
use crate::primitives::{
    DIAMETER_COEFFICIENT, MAWP_TOLERANCE, REF_MAWP, REVERSE_SOLVE_TOLERANCE,
    THIN_WALL_COEFFICIENT, THIN_WALL_RATIO_LIMIT,
};
use crate::{PressfitError, Quantity, VerificationMethod, VerifiedResult};

impl CalculationEngine {
    /// Maximum allowable working pressure at the corroded thickness.
    ///
    /// Primary: `S·E·t / (R + 0.6·t)` with `t = t_current − FCA`.
    ///
    /// Secondary: the minimum-thickness formula is solved backwards at the
    /// primary MAWP. When the back-solved thickness reproduces `t` to 1e-6
    /// the primary is corrected by the thickness ratio
    /// ([`VerificationMethod::ReverseSolve`]); otherwise the diameter form
    /// `2·S·E·t / (D + 1.2·t)` is used ([`VerificationMethod::DiameterFormula`]).
    ///
    /// The value is truncated to `mawp_decimals`.
    pub fn maximum_allowable_working_pressure(
        &self,
        current_thickness: Decimal,
        radius: Decimal,
        stress: Decimal,
        efficiency: Decimal,
        future_corrosion_allowance: Decimal,
    ) -> Result<VerifiedResult, PressfitError> {
        require_positive("current_thickness", current_thickness)?;
        require_positive("radius", radius)?;
        require_positive("stress", stress)?;
        require_efficiency(efficiency)?;
        require_non_negative("future_corrosion_allowance", future_corrosion_allowance)?;
        if current_thickness <= future_corrosion_allowance {
            return Err(PressfitError::infeasible(format!(
                "no available thickness: current thickness {} in does not exceed FCA {} in",
                current_thickness, future_corrosion_allowance
            )));
        }

        let available = sub(current_thickness, future_corrosion_allowance)?;
        let strength = mul(stress, efficiency)?;
        let primary = div(
            mul(strength, available)?,
            add(radius, mul(THIN_WALL_COEFFICIENT, available)?)?,
        )?;

        let mut warnings = Vec::new();
        let back_solved = div(
            mul(primary, radius)?,
            sub(strength, mul(THIN_WALL_COEFFICIENT, primary)?)?,
        )?;
        let (secondary, method) =
            mawp_secondary(primary, available, radius, strength, back_solved, &mut warnings)?;

        let ratio = div(available, radius)?;
        if ratio > THIN_WALL_RATIO_LIMIT {
            warnings.push(format!(
                "Thin-wall assumption violated: t/R = {} exceeds {}; MAWP may be non-conservative",
                ratio.round_dp(4),
                THIN_WALL_RATIO_LIMIT
            ));
        }

        let computation = Computation {
            quantity: Quantity::Mawp,
            primary,
            secondary,
            method,
            tolerance: MAWP_TOLERANCE,
            reference: REF_MAWP,
            assumptions: vec![
                "Cylindrical shell, circumferential stress governs (thin-wall formula)".to_string(),
                "Available thickness = current thickness − future corrosion allowance".to_string(),
                format!(
                    "S = {} psi, E = {}, t_avail = {} in, R = {} in",
                    stress, efficiency, available, radius
                ),
                format!(
                    "Value truncated to {} decimal places",
                    self.settings.mawp_decimals
                ),
            ],
            warnings,
        };
        computation.accept(truncate(primary, self.settings.mawp_decimals))
    }
}

/// Pick the MAWP secondary from the back-solved thickness.
///
/// Falls back to the diameter form, with a warning, when `back_solved` does
/// not reproduce `available` to [`REVERSE_SOLVE_TOLERANCE`].
fn mawp_secondary(
    primary: Decimal,
    available: Decimal,
    radius: Decimal,
    strength: Decimal,
    back_solved: Decimal,
    warnings: &mut Vec<String>,
) -> Result<(Decimal, VerificationMethod), PressfitError> {
    if relative_difference(available, back_solved) <= REVERSE_SOLVE_TOLERANCE {
        return Ok((
            div(mul(primary, available)?, back_solved)?,
            VerificationMethod::ReverseSolve,
        ));
    }

    warnings.push(format!(
        "Back-solved thickness {} in does not reproduce available thickness {} in; diameter formulation used as secondary",
        back_solved.round_dp(6),
        available
    ));
    let diameter = mul(Decimal::TWO, radius)?;
    let secondary = div(
        mul(mul(Decimal::TWO, strength)?, available)?,
        add(diameter, mul(DIAMETER_COEFFICIENT, available)?)?,
    )?;
    Ok((secondary, VerificationMethod::DiameterFormula))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::check_agreement;

    fn d(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    #[test]
    fn reverse_solve_reproduces_thickness() {
        let engine = CalculationEngine::new();
        let result = engine
            .maximum_allowable_working_pressure(d("1.200"), d("24"), d("17500"), d("1.0"), d("0.050"))
            .expect("valid inputs");
        // 17500 · 1.15 / 24.69 = 815.10733...
        assert_eq!(result.value, d("815.1"));
        assert_eq!(result.verification_method, VerificationMethod::ReverseSolve);
        assert!(result.paths_agree());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn exact_back_solve_keeps_reverse_solve() {
        // 17500 · 1.15 / 24.69
        let primary = d("17500") * d("1.15") / d("24.69");
        let mut warnings = Vec::new();
        let (secondary, method) = mawp_secondary(
            primary,
            d("1.15"),
            d("24"),
            d("17500"),
            d("1.15"),
            &mut warnings,
        )
        .expect("secondary");
        assert_eq!(method, VerificationMethod::ReverseSolve);
        assert!(relative_difference(secondary, primary) < d("0.0000000001"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn drifting_back_solve_falls_back_to_diameter_form() {
        let primary = d("17500") * d("1.15") / d("24.69");
        let mut warnings = Vec::new();
        let (secondary, method) = mawp_secondary(
            primary,
            d("1.15"),
            d("24"),
            d("17500"),
            d("1.151"),
            &mut warnings,
        )
        .expect("secondary");

        assert_eq!(method, VerificationMethod::DiameterFormula);
        // 2 · 17500 · 1.15 / (48 + 1.38) is algebraically the primary.
        assert!(relative_difference(secondary, primary) < d("0.0000000001"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("diameter formulation"));
        assert!(check_agreement(Quantity::Mawp, primary, secondary, MAWP_TOLERANCE, REF_MAWP).is_ok());
    }

    #[test]
    fn mawp_inverts_minimum_thickness() {
        let engine = CalculationEngine::new();
        let t_min = engine
            .minimum_required_thickness(d("1000"), d("24"), d("17500"), d("1.0"))
            .expect("thickness");
        let mawp = engine
            .maximum_allowable_working_pressure(
                t_min.primary_value,
                d("24"),
                d("17500"),
                d("1.0"),
                Decimal::ZERO,
            )
            .expect("mawp");
        assert!(relative_difference(d("1000"), mawp.primary_value) < d("0.000000001"));
    }

    #[test]
    fn truncation_never_rounds_up() {
        let engine = CalculationEngine::new();
        let result = engine
            .maximum_allowable_working_pressure(d("0.5"), d("30"), d("20000"), d("0.85"), d("0.125"))
            .expect("valid inputs");
        assert!(result.value <= result.primary_value);
    }

    #[test]
    fn thick_wall_warning() {
        let engine = CalculationEngine::new();
        let result = engine
            .maximum_allowable_working_pressure(d("2.0"), d("10"), d("20000"), d("1.0"), d("0"))
            .expect("valid inputs");
        assert!(result.warnings.iter().any(|w| w.contains("Thin-wall assumption")));
    }

    #[test]
    fn no_available_thickness_is_infeasible() {
        let engine = CalculationEngine::new();
        let err = engine
            .maximum_allowable_working_pressure(d("0.1"), d("24"), d("17500"), d("1.0"), d("0.1"))
            .expect_err("t == FCA");
        assert!(matches!(err, PressfitError::PhysicallyInfeasible { .. }));
    }
}
