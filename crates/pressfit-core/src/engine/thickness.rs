//! Minimum required thickness: closed form vs. Newton root solve.

use rust_decimal::Decimal;

use super::{CalculationEngine, Computation, require_efficiency, require_positive};
use crate::numeric::{add, div, mul, round_half_up, sub};
use crate::primitives::{
    NEWTON_CONVERGENCE, REF_MIN_THICKNESS, THICKNESS_TOLERANCE, THIN_WALL_COEFFICIENT,
    THIN_WALL_PRESSURE_LIMIT, THIN_WALL_RATIO_LIMIT,
};
use crate::{PressfitError, Quantity, VerificationMethod, VerifiedResult};

/// Result of the bounded Newton solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NewtonOutcome {
    /// Last iterate.
    pub thickness: Decimal,
    /// Iterations used.
    pub iterations: u32,
    /// Whether the pressure residual met [`NEWTON_CONVERGENCE`].
    pub converged: bool,
}

impl CalculationEngine {
    /// Minimum required wall thickness of a cylindrical shell under internal
    /// pressure.
    ///
    /// Primary: `t = P·R / (S·E − 0.6·P)`.
    /// Secondary: Newton iteration on `S·E·t / (R + 0.6·t) = P`, starting
    /// from `P·R / (S·E)`. The value is rounded half-up to
    /// `thickness_decimals`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for non-positive inputs or `efficiency ∉ (0, 1]`
    /// - `PhysicallyInfeasible` when `S·E <= 0.6·P`
    /// - `Discrepancy` when the two paths disagree beyond 1e-5
    pub fn minimum_required_thickness(
        &self,
        pressure: Decimal,
        radius: Decimal,
        stress: Decimal,
        efficiency: Decimal,
    ) -> Result<VerifiedResult, PressfitError> {
        require_positive("pressure", pressure)?;
        require_positive("radius", radius)?;
        require_positive("stress", stress)?;
        require_efficiency(efficiency)?;

        let strength = mul(stress, efficiency)?;
        let pressure_term = mul(THIN_WALL_COEFFICIENT, pressure)?;
        let denominator = sub(strength, pressure_term)?;
        if denominator <= Decimal::ZERO {
            return Err(PressfitError::infeasible(format!(
                "pressure {} psi is incompatible with material: S·E = {} must exceed 0.6·P = {}",
                pressure, strength, pressure_term
            )));
        }

        let primary = div(mul(pressure, radius)?, denominator)?;
        let newton = self.solve_thickness_newton(pressure, radius, strength)?;

        let mut warnings = Vec::new();
        if !newton.converged {
            warnings.push(format!(
                "Newton solve did not converge within {} iterations; last iterate {} used as secondary value",
                newton.iterations, newton.thickness
            ));
        }
        let ratio = div(primary, radius)?;
        if ratio > THIN_WALL_RATIO_LIMIT {
            warnings.push(format!(
                "Thin-wall assumption violated: t/R = {} exceeds {}; a thick-wall (Lamé) analysis is recommended",
                ratio.round_dp(4),
                THIN_WALL_RATIO_LIMIT
            ));
        }
        let pressure_limit = mul(THIN_WALL_PRESSURE_LIMIT, strength)?;
        if pressure > pressure_limit {
            warnings.push(format!(
                "Pressure {} psi exceeds 0.385·S·E = {} psi; UG-27 formula outside its range of applicability",
                pressure, pressure_limit
            ));
        }

        let computation = Computation {
            quantity: Quantity::MinimumThickness,
            primary,
            secondary: newton.thickness,
            method: VerificationMethod::NewtonIteration,
            tolerance: THICKNESS_TOLERANCE,
            reference: REF_MIN_THICKNESS,
            assumptions: vec![
                "Cylindrical shell, circumferential stress governs (thin-wall formula)".to_string(),
                "Radius is the inside radius in the corroded condition".to_string(),
                format!(
                    "S = {} psi, E = {}, P = {} psi, R = {} in",
                    stress, efficiency, pressure, radius
                ),
                format!(
                    "Newton secondary used {} of at most {} iterations",
                    newton.iterations, self.settings.newton_max_iterations
                ),
                format!(
                    "Value rounded half-up to {} decimal places (instrument precision)",
                    self.settings.thickness_decimals
                ),
            ],
            warnings,
        };
        computation.accept(round_half_up(primary, self.settings.thickness_decimals))
    }

    /// Bounded Newton solve of `f(t) = S·E·t / (R + 0.6·t) − P = 0`.
    ///
    /// `f` is increasing and concave in `t`, so iterates starting from the
    /// simplified guess `P·R / (S·E)` approach the root monotonically from
    /// below. On hitting the iteration cap the last iterate is returned.
    pub(crate) fn solve_thickness_newton(
        &self,
        pressure: Decimal,
        radius: Decimal,
        strength: Decimal,
    ) -> Result<NewtonOutcome, PressfitError> {
        let max_iterations = self.settings.newton_max_iterations;
        let mut thickness = div(mul(pressure, radius)?, strength)?;

        for iteration in 1..=max_iterations {
            let denominator = add(radius, mul(THIN_WALL_COEFFICIENT, thickness)?)?;
            let implied = div(mul(strength, thickness)?, denominator)?;
            let residual = sub(implied, pressure)?;
            if div(residual.abs(), pressure)? <= NEWTON_CONVERGENCE {
                return Ok(NewtonOutcome {
                    thickness,
                    iterations: iteration,
                    converged: true,
                });
            }
            let slope = div(mul(strength, radius)?, mul(denominator, denominator)?)?;
            if slope.is_zero() {
                break;
            }
            thickness = sub(thickness, div(residual, slope)?)?;
        }

        Ok(NewtonOutcome {
            thickness,
            iterations: max_iterations,
            converged: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineSettings;
    use crate::numeric::relative_difference;

    fn d(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    #[test]
    fn golden_value() {
        let engine = CalculationEngine::new();
        let result = engine
            .minimum_required_thickness(d("1000"), d("24"), d("17500"), d("1.0"))
            .expect("valid inputs");
        // 24000 / 16900 = 1.420118...
        assert_eq!(result.value, d("1.420"));
        assert_eq!(result.verification_method, VerificationMethod::NewtonIteration);
        assert!(result.paths_agree());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn newton_converges_quickly() {
        let engine = CalculationEngine::new();
        let outcome = engine
            .solve_thickness_newton(d("1000"), d("24"), d("17500"))
            .expect("solve");
        assert!(outcome.converged);
        assert!(outcome.iterations < 10);
        let exact = d("24000") / d("16900");
        assert!(relative_difference(exact, outcome.thickness) < d("0.0000000001"));
    }

    #[test]
    fn iteration_cap_returns_last_iterate() {
        let settings = EngineSettings {
            newton_max_iterations: 1,
            ..EngineSettings::default()
        };
        let engine = CalculationEngine::with_settings(settings).expect("settings");
        let outcome = engine
            .solve_thickness_newton(d("1000"), d("24"), d("17500"))
            .expect("solve");
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 1);
        // One Newton step from P·R/(S·E) is already close but not converged.
        assert!(outcome.thickness > d("1.3714"));
    }

    #[test]
    fn thin_wall_warning() {
        let engine = CalculationEngine::new();
        let result = engine
            .minimum_required_thickness(d("3000"), d("10"), d("20000"), d("1.0"))
            .expect("valid inputs");
        // 30000 / 18200 = 1.648 → t/R = 0.165
        assert_eq!(result.value, d("1.648"));
        assert!(result.warnings.iter().any(|w| w.contains("Thin-wall assumption")));
    }

    #[test]
    fn incompatible_pressure_is_infeasible() {
        let engine = CalculationEngine::new();
        let err = engine
            .minimum_required_thickness(d("30000"), d("24"), d("17500"), d("1.0"))
            .expect_err("S·E < 0.6·P");
        assert!(matches!(err, PressfitError::PhysicallyInfeasible { .. }));
    }

    #[test]
    fn invalid_inputs_rejected() {
        let engine = CalculationEngine::new();
        assert!(matches!(
            engine.minimum_required_thickness(d("0"), d("24"), d("17500"), d("1")),
            Err(PressfitError::InvalidInput { field: "pressure", .. })
        ));
        assert!(matches!(
            engine.minimum_required_thickness(d("100"), d("-1"), d("17500"), d("1")),
            Err(PressfitError::InvalidInput { field: "radius", .. })
        ));
        assert!(matches!(
            engine.minimum_required_thickness(d("100"), d("24"), d("17500"), d("1.05")),
            Err(PressfitError::InvalidInput { field: "efficiency", .. })
        ));
    }

    #[test]
    fn joint_efficiency_increases_thickness() {
        let engine = CalculationEngine::new();
        let full = engine
            .minimum_required_thickness(d("250"), d("36"), d("20000"), d("1.0"))
            .expect("valid");
        let spot = engine
            .minimum_required_thickness(d("250"), d("36"), d("20000"), d("0.85"))
            .expect("valid");
        assert!(spot.primary_value > full.primary_value);
    }
}
