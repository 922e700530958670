//! Remaining life: direct formula vs. year-by-year depletion.

use rust_decimal::Decimal;

use super::{CalculationEngine, Computation, require_positive};
use crate::numeric::{add, div, mul, sub, truncate};
use crate::primitives::{REF_REMAINING_LIFE, REMAINING_LIFE_TOLERANCE};
use crate::{ConfidenceLevel, PressfitError, Quantity, VerificationMethod, VerifiedResult};

impl CalculationEngine {
    /// Remaining service life in years.
    ///
    /// Primary: `(t − t_min) / (rate · CF)` where `CF` comes from
    /// `confidence_level`.
    /// Secondary: thickness is decremented by `rate · CF` one year at a time
    /// until the next step would cross `t_min`, then the final fractional
    /// year is added. Lives longer than `simulation_max_years` are
    /// re-derived by the direct formula instead.
    ///
    /// Zero and negative rates are valid and report the life cap. The value
    /// is truncated to `life_decimals`.
    pub fn remaining_life(
        &self,
        current_thickness: Decimal,
        minimum_thickness: Decimal,
        corrosion_rate: Decimal,
        confidence_level: ConfidenceLevel,
    ) -> Result<VerifiedResult, PressfitError> {
        require_positive("current_thickness", current_thickness)?;
        require_positive("minimum_thickness", minimum_thickness)?;

        let cap = Decimal::from(self.settings.remaining_life_cap_years);
        let factor = confidence_level.factor();
        let mut assumptions = vec![
            "Corrosion continues at a constant rate".to_string(),
            format!(
                "t = {} in, t_min = {} in, rate = {} in/yr",
                current_thickness, minimum_thickness, corrosion_rate
            ),
            format!(
                "Confidence level {} (rate factor {})",
                confidence_level.name(),
                factor
            ),
        ];
        let mut warnings = Vec::new();

        if current_thickness <= minimum_thickness {
            warnings.push(format!(
                "Current thickness {} in is at or below the minimum {} in; remaining life is zero",
                current_thickness, minimum_thickness
            ));
            return Computation {
                quantity: Quantity::RemainingLife,
                primary: Decimal::ZERO,
                secondary: Decimal::ZERO,
                method: VerificationMethod::DepletionSimulation,
                tolerance: REMAINING_LIFE_TOLERANCE,
                reference: REF_REMAINING_LIFE,
                assumptions,
                warnings,
            }
            .accept(Decimal::ZERO);
        }

        if corrosion_rate <= Decimal::ZERO {
            if corrosion_rate.is_zero() {
                warnings.push(format!(
                    "Zero corrosion rate: no measurable metal loss; remaining life reported as the {}-year cap",
                    cap
                ));
            } else {
                warnings.push(format!(
                    "Negative corrosion rate {} in/yr indicates metal growth or measurement error; remaining life reported as the {}-year cap",
                    corrosion_rate, cap
                ));
            }
            assumptions.push(format!("Life capped at {} years", cap));
            return Computation {
                quantity: Quantity::RemainingLife,
                primary: cap,
                secondary: cap,
                method: VerificationMethod::NoMeasurableLoss,
                tolerance: REMAINING_LIFE_TOLERANCE,
                reference: REF_REMAINING_LIFE,
                assumptions,
                warnings,
            }
            .accept(cap);
        }

        let effective_rate = mul(corrosion_rate, factor)?;
        let margin = sub(current_thickness, minimum_thickness)?;
        let primary = div(margin, effective_rate)?;

        let simulation_limit = Decimal::from(self.settings.simulation_max_years);
        let (secondary, method) = if primary > simulation_limit {
            warnings.push(format!(
                "Life exceeds the {}-year simulation limit; direct formula used as secondary",
                simulation_limit
            ));
            (
                div(div(margin, corrosion_rate)?, factor)?,
                VerificationMethod::DirectFormulaFallback,
            )
        } else {
            (
                self.simulate_depletion(current_thickness, minimum_thickness, effective_rate)?,
                VerificationMethod::DepletionSimulation,
            )
        };

        let value = if primary > cap {
            warnings.push(format!(
                "Computed life {} years exceeds the cap; reported as {} years",
                primary.round_dp(2),
                cap
            ));
            cap
        } else {
            truncate(primary, self.settings.life_decimals)
        };
        assumptions.push(format!(
            "Value truncated to {} decimal places",
            self.settings.life_decimals
        ));

        Computation {
            quantity: Quantity::RemainingLife,
            primary,
            secondary,
            method,
            tolerance: REMAINING_LIFE_TOLERANCE,
            reference: REF_REMAINING_LIFE,
            assumptions,
            warnings,
        }
        .accept(value)
    }

    /// Years until `thickness` reaches `minimum` losing `rate` per year,
    /// bounded by `simulation_max_years` whole steps.
    fn simulate_depletion(
        &self,
        current: Decimal,
        minimum: Decimal,
        rate: Decimal,
    ) -> Result<Decimal, PressfitError> {
        let mut thickness = current;
        let mut years = 0u32;
        while years < self.settings.simulation_max_years {
            let next = sub(thickness, rate)?;
            if next <= minimum {
                break;
            }
            thickness = next;
            years += 1;
        }
        let fraction = div(sub(thickness, minimum)?, rate)?;
        add(Decimal::from(years), fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineSettings;

    fn d(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    #[test]
    fn zero_rate_reports_cap() {
        let engine = CalculationEngine::new();
        let result = engine
            .remaining_life(d("1.150"), d("0.875"), Decimal::ZERO, ConfidenceLevel::Conservative)
            .expect("zero rate is valid");
        assert_eq!(result.value, d("999"));
        assert_eq!(result.verification_method, VerificationMethod::NoMeasurableLoss);
        assert!(result.warnings.iter().any(|w| w.contains("Zero corrosion rate")));
    }

    #[test]
    fn negative_rate_has_distinct_warning() {
        let engine = CalculationEngine::new();
        let result = engine
            .remaining_life(d("1.150"), d("0.875"), d("-0.002"), ConfidenceLevel::Average)
            .expect("negative rate is valid");
        assert_eq!(result.value, d("999"));
        assert!(result.warnings.iter().any(|w| w.contains("metal growth")));
    }

    #[test]
    fn simulation_matches_direct_formula() {
        let engine = CalculationEngine::new();
        let result = engine
            .remaining_life(d("1.150"), d("0.875"), d("0.010"), ConfidenceLevel::Conservative)
            .expect("valid inputs");
        // 0.275 / 0.0125 = 22
        assert_eq!(result.value, d("22"));
        assert_eq!(result.verification_method, VerificationMethod::DepletionSimulation);
        assert_eq!(result.secondary_value, d("22"));
    }

    #[test]
    fn fractional_life_is_truncated() {
        let engine = CalculationEngine::new();
        let result = engine
            .remaining_life(d("0.500"), d("0.250"), d("0.030"), ConfidenceLevel::Average)
            .expect("valid inputs");
        // 0.25 / 0.03 = 8.3333...
        assert_eq!(result.value, d("8.33"));
        assert!(result.paths_agree());
    }

    #[test]
    fn long_life_falls_back_to_direct_formula() {
        let engine = CalculationEngine::new();
        let result = engine
            .remaining_life(d("1.000"), d("0.500"), d("0.001"), ConfidenceLevel::Average)
            .expect("valid inputs");
        assert_eq!(result.value, d("500"));
        assert_eq!(
            result.verification_method,
            VerificationMethod::DirectFormulaFallback
        );
        assert!(result.warnings.iter().any(|w| w.contains("simulation limit")));
    }

    #[test]
    fn life_above_cap_is_capped() {
        let settings = EngineSettings {
            remaining_life_cap_years: 100,
            ..EngineSettings::default()
        };
        let engine = CalculationEngine::with_settings(settings).expect("settings");
        let result = engine
            .remaining_life(d("1.000"), d("0.500"), d("0.001"), ConfidenceLevel::Average)
            .expect("valid inputs");
        assert_eq!(result.value, d("100"));
        assert!(result.warnings.iter().any(|w| w.contains("exceeds the cap")));
    }

    #[test]
    fn thickness_at_minimum_means_zero_life() {
        let engine = CalculationEngine::new();
        let result = engine
            .remaining_life(d("0.875"), d("0.875"), d("0.010"), ConfidenceLevel::Average)
            .expect("valid inputs");
        assert_eq!(result.value, Decimal::ZERO);
        assert!(result.warnings.iter().any(|w| w.contains("remaining life is zero")));
    }

    #[test]
    fn conservative_confidence_shortens_life() {
        let engine = CalculationEngine::new();
        let conservative = engine
            .remaining_life(d("1.0"), d("0.5"), d("0.02"), ConfidenceLevel::Conservative)
            .expect("valid");
        let optimistic = engine
            .remaining_life(d("1.0"), d("0.5"), d("0.02"), ConfidenceLevel::Optimistic)
            .expect("valid");
        assert!(conservative.value < optimistic.value);
    }
}
