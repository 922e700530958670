//! # Verifier
//!
//! Stateless second opinion on engine results.
//!
//! The engine proves that two methods agree; it cannot tell whether the
//! agreed value makes sense for the equipment at hand. The verifier checks
//! values against the [`crate::thresholds`] table and against each other.
//! It never corrects anything: every finding is reported.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::primitives::{
    LONG_LIFE_YEARS, LOW_RSF_INTERVAL_YEARS, MAX_INSPECTION_INTERVAL_YEARS, RSF_HIGH,
    SHORT_LIFE_YEARS,
};
use crate::thresholds::{CorrosionSeverity, EquipmentType, InspectionType, MaterialFamily};
use crate::RecommendedAction;

// =============================================================================
// FINDINGS
// =============================================================================

/// Outcome of [`Verifier::verify_thickness`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThicknessCheck {
    /// False when any input exceeds an equipment-type maximum.
    pub is_valid: bool,
    /// Soft findings, such as a value close to a limit.
    pub warnings: Vec<String>,
}

/// Outcome of [`Verifier::verify_rsf`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsfCheck {
    /// False when the RSF is out of range or contradicts the thicknesses.
    pub is_valid: bool,
    pub warnings: Vec<String>,
    /// Action band the RSF falls into.
    pub recommended_action: RecommendedAction,
}

/// Outcome of [`Verifier::cross_check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossCheckReport {
    /// False when any inconsistency was found.
    pub is_consistent: bool,
    /// Contradictions between the supplied quantities.
    pub inconsistencies: Vec<String>,
    /// Suggested follow-up actions.
    pub recommendations: Vec<String>,
}

/// Outcome of [`Verifier::validate_inspection_interval`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalCheck {
    /// True when the proposed interval does not exceed `max_allowed`.
    pub is_valid: bool,
    /// Longest interval the inputs allow (years).
    pub max_allowed: Decimal,
    pub warnings: Vec<String>,
}

// =============================================================================
// CROSS-CHECK INPUTS
// =============================================================================

/// Thickness-side quantities for [`Verifier::cross_check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThicknessData {
    pub equipment_type: EquipmentType,
    /// Measured thickness (in).
    pub current_thickness: Decimal,
    /// Required thickness (in).
    pub minimum_thickness: Decimal,
    /// Remaining strength factor, if already computed.
    pub rsf: Option<Decimal>,
    /// Years.
    pub remaining_life: Option<Decimal>,
    /// in/yr.
    pub corrosion_rate: Option<Decimal>,
}

/// Pressure-side quantities for [`Verifier::cross_check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PressureData {
    /// psi.
    pub design_pressure: Decimal,
    /// psi, if already computed.
    pub mawp: Option<Decimal>,
}

/// Material and temperature for [`Verifier::cross_check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialData {
    /// ASME/ASTM specification, e.g. `SA-516 Gr 70`.
    pub specification: String,
    /// Degrees Fahrenheit.
    pub design_temperature: Decimal,
}

// =============================================================================
// VERIFIER
// =============================================================================

/// Threshold and consistency checks. Holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verifier;

impl Verifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Check a thickness against the equipment-type limits, pressure and
    /// temperature.
    ///
    /// Values above the typical maximum, and pressures or temperatures above
    /// the equipment-type maxima, are invalid. Values below the absolute
    /// minimum only warn: the absolute minimum then governs.
    pub fn verify_thickness(
        &self,
        calculated_thickness: Decimal,
        equipment_type: EquipmentType,
        pressure: Decimal,
        temperature: Decimal,
        material: &str,
    ) -> ThicknessCheck {
        let limits = equipment_type.limits();
        let mut is_valid = true;
        let mut warnings = Vec::new();

        if calculated_thickness <= Decimal::ZERO {
            is_valid = false;
            warnings.push(format!(
                "Calculated thickness {} in is not positive",
                calculated_thickness
            ));
        } else if calculated_thickness < limits.min_thickness {
            warnings.push(format!(
                "Calculated thickness {} in is below the {} absolute minimum {} in; the absolute minimum governs",
                calculated_thickness, equipment_type, limits.min_thickness
            ));
        }
        if calculated_thickness > limits.max_typical_thickness {
            is_valid = false;
            warnings.push(format!(
                "Calculated thickness {} in exceeds the typical maximum {} in for {}; check inputs",
                calculated_thickness, limits.max_typical_thickness, equipment_type
            ));
        }
        if pressure > limits.max_pressure {
            is_valid = false;
            warnings.push(format!(
                "Pressure {} psi exceeds the {} maximum {} psi",
                pressure, equipment_type, limits.max_pressure
            ));
        }
        if temperature > limits.max_temperature {
            is_valid = false;
            warnings.push(format!(
                "Temperature {}°F exceeds the {} maximum {}°F",
                temperature, equipment_type, limits.max_temperature
            ));
        }

        let high_pressure = pressure > limits.max_pressure / Decimal::TWO;
        let low_thickness = calculated_thickness < limits.min_thickness * Decimal::TWO;
        if high_pressure && low_thickness {
            warnings.push(format!(
                "High pressure ({} psi) with low thickness ({} in); verify measurement and design basis",
                pressure, calculated_thickness
            ));
        }

        let family = MaterialFamily::from_specification(material);
        if temperature > family.creep_onset_temperature() {
            warnings.push(format!(
                "Temperature {}°F is in the creep range for {} (onset {}°F); Part 10 assessment required",
                temperature,
                family,
                family.creep_onset_temperature()
            ));
        }

        ThicknessCheck { is_valid, warnings }
    }

    /// Check an RSF for range and internal consistency, and map it to an
    /// action.
    pub fn verify_rsf(
        &self,
        rsf: Decimal,
        current_thickness: Decimal,
        minimum_thickness: Decimal,
        equipment_type: EquipmentType,
    ) -> RsfCheck {
        let limits = equipment_type.limits();
        let mut is_valid = true;
        let mut warnings = Vec::new();

        if rsf < Decimal::ZERO || rsf > Decimal::ONE {
            is_valid = false;
            warnings.push(format!("RSF {} is outside [0, 1]", rsf));
        }
        if current_thickness <= minimum_thickness && rsf > Decimal::ZERO {
            is_valid = false;
            warnings.push(format!(
                "RSF {} is positive but current thickness {} in is at or below minimum {} in",
                rsf, current_thickness, minimum_thickness
            ));
        }

        if rsf < limits.rsf_immediate_action {
            warnings.push(format!(
                "RSF {} is below the immediate-action threshold {}",
                rsf, limits.rsf_immediate_action
            ));
        } else if rsf < limits.rsf_acceptance {
            warnings.push(format!(
                "RSF {} is below the acceptance threshold {}",
                rsf, limits.rsf_acceptance
            ));
        }

        RsfCheck {
            is_valid,
            warnings,
            recommended_action: RecommendedAction::for_rsf(rsf),
        }
    }

    /// Check that thickness, pressure, RSF and life tell the same story.
    pub fn cross_check(
        &self,
        thickness: &ThicknessData,
        pressure: &PressureData,
        material: &MaterialData,
    ) -> CrossCheckReport {
        let mut inconsistencies = Vec::new();
        let mut recommendations = Vec::new();

        if let Some(mawp) = pressure.mawp {
            let excess = thickness.current_thickness > thickness.minimum_thickness;
            if excess && mawp < pressure.design_pressure {
                inconsistencies.push(format!(
                    "MAWP {} psi is below design pressure {} psi although thickness {} in exceeds minimum {} in",
                    mawp, pressure.design_pressure, thickness.current_thickness, thickness.minimum_thickness
                ));
                recommendations
                    .push("Re-check radius, allowable stress and joint efficiency inputs".to_string());
            }
            if thickness.current_thickness < thickness.minimum_thickness
                && mawp >= pressure.design_pressure
            {
                inconsistencies.push(format!(
                    "MAWP {} psi is at or above design pressure {} psi although thickness {} in is below minimum {} in",
                    mawp, pressure.design_pressure, thickness.current_thickness, thickness.minimum_thickness
                ));
                recommendations.push(
                    "Verify the minimum thickness basis and the future corrosion allowance"
                        .to_string(),
                );
            }
        }

        if let (Some(rsf), Some(life)) = (thickness.rsf, thickness.remaining_life) {
            let acceptance = thickness.equipment_type.limits().rsf_acceptance;
            if rsf < acceptance && life > LONG_LIFE_YEARS {
                inconsistencies.push(format!(
                    "Low RSF {} with long remaining life {} years",
                    rsf, life
                ));
                recommendations.push("Verify the corrosion rate; it may be understated".to_string());
            }
            if rsf >= RSF_HIGH && life < SHORT_LIFE_YEARS {
                inconsistencies.push(format!(
                    "High RSF {} with short remaining life {} years",
                    rsf, life
                ));
                recommendations.push("Verify the corrosion rate; it may be overstated".to_string());
            }
        }

        let family = MaterialFamily::from_specification(&material.specification);
        if material.design_temperature > family.creep_onset_temperature() {
            recommendations.push(format!(
                "Design temperature {}°F exceeds the {} creep onset {}°F; perform a creep assessment (Part 10)",
                material.design_temperature,
                family,
                family.creep_onset_temperature()
            ));
        }

        if let Some(rate) = thickness.corrosion_rate {
            let limits = thickness.equipment_type.limits();
            if limits.classify_corrosion_rate(rate) == CorrosionSeverity::Severe {
                recommendations.push(format!(
                    "Corrosion rate {} in/yr exceeds the severe rate {} in/yr for {}; investigate the damage mechanism",
                    rate, limits.corrosion_rates.severe, thickness.equipment_type
                ));
            }
        }

        CrossCheckReport {
            is_consistent: inconsistencies.is_empty(),
            inconsistencies,
            recommendations,
        }
    }

    /// Longest inspection interval the inputs allow, with the reasons it
    /// was shortened.
    ///
    /// The smallest of the code ceiling for the equipment and inspection
    /// type, ten years, half the remaining life, and two years when `rsf`
    /// is below acceptance.
    pub fn max_inspection_interval(
        &self,
        remaining_life: Decimal,
        equipment_type: EquipmentType,
        inspection_type: InspectionType,
        rsf: Option<Decimal>,
    ) -> (Decimal, Vec<String>) {
        let limits = equipment_type.limits();
        let mut warnings = Vec::new();

        let mut max_allowed = limits
            .intervals
            .for_inspection(inspection_type)
            .min(MAX_INSPECTION_INTERVAL_YEARS);
        let half_life = remaining_life.max(Decimal::ZERO) / Decimal::TWO;
        if half_life < max_allowed {
            max_allowed = half_life;
            warnings.push(format!(
                "Interval limited to half the remaining life ({} years)",
                half_life
            ));
        }
        if let Some(rsf) = rsf {
            if rsf < limits.rsf_acceptance && LOW_RSF_INTERVAL_YEARS < max_allowed {
                max_allowed = LOW_RSF_INTERVAL_YEARS;
                warnings.push(format!(
                    "Interval limited to {} years because RSF {} is below {}",
                    LOW_RSF_INTERVAL_YEARS, rsf, limits.rsf_acceptance
                ));
            }
        }
        if remaining_life <= Decimal::ZERO {
            warnings.push(
                "No remaining life: remove from service or re-rate before operation".to_string(),
            );
        }
        (max_allowed, warnings)
    }

    /// Validate a proposed inspection interval against
    /// [`Verifier::max_inspection_interval`].
    pub fn validate_inspection_interval(
        &self,
        proposed_interval: Decimal,
        remaining_life: Decimal,
        equipment_type: EquipmentType,
        inspection_type: InspectionType,
        rsf: Option<Decimal>,
    ) -> IntervalCheck {
        let (max_allowed, mut warnings) =
            self.max_inspection_interval(remaining_life, equipment_type, inspection_type, rsf);

        let mut is_valid = true;
        if proposed_interval <= Decimal::ZERO {
            is_valid = false;
            warnings.push(format!(
                "Proposed interval {} years is not positive",
                proposed_interval
            ));
        } else if proposed_interval > max_allowed {
            is_valid = false;
            warnings.push(format!(
                "Proposed {} interval {} years exceeds the maximum allowed {} years",
                inspection_type, proposed_interval, max_allowed
            ));
        }

        IntervalCheck {
            is_valid,
            max_allowed,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    #[test]
    fn reasonable_thickness_passes() {
        let check = Verifier::new().verify_thickness(
            d("1.420"),
            EquipmentType::PressureVessel,
            d("1000"),
            d("400"),
            "SA-516 Gr 70",
        );
        assert!(check.is_valid);
        assert!(check.warnings.is_empty());
    }

    #[test]
    fn thickness_above_typical_maximum_is_invalid() {
        let check = Verifier::new().verify_thickness(
            d("3.5"),
            EquipmentType::Piping,
            d("500"),
            d("200"),
            "A106 Gr B",
        );
        assert!(!check.is_valid);
    }

    #[test]
    fn creep_range_warns() {
        let check = Verifier::new().verify_thickness(
            d("1.0"),
            EquipmentType::PressureVessel,
            d("500"),
            d("750"),
            "SA-516 Gr 70",
        );
        assert!(check.is_valid);
        assert!(check.warnings.iter().any(|w| w.contains("creep range")));

        let stainless = Verifier::new().verify_thickness(
            d("1.0"),
            EquipmentType::PressureVessel,
            d("500"),
            d("750"),
            "SA-240 316L",
        );
        assert!(stainless.warnings.is_empty());
    }

    #[test]
    fn high_pressure_low_thickness_warns() {
        let check = Verifier::new().verify_thickness(
            d("0.1"),
            EquipmentType::PressureVessel,
            d("6000"),
            d("100"),
            "SA-516 Gr 70",
        );
        assert!(check.warnings.iter().any(|w| w.contains("High pressure")));
    }

    #[test]
    fn below_absolute_minimum_only_warns() {
        let check = Verifier::new().verify_thickness(
            d("0.05"),
            EquipmentType::StorageTank,
            d("5"),
            d("100"),
            "A36",
        );
        assert!(check.is_valid);
        assert!(check.warnings.iter().any(|w| w.contains("absolute minimum")));
    }

    #[test]
    fn rsf_bands() {
        let verifier = Verifier::new();
        let ok = verifier.verify_rsf(d("0.95"), d("1.2"), d("0.875"), EquipmentType::PressureVessel);
        assert!(ok.is_valid);
        assert_eq!(ok.recommended_action, RecommendedAction::ContinueOperation);

        let low = verifier.verify_rsf(d("0.733"), d("1.2"), d("0.875"), EquipmentType::PressureVessel);
        assert!(low.is_valid);
        assert_eq!(low.recommended_action, RecommendedAction::Level2Or3Assessment);
        assert!(!low.warnings.is_empty());

        let critical = verifier.verify_rsf(d("0.5"), d("1.0"), d("0.875"), EquipmentType::Piping);
        assert_eq!(critical.recommended_action, RecommendedAction::ImmediateAction);
    }

    #[test]
    fn rsf_out_of_range_is_invalid() {
        let check = Verifier::new().verify_rsf(d("1.2"), d("1.2"), d("0.875"), EquipmentType::PressureVessel);
        assert!(!check.is_valid);
    }

    #[test]
    fn positive_rsf_below_minimum_is_inconsistent() {
        let check = Verifier::new().verify_rsf(d("0.3"), d("0.8"), d("0.875"), EquipmentType::PressureVessel);
        assert!(!check.is_valid);
        assert!(check.warnings.iter().any(|w| w.contains("at or below minimum")));
    }

    fn thickness_data(rsf: &str, life: &str) -> ThicknessData {
        ThicknessData {
            equipment_type: EquipmentType::PressureVessel,
            current_thickness: d("1.2"),
            minimum_thickness: d("0.875"),
            rsf: Some(d(rsf)),
            remaining_life: Some(d(life)),
            corrosion_rate: Some(d("0.01")),
        }
    }

    fn material() -> MaterialData {
        MaterialData {
            specification: "SA-516 Gr 70".to_string(),
            design_temperature: d("400"),
        }
    }

    #[test]
    fn consistent_data_passes_cross_check() {
        let report = Verifier::new().cross_check(
            &thickness_data("0.95", "15"),
            &PressureData {
                design_pressure: d("800"),
                mawp: Some(d("815.1")),
            },
            &material(),
        );
        assert!(report.is_consistent);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn mawp_below_design_with_excess_thickness() {
        let report = Verifier::new().cross_check(
            &thickness_data("0.95", "15"),
            &PressureData {
                design_pressure: d("1000"),
                mawp: Some(d("815.1")),
            },
            &material(),
        );
        assert!(!report.is_consistent);
        assert_eq!(report.inconsistencies.len(), 1);
    }

    #[test]
    fn rsf_and_life_must_agree() {
        let pressure = PressureData {
            design_pressure: d("800"),
            mawp: None,
        };
        let low_rsf_long_life =
            Verifier::new().cross_check(&thickness_data("0.7", "40"), &pressure, &material());
        assert!(!low_rsf_long_life.is_consistent);

        let high_rsf_short_life =
            Verifier::new().cross_check(&thickness_data("0.97", "1.5"), &pressure, &material());
        assert!(!high_rsf_short_life.is_consistent);
    }

    #[test]
    fn severe_rate_and_creep_are_recommendations() {
        let mut thickness = thickness_data("0.95", "15");
        thickness.corrosion_rate = Some(d("0.08"));
        let hot = MaterialData {
            specification: "SA-516 Gr 70".to_string(),
            design_temperature: d("800"),
        };
        let report = Verifier::new().cross_check(
            &thickness,
            &PressureData {
                design_pressure: d("800"),
                mawp: None,
            },
            &hot,
        );
        assert!(report.is_consistent);
        assert_eq!(report.recommendations.len(), 2);
    }

    #[test]
    fn interval_takes_smallest_ceiling() {
        let verifier = Verifier::new();
        let check = verifier.validate_inspection_interval(
            d("5"),
            d("22"),
            EquipmentType::PressureVessel,
            InspectionType::External,
            Some(d("0.95")),
        );
        assert!(check.is_valid);
        assert_eq!(check.max_allowed, d("5"));

        let check = verifier.validate_inspection_interval(
            d("5"),
            d("6"),
            EquipmentType::PressureVessel,
            InspectionType::Internal,
            None,
        );
        assert!(!check.is_valid);
        assert_eq!(check.max_allowed, d("3"));
    }

    #[test]
    fn low_rsf_caps_interval_at_two_years() {
        let check = Verifier::new().validate_inspection_interval(
            d("3"),
            d("22"),
            EquipmentType::PressureVessel,
            InspectionType::Internal,
            Some(d("0.733")),
        );
        assert!(!check.is_valid);
        assert_eq!(check.max_allowed, d("2"));
    }

    #[test]
    fn zero_life_allows_no_interval() {
        let check = Verifier::new().validate_inspection_interval(
            d("1"),
            Decimal::ZERO,
            EquipmentType::Piping,
            InspectionType::Thickness,
            None,
        );
        assert!(!check.is_valid);
        assert_eq!(check.max_allowed, Decimal::ZERO);
    }
}
