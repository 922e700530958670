//! # Level 1 Assessment
//!
//! The full pipeline for one equipment item and one inspection:
//!
//! ```text
//! minimum thickness → RSF → MAWP → remaining life
//!     → verifier (thickness, RSF, cross-check, interval)
//!     → AssessmentReport → audit append (assessment_completed)
//! ```
//!
//! Any failing stage aborts the run before anything is written to the
//! audit trail.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::{AuditEventType, AuditRecord, AuditRequest, AuditStore, AuditTrailManager, EntityRef};
use crate::numeric::div;
use crate::primitives::RSF_ACCEPTANCE;
use crate::thresholds::{EquipmentType, InspectionType};
use crate::verifier::{
    CrossCheckReport, IntervalCheck, MaterialData, PressureData, RsfCheck, ThicknessCheck,
    ThicknessData, Verifier,
};
use crate::{CalculationEngine, ConfidenceLevel, PressfitError, VerifiedResult};

/// Citation recorded with every completed assessment.
pub const LEVEL1_REFERENCE: &str = "API 579-1/ASME FFS-1 Part 4, Level 1 Assessment";

/// Entity type under which assessments are chained.
pub const EQUIPMENT_ENTITY: &str = "equipment";

// =============================================================================
// INPUTS
// =============================================================================

/// Design data of one equipment item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentData {
    pub equipment_id: String,
    pub equipment_type: EquipmentType,
    /// psi.
    pub design_pressure: Decimal,
    /// °F.
    pub design_temperature: Decimal,
    /// in.
    pub nominal_thickness: Decimal,
    pub material_specification: String,
    /// psi at design temperature.
    pub allowable_stress: Decimal,
    pub joint_efficiency: Decimal,
    /// Future corrosion allowance (in).
    #[serde(default)]
    pub corrosion_allowance: Decimal,
    /// Inside radius (in). Takes precedence over `inside_diameter`.
    #[serde(default)]
    pub inside_radius: Option<Decimal>,
    /// Inside diameter (in).
    #[serde(default)]
    pub inside_diameter: Option<Decimal>,
}

impl EquipmentData {
    /// Inside radius, from `inside_radius` or half of `inside_diameter`.
    pub fn radius(&self) -> Result<Decimal, PressfitError> {
        match (self.inside_radius, self.inside_diameter) {
            (Some(r), _) => Ok(r),
            (None, Some(d)) => div(d, Decimal::TWO),
            (None, None) => Err(PressfitError::invalid(
                "inside_radius",
                "either inside_radius or inside_diameter is required",
            )),
        }
    }
}

/// Field data from one inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionData {
    pub inspection_id: String,
    pub inspection_type: InspectionType,
    /// Governing (minimum) measured thickness (in).
    pub minimum_measured_thickness: Decimal,
    #[serde(default)]
    pub average_measured_thickness: Option<Decimal>,
    /// in/yr.
    pub corrosion_rate: Decimal,
    #[serde(default)]
    pub confidence_level: ConfidenceLevel,
    /// Interval the inspector intends to set (years).
    #[serde(default)]
    pub proposed_interval_years: Option<Decimal>,
}

// =============================================================================
// OUTPUTS
// =============================================================================

/// Level 1 screening verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Level1Outcome {
    /// Fit for continued service.
    Accept,
    /// Not demonstrated fit at Level 1.
    Reject { reasons: Vec<String> },
}

impl Level1Outcome {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Level1Outcome::Accept)
    }
}

/// Everything one assessment produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub assessment_id: Uuid,
    pub equipment_id: String,
    pub inspection_id: String,
    pub assessed_at: DateTime<Utc>,
    pub minimum_thickness: VerifiedResult,
    pub rsf: VerifiedResult,
    pub mawp: VerifiedResult,
    pub remaining_life: VerifiedResult,
    pub thickness_check: ThicknessCheck,
    pub rsf_check: RsfCheck,
    pub cross_check: CrossCheckReport,
    /// Present when an interval was proposed.
    pub interval_check: Option<IntervalCheck>,
    /// Longest allowed interval until the next inspection (years).
    pub next_inspection_interval: Decimal,
    /// Why the interval was shortened, and any remove-from-service notice.
    #[serde(default)]
    pub interval_warnings: Vec<String>,
    pub outcome: Level1Outcome,
}

/// A report together with the audit record that sealed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedAssessment {
    pub report: AssessmentReport,
    pub record: AuditRecord,
}

// =============================================================================
// ASSESSOR
// =============================================================================

/// Runs the Level 1 pipeline and records its results.
#[derive(Debug)]
pub struct Assessor<S: AuditStore> {
    engine: CalculationEngine,
    verifier: Verifier,
    audit: AuditTrailManager<S>,
}

impl<S: AuditStore> Assessor<S> {
    pub fn new(engine: CalculationEngine, audit: AuditTrailManager<S>) -> Self {
        Self {
            engine,
            verifier: Verifier::new(),
            audit,
        }
    }

    pub fn engine(&self) -> &CalculationEngine {
        &self.engine
    }

    pub fn audit(&self) -> &AuditTrailManager<S> {
        &self.audit
    }

    /// Run the pipeline and append an `assessment_completed` record for the
    /// equipment. Nothing is recorded if any stage fails.
    pub fn assess(
        &self,
        equipment: &EquipmentData,
        inspection: &InspectionData,
        actor: &str,
    ) -> Result<RecordedAssessment, PressfitError> {
        let report = self.evaluate(equipment, inspection)?;
        let after_state = serde_json::to_value(&report)
            .map_err(|e| PressfitError::Serialization(e.to_string()))?;
        let request = AuditRequest::new(
            AuditEventType::AssessmentCompleted,
            EntityRef::new(EQUIPMENT_ENTITY, equipment.equipment_id.as_str())?,
            after_state,
            actor,
        )
        .with_standard_reference(LEVEL1_REFERENCE);
        let record = stage(&equipment.equipment_id, "audit", self.audit.append(&request))?;
        Ok(RecordedAssessment { report, record })
    }

    /// Record a single engine result against `entity`.
    pub fn record_calculation(
        &self,
        entity: EntityRef,
        result: &VerifiedResult,
        actor: &str,
    ) -> Result<AuditRecord, PressfitError> {
        let after_state = serde_json::to_value(result)
            .map_err(|e| PressfitError::Serialization(e.to_string()))?;
        let request = AuditRequest::new(
            AuditEventType::CalculationPerformed,
            entity,
            after_state,
            actor,
        )
        .with_standard_reference(result.standard_reference.clone());
        self.audit.append(&request)
    }

    /// Run the calculation and verification stages without recording.
    pub fn evaluate(
        &self,
        equipment: &EquipmentData,
        inspection: &InspectionData,
    ) -> Result<AssessmentReport, PressfitError> {
        let id = equipment.equipment_id.as_str();
        let radius = stage(id, "geometry", equipment.radius())?;
        let current = inspection.minimum_measured_thickness;

        let minimum_thickness = stage(
            id,
            "minimum_thickness",
            self.engine.minimum_required_thickness(
                equipment.design_pressure,
                radius,
                equipment.allowable_stress,
                equipment.joint_efficiency,
            ),
        )?;
        let t_min = minimum_thickness.value;

        let rsf = stage(
            id,
            "rsf",
            self.engine.remaining_strength_factor(
                current,
                t_min,
                equipment.nominal_thickness,
                equipment.corrosion_allowance,
            ),
        )?;
        let mawp = stage(
            id,
            "mawp",
            self.engine.maximum_allowable_working_pressure(
                current,
                radius,
                equipment.allowable_stress,
                equipment.joint_efficiency,
                equipment.corrosion_allowance,
            ),
        )?;
        let remaining_life = stage(
            id,
            "remaining_life",
            self.engine.remaining_life(
                current,
                t_min,
                inspection.corrosion_rate,
                inspection.confidence_level,
            ),
        )?;

        let thickness_check = self.verifier.verify_thickness(
            t_min,
            equipment.equipment_type,
            equipment.design_pressure,
            equipment.design_temperature,
            &equipment.material_specification,
        );
        let rsf_check =
            self.verifier
                .verify_rsf(rsf.value, current, t_min, equipment.equipment_type);
        let cross_check = self.verifier.cross_check(
            &ThicknessData {
                equipment_type: equipment.equipment_type,
                current_thickness: current,
                minimum_thickness: t_min,
                rsf: Some(rsf.value),
                remaining_life: Some(remaining_life.value),
                corrosion_rate: Some(inspection.corrosion_rate),
            },
            &PressureData {
                design_pressure: equipment.design_pressure,
                mawp: Some(mawp.value),
            },
            &MaterialData {
                specification: equipment.material_specification.clone(),
                design_temperature: equipment.design_temperature,
            },
        );
        let (next_inspection_interval, interval_warnings) = self.verifier.max_inspection_interval(
            remaining_life.value,
            equipment.equipment_type,
            inspection.inspection_type,
            Some(rsf.value),
        );
        let interval_check = inspection.proposed_interval_years.map(|proposed| {
            self.verifier.validate_inspection_interval(
                proposed,
                remaining_life.value,
                equipment.equipment_type,
                inspection.inspection_type,
                Some(rsf.value),
            )
        });

        let mut reasons = Vec::new();
        if rsf.value < RSF_ACCEPTANCE {
            reasons.push(format!(
                "RSF {} below allowable {}",
                rsf.value, RSF_ACCEPTANCE
            ));
        }
        if mawp.value < equipment.design_pressure {
            reasons.push(format!(
                "MAWP {} psi below design pressure {} psi",
                mawp.value, equipment.design_pressure
            ));
        }
        if remaining_life.value <= Decimal::ZERO {
            reasons.push("No remaining life".to_string());
        }
        if !thickness_check.is_valid {
            reasons.push("Minimum thickness failed threshold verification".to_string());
        }
        if !rsf_check.is_valid {
            reasons.push("RSF failed consistency verification".to_string());
        }
        for inconsistency in &cross_check.inconsistencies {
            reasons.push(format!("Inconsistent data: {}", inconsistency));
        }
        if let Some(check) = &interval_check {
            if !check.is_valid {
                reasons.push(format!(
                    "Proposed interval exceeds the maximum allowed {} years",
                    check.max_allowed
                ));
            }
        }
        let outcome = if reasons.is_empty() {
            Level1Outcome::Accept
        } else {
            Level1Outcome::Reject { reasons }
        };

        Ok(AssessmentReport {
            assessment_id: Uuid::new_v4(),
            equipment_id: equipment.equipment_id.clone(),
            inspection_id: inspection.inspection_id.clone(),
            assessed_at: Utc::now(),
            minimum_thickness,
            rsf,
            mawp,
            remaining_life,
            thickness_check,
            rsf_check,
            cross_check,
            interval_check,
            next_inspection_interval,
            interval_warnings,
            outcome,
        })
    }
}

/// Log a failed stage and pass the result through.
fn stage<T>(
    equipment_id: &str,
    name: &'static str,
    result: Result<T, PressfitError>,
) -> Result<T, PressfitError> {
    if let Err(e) = &result {
        tracing::warn!(
            equipment = equipment_id,
            stage = name,
            category = ?e.category(),
            error = %e,
            "assessment stage failed"
        );
    }
    result
}
