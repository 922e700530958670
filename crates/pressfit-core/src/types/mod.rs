//! # Core Type Definitions
//!
//! This module contains the shared types of the pressfit CORE:
//! - Calculation outputs (`VerifiedResult`, `VerificationMethod`, `Quantity`)
//! - Calculation inputs that are not plain scalars (`ConfidenceLevel`)
//! - RSF action bands (`RecommendedAction`)
//! - Error types (`PressfitError`, `CalculationDiscrepancy`, `ErrorCategory`)
//!
//! ## Exactness Guarantees
//!
//! All quantities are `rust_decimal::Decimal`. No type in this module
//! holds or produces binary floating point.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// QUANTITIES
// =============================================================================

/// The four safety-critical quantities the engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    /// Minimum required wall thickness (in).
    MinimumThickness,
    /// Remaining strength factor (dimensionless, 0..=1).
    RemainingStrengthFactor,
    /// Maximum allowable working pressure (psi).
    Mawp,
    /// Remaining service life (years).
    RemainingLife,
}

impl Quantity {
    /// Unit label used in reports.
    #[must_use]
    pub fn unit(&self) -> &'static str {
        match self {
            Quantity::MinimumThickness => "in",
            Quantity::RemainingStrengthFactor => "",
            Quantity::Mawp => "psi",
            Quantity::RemainingLife => "years",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Quantity::MinimumThickness => "minimum required thickness",
            Quantity::RemainingStrengthFactor => "remaining strength factor",
            Quantity::Mawp => "MAWP",
            Quantity::RemainingLife => "remaining life",
        }
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The independent technique used to produce `secondary_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// Newton-Raphson root solve of the pressure equation.
    NewtonIteration,
    /// `1 − metal_loss / allowable_loss`.
    MetalLossRatio,
    /// Minimum-thickness formula solved backwards at the primary MAWP.
    ReverseSolve,
    /// Diameter-based equivalent MAWP formula (`2SEt / (D + 1.2t)`).
    DiameterFormula,
    /// Discrete year-by-year thickness depletion.
    DepletionSimulation,
    /// Direct formula re-derived from the corrosion allowance, used when the
    /// depletion simulation would exceed its year cap.
    DirectFormulaFallback,
    /// No measurable loss: both paths return the life cap.
    NoMeasurableLoss,
}

impl VerificationMethod {
    /// Stable tag written to reports and audit snapshots.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            VerificationMethod::NewtonIteration => "newton_iteration",
            VerificationMethod::MetalLossRatio => "metal_loss_ratio",
            VerificationMethod::ReverseSolve => "reverse_solve",
            VerificationMethod::DiameterFormula => "diameter_formula",
            VerificationMethod::DepletionSimulation => "depletion_simulation",
            VerificationMethod::DirectFormulaFallback => "direct_formula_fallback",
            VerificationMethod::NoMeasurableLoss => "no_measurable_loss",
        }
    }
}

impl std::fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Confidence applied to a measured corrosion rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// Rate scaled by 1.25.
    #[default]
    Conservative,
    /// Rate used as measured.
    Average,
    /// Rate scaled by 0.75.
    Optimistic,
}

impl ConfidenceLevel {
    /// Multiplier applied to the corrosion rate.
    #[must_use]
    pub fn factor(&self) -> Decimal {
        match self {
            ConfidenceLevel::Conservative => Decimal::new(125, 2),
            ConfidenceLevel::Average => Decimal::ONE,
            ConfidenceLevel::Optimistic => Decimal::new(75, 2),
        }
    }

    /// Stable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ConfidenceLevel::Conservative => "conservative",
            ConfidenceLevel::Average => "average",
            ConfidenceLevel::Optimistic => "optimistic",
        }
    }
}

impl std::str::FromStr for ConfidenceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(ConfidenceLevel::Conservative),
            "average" => Ok(ConfidenceLevel::Average),
            "optimistic" => Ok(ConfidenceLevel::Optimistic),
            other => Err(format!("unknown confidence level '{}'", other)),
        }
    }
}

/// Action mapped from an RSF band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    /// RSF >= 0.90.
    ContinueOperation,
    /// 0.80 <= RSF < 0.90.
    IncreaseInspectionFrequency,
    /// 0.60 <= RSF < 0.80.
    Level2Or3Assessment,
    /// RSF < 0.60.
    ImmediateAction,
}

impl RecommendedAction {
    /// Band lookup.
    #[must_use]
    pub fn for_rsf(rsf: Decimal) -> Self {
        use crate::primitives::{RSF_ACCEPTANCE, RSF_IMMEDIATE_ACTION, RSF_MONITORING};

        if rsf >= RSF_ACCEPTANCE {
            RecommendedAction::ContinueOperation
        } else if rsf >= RSF_MONITORING {
            RecommendedAction::IncreaseInspectionFrequency
        } else if rsf >= RSF_IMMEDIATE_ACTION {
            RecommendedAction::Level2Or3Assessment
        } else {
            RecommendedAction::ImmediateAction
        }
    }

    /// Report text.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            RecommendedAction::ContinueOperation => "continue operation",
            RecommendedAction::IncreaseInspectionFrequency => "increase inspection frequency",
            RecommendedAction::Level2Or3Assessment => "Level 2/3 assessment",
            RecommendedAction::ImmediateAction => "immediate action required",
        }
    }
}

impl std::fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

// =============================================================================
// VERIFIED RESULT
// =============================================================================

/// Output of every engine operation.
///
/// A `VerifiedResult` only exists if both independent methods agreed within
/// `tolerance_used`. Fields are public for reporting, but nothing in the
/// crate mutates a result after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedResult {
    /// Which quantity this is.
    pub quantity: Quantity,
    /// Accepted value, rounded in the conservative direction for `quantity`.
    pub value: Decimal,
    /// Unrounded output of the primary method.
    pub primary_value: Decimal,
    /// Unrounded output of the secondary method.
    pub secondary_value: Decimal,
    /// Secondary technique.
    pub verification_method: VerificationMethod,
    /// When the calculation completed.
    pub timestamp: DateTime<Utc>,
    /// Globally unique calculation identifier.
    pub calculation_id: Uuid,
    /// Citation for the governing formula.
    pub standard_reference: String,
    /// Relative tolerance the two paths were held to.
    pub tolerance_used: Decimal,
    /// Ordered assumptions.
    pub assumptions: Vec<String>,
    /// Ordered warnings.
    pub warnings: Vec<String>,
}

impl VerifiedResult {
    /// Difference between the two paths, relative unless either is zero.
    #[must_use]
    pub fn path_difference(&self) -> Decimal {
        crate::numeric::relative_difference(self.primary_value, self.secondary_value)
    }

    /// Whether the dual-path invariant holds for this result.
    #[must_use]
    pub fn paths_agree(&self) -> bool {
        self.path_difference() <= self.tolerance_used
    }

    /// Whether any warnings were raised.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Payload of a dual-path disagreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationDiscrepancy {
    /// Quantity being computed.
    pub quantity: Quantity,
    /// Primary method output.
    pub primary: Decimal,
    /// Secondary method output.
    pub secondary: Decimal,
    /// Observed difference (relative, or absolute when either value is zero).
    pub difference: Decimal,
    /// Tolerance that was exceeded.
    pub tolerance: Decimal,
    /// Citation for the governing formula.
    pub standard_reference: String,
}

impl std::fmt::Display for CalculationDiscrepancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: primary {} vs secondary {} differ by {} (tolerance {}) [{}]",
            self.quantity,
            self.primary,
            self.secondary,
            self.difference,
            self.tolerance,
            self.standard_reference
        )
    }
}

/// The four failure categories callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Out-of-domain scalar input.
    InputValidation,
    /// Individually valid inputs that are jointly impossible.
    PhysicalInfeasibility,
    /// The two calculation paths disagree.
    DualPathDiscrepancy,
    /// Persistence, serialization or configuration failure.
    Storage,
}

/// Errors that can occur in the pressfit CORE.
///
/// - No silent failures
/// - Use `Result<T, PressfitError>` for fallible operations
/// - The CORE never panics; nothing is retried internally
#[derive(Debug, Error)]
pub enum PressfitError {
    /// A scalar input is out of its domain.
    #[error("Invalid input '{field}': {reason}")]
    InvalidInput {
        /// Input name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Inputs are individually valid but jointly impossible.
    #[error("Physically infeasible: {relationship}")]
    PhysicallyInfeasible {
        /// The relationship that failed.
        relationship: String,
    },

    /// The two independent calculation paths disagree beyond tolerance.
    #[error("Calculation discrepancy: {0}")]
    Discrepancy(CalculationDiscrepancy),

    /// Checked decimal arithmetic overflowed or divided by zero.
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    /// The persistence layer failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A write would overwrite or remove an existing audit record.
    #[error("Audit record is immutable: {0}")]
    ImmutableRecord(String),

    /// An append does not extend the current head of the entity's chain.
    #[error("Chain conflict for {entity}: {detail}")]
    ChainConflict {
        /// Entity key (`type/id`).
        entity: String,
        /// Which link failed.
        detail: String,
    },

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Engine settings are out of range.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PressfitError {
    /// Shorthand for an [`PressfitError::InvalidInput`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`PressfitError::PhysicallyInfeasible`].
    pub fn infeasible(relationship: impl Into<String>) -> Self {
        Self::PhysicallyInfeasible {
            relationship: relationship.into(),
        }
    }

    /// Failure category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            PressfitError::InvalidInput { .. } | PressfitError::Config(_) => {
                ErrorCategory::InputValidation
            }
            PressfitError::PhysicallyInfeasible { .. } | PressfitError::Arithmetic(_) => {
                ErrorCategory::PhysicalInfeasibility
            }
            PressfitError::Discrepancy(_) => ErrorCategory::DualPathDiscrepancy,
            PressfitError::Storage(_)
            | PressfitError::ImmutableRecord(_)
            | PressfitError::ChainConflict { .. }
            | PressfitError::Serialization(_) => ErrorCategory::Storage,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
