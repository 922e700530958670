//! # pressfit-core
//!
//! The dual-path fitness-for-service engine for pressfit - THE LOGIC.
//!
//! This crate computes the four safety-critical quantities of a Level 1
//! fitness-for-service assessment of pressure equipment (minimum required
//! thickness, remaining strength factor, MAWP, remaining life), each by two
//! independent methods that must agree before a result exists, and records
//! every result in an append-only, hash-chained audit trail.
//!
//! ## Layout
//!
//! - `primitives` / `thresholds` → compiled-in constants and limit tables
//! - `engine` → dual-path calculations
//! - `verifier` → threshold and cross-quantity checks
//! - `audit` / `storage` → hash-chained records, in memory or on redb
//! - `assessment` → the Level 1 pipeline tying them together
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Uses exact decimal arithmetic only (no binary floating point)
//! - Never panics; every failure is a `PressfitError`
//! - Never silently resolves a disagreement between the two paths
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod assessment;
pub mod audit;
pub mod canonical;
pub mod engine;
pub mod numeric;
pub mod primitives;
pub mod storage;
pub mod thresholds;
pub mod types;
pub mod verifier;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CalculationDiscrepancy, ConfidenceLevel, ErrorCategory, PressfitError, Quantity,
    RecommendedAction, VerificationMethod, VerifiedResult,
};

// =============================================================================
// RE-EXPORTS: Engine & Verifier
// =============================================================================

pub use engine::{CalculationEngine, EngineSettings, check_agreement};
pub use thresholds::{CorrosionSeverity, EquipmentLimits, EquipmentType, InspectionType, MaterialFamily};
pub use verifier::{
    CrossCheckReport, IntervalCheck, MaterialData, PressureData, RsfCheck, ThicknessCheck,
    ThicknessData, Verifier,
};

// =============================================================================
// RE-EXPORTS: Audit Trail
// =============================================================================

pub use audit::{
    AuditEventType, AuditRecord, AuditRequest, AuditStore, AuditTrailManager, ChainReport,
    EntityRef, InMemoryAuditStore, IntegrityReport,
};
pub use storage::RedbAuditStore;

// =============================================================================
// RE-EXPORTS: Assessment
// =============================================================================

pub use assessment::{
    AssessmentReport, Assessor, EquipmentData, InspectionData, Level1Outcome, RecordedAssessment,
};
