//! # Thresholds Table
//!
//! Static, compiled-in comparison points used by the [`crate::verifier`]
//! and the assessment pipeline.
//!
//! | Equipment | Abs. min (in) | Typ. max (in) | Max P (psi) | Max T (°F) | Internal / External / Thickness (yr) |
//! |-----------|---------------|---------------|-------------|------------|--------------------------------------|
//! | Pressure vessel | 0.0625 | 6.000 | 10000 | 1500 | 10 / 5 / 10 |
//! | Storage tank    | 0.1000 | 2.000 | 15    | 500  | 10 / 5 / 5  |
//! | Piping          | 0.0500 | 3.000 | 6000  | 1500 | 10 / 5 / 5  |
//! | Heat exchanger  | 0.0625 | 4.000 | 5000  | 1200 | 7 / 5 / 7   |
//!
//! There is no mutable global state and no runtime initialisation: every
//! lookup is a `match` over a closed enum.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::primitives::{RSF_ACCEPTANCE, RSF_IMMEDIATE_ACTION};

// =============================================================================
// EQUIPMENT TYPE
// =============================================================================

/// Closed set of equipment classes the thresholds table knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    /// Pressure vessel (ASME VIII-1 / API 510).
    PressureVessel,
    /// Atmospheric or low-pressure storage tank (API 653).
    StorageTank,
    /// Process piping (API 570).
    Piping,
    /// Shell-and-tube heat exchanger shell.
    HeatExchanger,
}

impl EquipmentType {
    /// Every equipment type, in table order.
    pub const ALL: [EquipmentType; 4] = [
        EquipmentType::PressureVessel,
        EquipmentType::StorageTank,
        EquipmentType::Piping,
        EquipmentType::HeatExchanger,
    ];

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            EquipmentType::PressureVessel => "pressure vessel",
            EquipmentType::StorageTank => "storage tank",
            EquipmentType::Piping => "piping",
            EquipmentType::HeatExchanger => "heat exchanger",
        }
    }

    /// Threshold row for this equipment type.
    #[must_use]
    pub fn limits(&self) -> &'static EquipmentLimits {
        match self {
            EquipmentType::PressureVessel => &PRESSURE_VESSEL,
            EquipmentType::StorageTank => &STORAGE_TANK,
            EquipmentType::Piping => &PIPING,
            EquipmentType::HeatExchanger => &HEAT_EXCHANGER,
        }
    }
}

impl std::fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for EquipmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "pressure_vessel" | "vessel" => Ok(EquipmentType::PressureVessel),
            "storage_tank" | "tank" => Ok(EquipmentType::StorageTank),
            "piping" | "pipe" => Ok(EquipmentType::Piping),
            "heat_exchanger" | "exchanger" => Ok(EquipmentType::HeatExchanger),
            other => Err(format!("unknown equipment type '{}'", other)),
        }
    }
}

// =============================================================================
// INSPECTION TYPE
// =============================================================================

/// Inspection categories with distinct code-mandated interval ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionType {
    /// Internal visual inspection.
    Internal,
    /// External visual inspection.
    External,
    /// On-stream thickness measurement.
    Thickness,
}

impl InspectionType {
    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            InspectionType::Internal => "internal",
            InspectionType::External => "external",
            InspectionType::Thickness => "thickness",
        }
    }
}

impl std::fmt::Display for InspectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for InspectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "internal" => Ok(InspectionType::Internal),
            "external" => Ok(InspectionType::External),
            "thickness" | "on_stream" | "on-stream" | "ut" => Ok(InspectionType::Thickness),
            other => Err(format!("unknown inspection type '{}'", other)),
        }
    }
}

// =============================================================================
// EQUIPMENT LIMITS
// =============================================================================

/// Corrosion-rate classification bands (in/yr).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrosionRateRange {
    /// Rates at or below this are "low".
    pub low: Decimal,
    /// Rates at or below this (and above `low`) are "moderate"; above is "high".
    pub high: Decimal,
    /// Rates above this are "severe" and indicate a data or process problem.
    pub severe: Decimal,
}

/// Interval ceilings per inspection type (years).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalCeilings {
    /// Internal inspection ceiling.
    pub internal: Decimal,
    /// External inspection ceiling.
    pub external: Decimal,
    /// Thickness measurement ceiling.
    pub thickness: Decimal,
}

impl IntervalCeilings {
    /// Ceiling for a given inspection type.
    #[must_use]
    pub fn for_inspection(&self, inspection: InspectionType) -> Decimal {
        match inspection {
            InspectionType::Internal => self.internal,
            InspectionType::External => self.external,
            InspectionType::Thickness => self.thickness,
        }
    }
}

/// One row of the thresholds table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquipmentLimits {
    /// Structural (absolute) minimum wall thickness, inches.
    pub min_thickness: Decimal,
    /// Typical maximum wall thickness, inches. Larger values usually mean a
    /// unit or data-entry error.
    pub max_typical_thickness: Decimal,
    /// Maximum design pressure handled by this class, psi.
    pub max_pressure: Decimal,
    /// Maximum design temperature handled by this class, °F.
    pub max_temperature: Decimal,
    /// Corrosion-rate bands.
    pub corrosion_rates: CorrosionRateRange,
    /// Allowable remaining strength factor.
    pub rsf_acceptance: Decimal,
    /// Remaining strength factor requiring immediate action.
    pub rsf_immediate_action: Decimal,
    /// Code-mandated interval ceilings.
    pub intervals: IntervalCeilings,
}

impl EquipmentLimits {
    /// Classify a corrosion rate against this row's bands.
    #[must_use]
    pub fn classify_corrosion_rate(&self, rate: Decimal) -> CorrosionSeverity {
        if rate <= self.corrosion_rates.low {
            CorrosionSeverity::Low
        } else if rate <= self.corrosion_rates.high {
            CorrosionSeverity::Moderate
        } else if rate <= self.corrosion_rates.severe {
            CorrosionSeverity::High
        } else {
            CorrosionSeverity::Severe
        }
    }
}

/// Corrosion-rate classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrosionSeverity {
    /// At or below the low band.
    Low,
    /// Between low and high.
    Moderate,
    /// Between high and severe.
    High,
    /// Above the severe band.
    Severe,
}

const fn dec(num: u32, scale: u32) -> Decimal {
    Decimal::from_parts(num, 0, 0, false, scale)
}

static PRESSURE_VESSEL: EquipmentLimits = EquipmentLimits {
    min_thickness: dec(625, 4),
    max_typical_thickness: dec(6, 0),
    max_pressure: dec(10_000, 0),
    max_temperature: dec(1500, 0),
    corrosion_rates: CorrosionRateRange {
        low: dec(5, 3),
        high: dec(20, 3),
        severe: dec(50, 3),
    },
    rsf_acceptance: RSF_ACCEPTANCE,
    rsf_immediate_action: RSF_IMMEDIATE_ACTION,
    intervals: IntervalCeilings {
        internal: dec(10, 0),
        external: dec(5, 0),
        thickness: dec(10, 0),
    },
};

static STORAGE_TANK: EquipmentLimits = EquipmentLimits {
    min_thickness: dec(1, 1),
    max_typical_thickness: dec(2, 0),
    max_pressure: dec(15, 0),
    max_temperature: dec(500, 0),
    corrosion_rates: CorrosionRateRange {
        low: dec(5, 3),
        high: dec(15, 3),
        severe: dec(40, 3),
    },
    rsf_acceptance: RSF_ACCEPTANCE,
    rsf_immediate_action: RSF_IMMEDIATE_ACTION,
    intervals: IntervalCeilings {
        internal: dec(10, 0),
        external: dec(5, 0),
        thickness: dec(5, 0),
    },
};

static PIPING: EquipmentLimits = EquipmentLimits {
    min_thickness: dec(5, 2),
    max_typical_thickness: dec(3, 0),
    max_pressure: dec(6000, 0),
    max_temperature: dec(1500, 0),
    corrosion_rates: CorrosionRateRange {
        low: dec(5, 3),
        high: dec(25, 3),
        severe: dec(60, 3),
    },
    rsf_acceptance: RSF_ACCEPTANCE,
    rsf_immediate_action: RSF_IMMEDIATE_ACTION,
    intervals: IntervalCeilings {
        internal: dec(10, 0),
        external: dec(5, 0),
        thickness: dec(5, 0),
    },
};

static HEAT_EXCHANGER: EquipmentLimits = EquipmentLimits {
    min_thickness: dec(625, 4),
    max_typical_thickness: dec(4, 0),
    max_pressure: dec(5000, 0),
    max_temperature: dec(1200, 0),
    corrosion_rates: CorrosionRateRange {
        low: dec(5, 3),
        high: dec(20, 3),
        severe: dec(50, 3),
    },
    rsf_acceptance: RSF_ACCEPTANCE,
    rsf_immediate_action: RSF_IMMEDIATE_ACTION,
    intervals: IntervalCeilings {
        internal: dec(7, 0),
        external: dec(5, 0),
        thickness: dec(7, 0),
    },
};

// =============================================================================
// MATERIAL FAMILIES
// =============================================================================

/// Material families with distinct creep-range onset temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialFamily {
    /// Carbon and carbon-manganese steel (SA-516, SA-106, SA-285, ...).
    CarbonSteel,
    /// Cr-Mo low-alloy steel (SA-387, SA-335 P11/P22, ...).
    LowAlloy,
    /// Austenitic stainless steel (SA-240 304/316, SA-312, ...).
    StainlessSteel,
    /// Nickel-base alloy (SB-168, SB-443, ...).
    NickelAlloy,
    /// Aluminum alloy (SB-209, ...).
    Aluminum,
}

impl MaterialFamily {
    /// Temperature (°F) above which time-dependent creep governs and a
    /// Level 1 assessment no longer applies.
    #[must_use]
    pub fn creep_onset_temperature(&self) -> Decimal {
        match self {
            MaterialFamily::CarbonSteel => dec(700, 0),
            MaterialFamily::LowAlloy => dec(800, 0),
            MaterialFamily::StainlessSteel => dec(950, 0),
            MaterialFamily::NickelAlloy => dec(1100, 0),
            MaterialFamily::Aluminum => dec(300, 0),
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            MaterialFamily::CarbonSteel => "carbon steel",
            MaterialFamily::LowAlloy => "low-alloy Cr-Mo steel",
            MaterialFamily::StainlessSteel => "stainless steel",
            MaterialFamily::NickelAlloy => "nickel alloy",
            MaterialFamily::Aluminum => "aluminum alloy",
        }
    }

    /// Classify an ASME/ASTM material specification string.
    ///
    /// Unknown specifications fall back to [`MaterialFamily::CarbonSteel`],
    /// which has the lowest creep onset of the steels and is therefore the
    /// conservative choice for creep screening.
    #[must_use]
    pub fn from_specification(spec: &str) -> Self {
        let normalized: String = spec
            .to_ascii_uppercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        const STAINLESS: [&str; 7] = ["304", "316", "321", "347", "SA240", "SA312", "STAINLESS"];
        const LOW_ALLOY: [&str; 6] = ["SA387", "SA335", "SA182F", "P11", "P22", "CRMO"];
        const NICKEL: [&str; 5] = ["SB168", "SB443", "SB409", "INCONEL", "ALLOY600"];
        const ALUMINUM: [&str; 3] = ["SB209", "SB241", "ALUMINUM"];

        if NICKEL.iter().any(|m| normalized.contains(m)) {
            MaterialFamily::NickelAlloy
        } else if ALUMINUM.iter().any(|m| normalized.contains(m)) {
            MaterialFamily::Aluminum
        } else if LOW_ALLOY.iter().any(|m| normalized.contains(m)) {
            MaterialFamily::LowAlloy
        } else if STAINLESS.iter().any(|m| normalized.contains(m)) {
            MaterialFamily::StainlessSteel
        } else {
            MaterialFamily::CarbonSteel
        }
    }
}

impl std::fmt::Display for MaterialFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
