//! Audit record, event types and the content hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::PressfitError;
use crate::canonical::content_hash;

/// Closed set of audited state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// A single engine result was recorded.
    CalculationPerformed,
    /// A full Level 1 assessment report was recorded.
    AssessmentCompleted,
    InspectionRecorded,
    EquipmentCreated,
    EquipmentUpdated,
    /// An integrity check was run and its outcome recorded.
    RecordVerified,
}

impl AuditEventType {
    /// Every variant, in declaration order.
    pub const ALL: [AuditEventType; 6] = [
        AuditEventType::CalculationPerformed,
        AuditEventType::AssessmentCompleted,
        AuditEventType::InspectionRecorded,
        AuditEventType::EquipmentCreated,
        AuditEventType::EquipmentUpdated,
        AuditEventType::RecordVerified,
    ];

    /// Stable tag.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            AuditEventType::CalculationPerformed => "calculation_performed",
            AuditEventType::AssessmentCompleted => "assessment_completed",
            AuditEventType::InspectionRecorded => "inspection_recorded",
            AuditEventType::EquipmentCreated => "equipment_created",
            AuditEventType::EquipmentUpdated => "equipment_updated",
            AuditEventType::RecordVerified => "record_verified",
        }
    }
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for AuditEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuditEventType::ALL
            .into_iter()
            .find(|e| e.tag() == s)
            .ok_or_else(|| format!("unknown audit event type '{}'", s))
    }
}

/// Identity of an audited entity. One hash chain exists per entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Kind of entity, e.g. `equipment`. Never contains `/`.
    pub entity_type: String,
    /// Identifier within the type, e.g. `V-101`.
    pub entity_id: String,
}

impl EntityRef {
    /// Build a validated reference. `entity_type` may not contain `/`.
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Result<Self, PressfitError> {
        let entity = Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
        };
        entity.validate()?;
        Ok(entity)
    }

    /// Reject empty parts and a `/` in the type.
    pub fn validate(&self) -> Result<(), PressfitError> {
        if self.entity_type.trim().is_empty() {
            return Err(PressfitError::invalid("entity_type", "must not be empty"));
        }
        if self.entity_type.contains('/') {
            return Err(PressfitError::invalid("entity_type", "must not contain '/'"));
        }
        if self.entity_id.trim().is_empty() {
            return Err(PressfitError::invalid("entity_id", "must not be empty"));
        }
        Ok(())
    }

    /// Storage key: `type/id`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}/{}", self.entity_type, self.entity_id)
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.entity_type, self.entity_id)
    }
}

impl std::str::FromStr for EntityRef {
    type Err = PressfitError;

    /// Parse `type/id`. The id may itself contain `/`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((entity_type, entity_id)) => EntityRef::new(entity_type, entity_id),
            None => Err(PressfitError::invalid(
                "entity",
                format!("expected 'type/id', got '{}'", s),
            )),
        }
    }
}

/// One immutable entry in an entity's audit chain.
///
/// `before_state` and `after_state` hold canonical JSON text. Every field
/// except `content_hash` is covered by `content_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique per record, independent of the chain position.
    pub record_id: Uuid,
    pub event_type: AuditEventType,
    pub entity_type: String,
    pub entity_id: String,
    /// 1-based position in the entity's chain.
    pub sequence: u64,
    /// Never earlier than the predecessor's timestamp.
    pub event_timestamp: DateTime<Utc>,
    /// Who caused the event.
    pub actor: String,
    /// Canonical JSON of the prior state, if the event replaced one.
    pub before_state: Option<String>,
    /// Canonical JSON of the resulting state.
    pub after_state: String,
    /// Code clause the recorded values were computed under.
    pub standard_reference: Option<String>,
    /// `content_hash` of the previous record, empty for the first.
    pub chain_hash: String,
    /// Hex blake3 digest of every other field.
    pub content_hash: String,
}

/// The hashed view of a record: everything but `content_hash`.
#[derive(Serialize)]
struct HashedFields<'a> {
    record_id: &'a Uuid,
    event_type: AuditEventType,
    entity_type: &'a str,
    entity_id: &'a str,
    sequence: u64,
    event_timestamp: &'a DateTime<Utc>,
    actor: &'a str,
    before_state: Option<&'a str>,
    after_state: &'a str,
    standard_reference: Option<&'a str>,
    chain_hash: &'a str,
}

impl AuditRecord {
    /// Recompute the content hash from the record's own fields.
    pub fn compute_content_hash(&self) -> Result<String, PressfitError> {
        content_hash(&HashedFields {
            record_id: &self.record_id,
            event_type: self.event_type,
            entity_type: &self.entity_type,
            entity_id: &self.entity_id,
            sequence: self.sequence,
            event_timestamp: &self.event_timestamp,
            actor: &self.actor,
            before_state: self.before_state.as_deref(),
            after_state: &self.after_state,
            standard_reference: self.standard_reference.as_deref(),
            chain_hash: &self.chain_hash,
        })
    }

    #[must_use]
    pub fn entity(&self) -> EntityRef {
        EntityRef {
            entity_type: self.entity_type.clone(),
            entity_id: self.entity_id.clone(),
        }
    }

    /// Storage key: `type/id`.
    #[must_use]
    pub fn entity_key(&self) -> String {
        format!("{}/{}", self.entity_type, self.entity_id)
    }

    /// Parse `after_state` back into JSON.
    pub fn after_state_value(&self) -> Result<Value, PressfitError> {
        serde_json::from_str(&self.after_state)
            .map_err(|e| PressfitError::Serialization(e.to_string()))
    }

    #[must_use]
    pub fn is_genesis(&self) -> bool {
        self.sequence == 1
    }
}
