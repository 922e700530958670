//! Record creation, serialized appends and integrity verification.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{AuditEventType, AuditRecord, AuditStore, EntityRef};
use crate::PressfitError;
use crate::canonical::to_canonical_json;

/// Default allowance for clock skew when checking that a record is not
/// from the future.
pub const DEFAULT_CLOCK_SKEW_SECONDS: i64 = 300;

/// Everything the caller supplies for one audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRequest {
    pub event_type: AuditEventType,
    /// Chain the record is appended to.
    pub entity: EntityRef,
    /// Stored as canonical JSON.
    pub after_state: Value,
    pub before_state: Option<Value>,
    /// Must not be blank.
    pub actor: String,
    pub standard_reference: Option<String>,
}

impl AuditRequest {
    /// Request with no before-state and no standard reference.
    pub fn new(
        event_type: AuditEventType,
        entity: EntityRef,
        after_state: Value,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            event_type,
            entity,
            after_state,
            before_state: None,
            actor: actor.into(),
            standard_reference: None,
        }
    }

    #[must_use]
    pub fn with_before_state(mut self, before: Value) -> Self {
        self.before_state = Some(before);
        self
    }

    #[must_use]
    pub fn with_standard_reference(mut self, reference: impl Into<String>) -> Self {
        self.standard_reference = Some(reference.into());
        self
    }
}

/// Result of [`AuditTrailManager::verify_integrity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// All three checks hold.
    pub valid: bool,
    /// Recomputed content hash equals the stored one.
    pub hash_valid: bool,
    /// `chain_hash` links to the predecessor.
    pub chain_valid: bool,
    /// Not in the future and not before the predecessor.
    pub timestamp_valid: bool,
    /// One line per failed check.
    pub errors: Vec<String>,
}

/// Result of [`AuditTrailManager::verify_chain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainReport {
    /// Entity key (`type/id`).
    pub entity: String,
    /// Number of stored records.
    pub length: usize,
    /// Every record passes and the sequence has no gaps.
    pub valid: bool,
    /// Per record, in sequence order.
    pub records: Vec<(u64, IntegrityReport)>,
    /// Chain-level problems such as sequence gaps.
    pub errors: Vec<String>,
}

/// Writes and verifies hash-chained audit records on top of an
/// [`AuditStore`].
///
/// Appends for the same entity are serialized by a per-entity lock so two
/// writers can never read the same head; appends for different entities
/// proceed in parallel. A lock lives only while some append for its entity
/// is in flight, so the lock table stays as small as the set of active
/// writers.
pub struct AuditTrailManager<S: AuditStore> {
    store: S,
    locks: Mutex<BTreeMap<String, Arc<Mutex<()>>>>,
    clock_skew: Duration,
}

impl<S: AuditStore> std::fmt::Debug for AuditTrailManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditTrailManager")
            .field("clock_skew", &self.clock_skew)
            .finish_non_exhaustive()
    }
}

impl<S: AuditStore> AuditTrailManager<S> {
    /// Manager over `store` with the default clock-skew allowance.
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: Mutex::new(BTreeMap::new()),
            clock_skew: Duration::seconds(DEFAULT_CLOCK_SKEW_SECONDS),
        }
    }

    /// How far ahead of now a record timestamp may be before it is flagged.
    #[must_use]
    pub fn with_clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Build the next record for the request's entity without persisting it.
    ///
    /// The record links to the current head (`chain_hash`), takes the next
    /// sequence number, and is sealed with its content hash. Nothing in the
    /// store is touched.
    pub fn create_record(&self, request: &AuditRequest) -> Result<AuditRecord, PressfitError> {
        request.entity.validate()?;
        if request.actor.trim().is_empty() {
            return Err(PressfitError::invalid("actor", "must not be empty"));
        }

        let key = request.entity.key();
        let head = self.store.latest(&key)?;

        let now = Utc::now();
        let (sequence, chain_hash, event_timestamp) = match &head {
            Some(h) => (
                h.sequence.saturating_add(1),
                h.content_hash.clone(),
                now.max(h.event_timestamp),
            ),
            None => (1, String::new(), now),
        };

        let mut record = AuditRecord {
            record_id: Uuid::new_v4(),
            event_type: request.event_type,
            entity_type: request.entity.entity_type.clone(),
            entity_id: request.entity.entity_id.clone(),
            sequence,
            event_timestamp,
            actor: request.actor.clone(),
            before_state: request
                .before_state
                .as_ref()
                .map(to_canonical_json)
                .transpose()?,
            after_state: to_canonical_json(&request.after_state)?,
            standard_reference: request.standard_reference.clone(),
            chain_hash,
            content_hash: String::new(),
        };
        record.content_hash = record.compute_content_hash()?;
        Ok(record)
    }

    /// Create and persist the next record for the request's entity.
    ///
    /// If the store rejects the write nothing is recorded and the error is
    /// returned.
    pub fn append(&self, request: &AuditRequest) -> Result<AuditRecord, PressfitError> {
        let key = request.entity.key();
        let entity_lock = self.entity_lock(&key)?;
        let result = match entity_lock.lock() {
            Ok(_guard) => self.append_locked(&key, request),
            Err(_) => Err(PressfitError::Storage(format!(
                "entity lock poisoned for {}",
                key
            ))),
        };
        self.release_entity_lock(&key, entity_lock);
        result
    }

    fn append_locked(&self, key: &str, request: &AuditRequest) -> Result<AuditRecord, PressfitError> {
        let record = self.create_record(request)?;
        if let Err(e) = self.store.append(&record) {
            tracing::warn!(entity = %key, sequence = record.sequence, error = %e, "audit append rejected");
            return Err(e);
        }
        tracing::info!(
            entity = %key,
            sequence = record.sequence,
            event = %record.event_type,
            content_hash = %record.content_hash,
            "audit record appended"
        );
        Ok(record)
    }

    fn entity_lock(&self, key: &str) -> Result<Arc<Mutex<()>>, PressfitError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| PressfitError::Storage("audit lock table poisoned".to_string()))?;
        Ok(Arc::clone(locks.entry(key.to_string()).or_default()))
    }

    /// Drop the entity's lock entry once no other writer holds it.
    ///
    /// Clones are only handed out under the table lock, so a count of two
    /// (the table and `held`) means nobody is waiting on it.
    fn release_entity_lock(&self, key: &str, held: Arc<Mutex<()>>) {
        let Ok(mut locks) = self.locks.lock() else {
            return;
        };
        let idle = locks
            .get(key)
            .is_some_and(|entry| Arc::ptr_eq(entry, &held) && Arc::strong_count(&held) == 2);
        if idle {
            locks.remove(key);
        }
    }

    /// Check one record's hash, its link to the stored predecessor, and its
    /// timestamp.
    pub fn verify_integrity(&self, record: &AuditRecord) -> Result<IntegrityReport, PressfitError> {
        let mut errors = Vec::new();

        let recomputed = record.compute_content_hash()?;
        let hash_valid = recomputed == record.content_hash;
        if !hash_valid {
            errors.push(format!(
                "content hash mismatch: stored {}, recomputed {}",
                record.content_hash, recomputed
            ));
        }

        let key = record.entity_key();
        let predecessor = if record.sequence > 1 {
            self.store.get(&key, record.sequence - 1)?
        } else {
            None
        };

        let chain_valid = if record.sequence == 0 {
            errors.push("sequence must start at 1".to_string());
            false
        } else if record.sequence == 1 {
            let ok = record.chain_hash.is_empty();
            if !ok {
                errors.push("first record must have an empty chain hash".to_string());
            }
            ok
        } else {
            match &predecessor {
                None => {
                    errors.push(format!(
                        "predecessor #{} not found",
                        record.sequence - 1
                    ));
                    false
                }
                Some(prev) => {
                    let mut ok = true;
                    if prev.content_hash != record.chain_hash {
                        ok = false;
                        errors.push(format!(
                            "chain hash {} does not match predecessor content hash {}",
                            record.chain_hash, prev.content_hash
                        ));
                    }
                    let prev_recomputed = prev.compute_content_hash()?;
                    if prev_recomputed != record.chain_hash {
                        ok = false;
                        errors.push(format!(
                            "chain hash {} does not match predecessor's recomputed hash {}",
                            record.chain_hash, prev_recomputed
                        ));
                    }
                    ok
                }
            }
        };

        let mut timestamp_valid = true;
        let horizon = Utc::now()
            .checked_add_signed(self.clock_skew)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        if record.event_timestamp > horizon {
            timestamp_valid = false;
            errors.push(format!(
                "timestamp {} is in the future",
                record.event_timestamp.to_rfc3339()
            ));
        }
        if let Some(prev) = &predecessor {
            if record.event_timestamp < prev.event_timestamp {
                timestamp_valid = false;
                errors.push(format!(
                    "timestamp {} precedes predecessor timestamp {}",
                    record.event_timestamp.to_rfc3339(),
                    prev.event_timestamp.to_rfc3339()
                ));
            }
        }

        let valid = hash_valid && chain_valid && timestamp_valid;
        if !valid {
            tracing::warn!(
                entity = %key,
                sequence = record.sequence,
                hash_valid,
                chain_valid,
                timestamp_valid,
                "audit record failed integrity verification"
            );
        }
        Ok(IntegrityReport {
            valid,
            hash_valid,
            chain_valid,
            timestamp_valid,
            errors,
        })
    }

    /// Verify every record of an entity and the sequence itself.
    pub fn verify_chain(&self, entity: &EntityRef) -> Result<ChainReport, PressfitError> {
        let key = entity.key();
        let history = self.store.history(&key)?;
        let mut errors = Vec::new();
        let mut records = Vec::with_capacity(history.len());

        for (index, record) in history.iter().enumerate() {
            let expected = index as u64 + 1;
            if record.sequence != expected {
                errors.push(format!(
                    "sequence gap: expected #{}, found #{}",
                    expected, record.sequence
                ));
            }
            records.push((record.sequence, self.verify_integrity(record)?));
        }

        let valid = errors.is_empty() && records.iter().all(|(_, report)| report.valid);
        Ok(ChainReport {
            entity: key,
            length: history.len(),
            valid,
            records,
            errors,
        })
    }

    pub fn history(&self, entity: &EntityRef) -> Result<Vec<AuditRecord>, PressfitError> {
        self.store.history(&entity.key())
    }
}
