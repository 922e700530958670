//! Append-only audit persistence.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::AuditRecord;
use crate::PressfitError;

/// Persistence contract of the audit trail.
///
/// There is no update and no delete. Implementations must reject:
/// - a write to an existing `(entity, sequence)` key with
///   [`PressfitError::ImmutableRecord`]
/// - an append that does not extend the entity's head with
///   [`PressfitError::ChainConflict`]
///
/// A failed append leaves the store unchanged.
pub trait AuditStore: Send + Sync {
    /// Head of the entity's chain.
    fn latest(&self, entity_key: &str) -> Result<Option<AuditRecord>, PressfitError>;

    /// Record at `sequence`.
    fn get(&self, entity_key: &str, sequence: u64) -> Result<Option<AuditRecord>, PressfitError>;

    /// Whole chain in sequence order.
    fn history(&self, entity_key: &str) -> Result<Vec<AuditRecord>, PressfitError>;

    /// Append `record` as the new head.
    fn append(&self, record: &AuditRecord) -> Result<(), PressfitError>;

    /// Keys of every entity with at least one record.
    fn entities(&self) -> Result<Vec<String>, PressfitError>;
}

/// Check that `record` extends `head`. Shared by every store.
pub(crate) fn check_extends(
    entity_key: &str,
    head: Option<&AuditRecord>,
    record: &AuditRecord,
) -> Result<(), PressfitError> {
    let (expected_sequence, expected_chain) = match head {
        Some(h) => (h.sequence.saturating_add(1), h.content_hash.as_str()),
        None => (1, ""),
    };
    if record.sequence != expected_sequence {
        return Err(PressfitError::ChainConflict {
            entity: entity_key.to_string(),
            detail: format!(
                "expected sequence {}, got {}",
                expected_sequence, record.sequence
            ),
        });
    }
    if record.chain_hash != expected_chain {
        return Err(PressfitError::ChainConflict {
            entity: entity_key.to_string(),
            detail: format!(
                "chain_hash '{}' does not match head content_hash '{}'",
                record.chain_hash, expected_chain
            ),
        });
    }
    Ok(())
}

/// Volatile store for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct InMemoryAuditStore {
    chains: Mutex<BTreeMap<String, Vec<AuditRecord>>>,
}

impl InMemoryAuditStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn chains(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Vec<AuditRecord>>>, PressfitError> {
        self.chains
            .lock()
            .map_err(|_| PressfitError::Storage("audit store lock poisoned".to_string()))
    }

    /// Replace a stored record in place, bypassing the append contract.
    /// Simulates tampering with the underlying medium.
    #[cfg(test)]
    pub(crate) fn tamper(&self, record: AuditRecord) -> Result<(), PressfitError> {
        let mut chains = self.chains()?;
        let chain = chains
            .get_mut(&record.entity_key())
            .ok_or_else(|| PressfitError::Storage("no such chain".to_string()))?;
        let slot = chain
            .iter_mut()
            .find(|r| r.sequence == record.sequence)
            .ok_or_else(|| PressfitError::Storage("no such record".to_string()))?;
        *slot = record;
        Ok(())
    }
}

impl AuditStore for InMemoryAuditStore {
    fn latest(&self, entity_key: &str) -> Result<Option<AuditRecord>, PressfitError> {
        Ok(self
            .chains()?
            .get(entity_key)
            .and_then(|chain| chain.last().cloned()))
    }

    fn get(&self, entity_key: &str, sequence: u64) -> Result<Option<AuditRecord>, PressfitError> {
        Ok(self.chains()?.get(entity_key).and_then(|chain| {
            chain.iter().find(|r| r.sequence == sequence).cloned()
        }))
    }

    fn history(&self, entity_key: &str) -> Result<Vec<AuditRecord>, PressfitError> {
        Ok(self
            .chains()?
            .get(entity_key)
            .cloned()
            .unwrap_or_default())
    }

    fn append(&self, record: &AuditRecord) -> Result<(), PressfitError> {
        let key = record.entity_key();
        let mut chains = self.chains()?;
        let chain = chains.entry(key.clone()).or_default();
        if chain.iter().any(|r| r.sequence == record.sequence) {
            return Err(PressfitError::ImmutableRecord(format!(
                "{} #{} already exists",
                key, record.sequence
            )));
        }
        check_extends(&key, chain.last(), record)?;
        chain.push(record.clone());
        Ok(())
    }

    fn entities(&self) -> Result<Vec<String>, PressfitError> {
        Ok(self
            .chains()?
            .iter()
            .filter(|(_, chain)| !chain.is_empty())
            .map(|(key, _)| key.clone())
            .collect())
    }
}
