//! # redb-backed Audit Storage
//!
//! A disk-backed [`AuditStore`] using the redb embedded database.
//!
//! redb provides what the audit trail needs from a medium:
//! - ACID transactions (an append is one write transaction)
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//!
//! Records are keyed by `(entity_key, sequence)` and stored as postcard
//! bytes. The head check and the insert happen inside the same write
//! transaction, so two processes sharing a file cannot fork a chain.

use crate::PressfitError;
use crate::audit::{AuditRecord, AuditStore, check_extends};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;

/// Table for audit records: (entity_key, sequence) -> postcard AuditRecord
const AUDIT_RECORDS: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("audit_records");

/// A disk-backed, append-only audit store.
pub struct RedbAuditStore {
    db: Database,
}

impl std::fmt::Debug for RedbAuditStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbAuditStore").finish_non_exhaustive()
    }
}

fn storage_err(e: impl std::fmt::Display) -> PressfitError {
    PressfitError::Storage(e.to_string())
}

fn decode(bytes: &[u8]) -> Result<AuditRecord, PressfitError> {
    postcard::from_bytes(bytes).map_err(|e| PressfitError::Serialization(e.to_string()))
}

impl RedbAuditStore {
    /// Open or create an audit database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PressfitError> {
        let db = Database::create(path.as_ref()).map_err(storage_err)?;

        // Initialize the table if it doesn't exist
        {
            let write_txn = db.begin_write().map_err(storage_err)?;
            let _ = write_txn.open_table(AUDIT_RECORDS).map_err(storage_err)?;
            write_txn.commit().map_err(storage_err)?;
        }

        Ok(Self { db })
    }

    /// Open an audit database that must already exist.
    ///
    /// Read-only callers use this so a mistyped path fails instead of
    /// yielding a fresh, empty trail.
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self, PressfitError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PressfitError::Storage(format!(
                "audit database {} does not exist",
                path.display()
            )));
        }
        let db = Database::open(path).map_err(storage_err)?;
        Ok(Self { db })
    }

    /// Number of records across all entities.
    pub fn record_count(&self) -> Result<u64, PressfitError> {
        use redb::ReadableTableMetadata;

        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(AUDIT_RECORDS).map_err(storage_err)?;
        table.len().map_err(storage_err)
    }
}

impl AuditStore for RedbAuditStore {
    fn latest(&self, entity_key: &str) -> Result<Option<AuditRecord>, PressfitError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(AUDIT_RECORDS).map_err(storage_err)?;
        let mut range = table
            .range((entity_key, 0u64)..=(entity_key, u64::MAX))
            .map_err(storage_err)?;
        match range.next_back() {
            Some(entry) => {
                let (_, value) = entry.map_err(storage_err)?;
                Ok(Some(decode(value.value())?))
            }
            None => Ok(None),
        }
    }

    fn get(&self, entity_key: &str, sequence: u64) -> Result<Option<AuditRecord>, PressfitError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(AUDIT_RECORDS).map_err(storage_err)?;
        match table.get((entity_key, sequence)).map_err(storage_err)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    fn history(&self, entity_key: &str) -> Result<Vec<AuditRecord>, PressfitError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(AUDIT_RECORDS).map_err(storage_err)?;
        let mut records = Vec::new();
        for entry in table
            .range((entity_key, 0u64)..=(entity_key, u64::MAX))
            .map_err(storage_err)?
        {
            let (_, value) = entry.map_err(storage_err)?;
            records.push(decode(value.value())?);
        }
        Ok(records)
    }

    fn append(&self, record: &AuditRecord) -> Result<(), PressfitError> {
        let key = record.entity_key();
        let bytes = postcard::to_allocvec(record)
            .map_err(|e| PressfitError::Serialization(e.to_string()))?;

        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(AUDIT_RECORDS).map_err(storage_err)?;

            if table
                .get((key.as_str(), record.sequence))
                .map_err(storage_err)?
                .is_some()
            {
                return Err(PressfitError::ImmutableRecord(format!(
                    "{} #{} already exists",
                    key, record.sequence
                )));
            }

            let head = {
                let mut range = table
                    .range((key.as_str(), 0u64)..=(key.as_str(), u64::MAX))
                    .map_err(storage_err)?;
                match range.next_back() {
                    Some(entry) => {
                        let (_, value) = entry.map_err(storage_err)?;
                        Some(decode(value.value())?)
                    }
                    None => None,
                }
            };
            check_extends(&key, head.as_ref(), record)?;

            table
                .insert((key.as_str(), record.sequence), bytes.as_slice())
                .map_err(storage_err)?;
        }
        // Dropping an uncommitted transaction aborts it, so early returns
        // above leave the file unchanged.
        write_txn.commit().map_err(storage_err)?;
        Ok(())
    }

    fn entities(&self) -> Result<Vec<String>, PressfitError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(AUDIT_RECORDS).map_err(storage_err)?;
        let mut keys: Vec<String> = Vec::new();
        for entry in table.iter().map_err(storage_err)? {
            let (key, _) = entry.map_err(storage_err)?;
            let (entity_key, _) = key.value();
            if keys.last().map(String::as_str) != Some(entity_key) {
                keys.push(entity_key.to_string());
            }
        }
        Ok(keys)
    }
}
