//! # Audit Trail
//!
//! Append-only, per-entity hash chains.
//!
//! Each [`AuditRecord`] carries a content hash over its own fields and a
//! chain hash equal to the previous record's content hash. Changing any
//! stored record breaks either its own hash or the link from its successor.
//!
//! - [`AuditTrailManager`] builds, appends and verifies records
//! - [`AuditStore`] is the persistence contract (no update, no delete)
//! - [`InMemoryAuditStore`] here, [`crate::storage::RedbAuditStore`] on disk

mod manager;
mod record;
mod store;

pub use manager::{
    AuditRequest, AuditTrailManager, ChainReport, DEFAULT_CLOCK_SKEW_SECONDS, IntegrityReport,
};
pub use record::{AuditEventType, AuditRecord, EntityRef};
pub use store::{AuditStore, InMemoryAuditStore};

pub(crate) use store::check_extends;
