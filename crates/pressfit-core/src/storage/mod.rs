//! # Storage Module
//!
//! Disk-backed persistence for the audit trail.

mod redb_audit;

pub use redb_audit::RedbAuditStore;
