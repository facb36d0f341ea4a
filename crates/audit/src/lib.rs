//! Akredo Audit - Append-only audit trail
//!
//! One entry per mutating action, across every component. Entries are never
//! updated or deleted by normal operation; retention/purge is an explicit
//! administrative concern outside this crate.
//!
//! An unaudited mutation is a fatal consistency violation: if the audit
//! write fails, the whole composite operation fails with it.

pub mod entry;

pub use entry::{AuditEntry, AuditFilter, TargetType};
