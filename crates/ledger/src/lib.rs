//! Akredo Ledger - Versioning core
//!
//! Append-only version history per entity. All content changes go through
//! this crate.
//!
//! # Key Types
//! - `Entity`: mutable head record (status + current_version pointer)
//! - `VersionRecord`: one immutable revision of an entity's content
//! - `VersionMetadata`: caller-supplied metadata for a new revision
//!
//! # Invariants
//! - `version_no` is 1-based and strictly increasing per entity
//! - version records are never mutated, deleted, or renumbered
//! - `current_version` only ever advances

pub mod entity;
pub mod error;
pub mod version;

pub use entity::Entity;
pub use error::LedgerError;
pub use version::{VersionMetadata, VersionRecord};
