//! Akredo Core - Domain types
//!
//! This crate contains the fundamental types used across Akredo:
//! - `EntityId`, `ActorId`, `CriteriaId`, `CycleId`, `ContentRef`: identifiers
//! - `ReviewStatus`: canonical lifecycle status enum
//! - `EntityKind`: document vs. evidence file
//! - `ReviewAction`: reviewer-side verbs mapped onto the transition table

pub mod ids;
pub mod status;

pub use ids::{ActorId, ContentRef, CriteriaId, CycleId, EntityId};
pub use status::{EntityKind, ReviewAction, ReviewStatus, StatusError};
