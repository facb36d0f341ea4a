//! Akredo Workflow - Review state machine
//!
//! This is the HEART of the lifecycle engine. Every status change goes
//! through this crate.
//!
//! # Key Types
//! - `ReviewMachine`: validates actions against the legal transition table
//!   and produces `TransitionPlan`s (target status + notification side effect)
//! - `TransitionRecord`: one accepted, recorded status change
//! - `WorkflowConfig`: reviewer role selector and policy knobs
//!
//! The machine is pure: it never touches storage. The facade executes a plan
//! inside the persistence transaction so a transition is never visible
//! without its notification and audit entry.

pub mod error;
pub mod machine;
pub mod transition;

pub use error::WorkflowError;
pub use machine::{Audience, NotificationPlan, ReviewMachine, TransitionPlan, WorkflowConfig};
pub use transition::TransitionRecord;
