//! Akredo RPC - Workflow facade and CLI orchestrator
//!
//! The `WorkflowEngine` is the only entry point external callers (REST
//! handlers, the CLI below) use. Each composite operation - submit, review,
//! revise - bundles version, transition, tagging, notification and audit
//! writes into one SQLite transaction.

pub mod commands;
pub mod context;
pub mod engine;
pub mod error;

pub use context::AppContext;
pub use engine::{NewSubmission, RevisionRequest, WorkflowEngine};
pub use error::EngineError;
