//! Canonical lifecycle vocabulary
//!
//! One status enum for the whole engine. UI label mapping ("Menunggu",
//! "pending", ...) belongs to the presentation layer, never here.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Errors when parsing status values from storage or external input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("Unknown review status: {0}")]
    UnknownStatus(String),
}

/// Review lifecycle status of an entity.
///
/// The status of an entity is always the status of its latest version.
/// `Approved` is terminal for that version; a new version of an approved
/// entity re-enters the flow at `Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Being prepared by the owner; content and tags still mutable
    Draft,
    /// Handed to the review queue, waiting for a reviewer
    Submitted,
    /// A reviewer has the entity open
    InReview,
    /// Accepted as canonical evidence for its criteria/cycle
    Approved,
    /// Rejected with a mandatory note; owner must revise
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Draft => "draft",
            ReviewStatus::Submitted => "submitted",
            ReviewStatus::InReview => "in_review",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Result<Self, StatusError> {
        match s {
            "draft" => Ok(ReviewStatus::Draft),
            "submitted" => Ok(ReviewStatus::Submitted),
            "in_review" => Ok(ReviewStatus::InReview),
            "approved" => Ok(ReviewStatus::Approved),
            "rejected" => Ok(ReviewStatus::Rejected),
            other => Err(StatusError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of tracked entity.
///
/// Evidence files must carry at least one criteria tag; generic documents
/// may be untagged.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Document,
    EvidenceFile,
}

/// Reviewer-side verbs accepted by the workflow facade.
///
/// Each action has exactly one canonical source state; the target state is
/// fixed by the legal transition table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReviewAction {
    /// Owner submits a draft for review (draft -> submitted)
    Submit,
    /// Reviewer opens the entity (submitted -> in_review)
    Open,
    /// Reviewer approves (in_review -> approved)
    Approve,
    /// Reviewer rejects with a mandatory note (in_review -> rejected)
    Reject,
    /// Reviewer requests changes, entity stays in review (in_review -> in_review)
    RequestChanges,
    /// Owner acknowledges a rejection and begins revision (rejected -> draft)
    Revise,
}

impl ReviewAction {
    /// The only status this action is legal from.
    pub fn canonical_from(&self) -> ReviewStatus {
        match self {
            ReviewAction::Submit => ReviewStatus::Draft,
            ReviewAction::Open => ReviewStatus::Submitted,
            ReviewAction::Approve => ReviewStatus::InReview,
            ReviewAction::Reject => ReviewStatus::InReview,
            ReviewAction::RequestChanges => ReviewStatus::InReview,
            ReviewAction::Revise => ReviewStatus::Rejected,
        }
    }

    /// The status this action moves the entity to.
    pub fn target(&self) -> ReviewStatus {
        match self {
            ReviewAction::Submit => ReviewStatus::Submitted,
            ReviewAction::Open => ReviewStatus::InReview,
            ReviewAction::Approve => ReviewStatus::Approved,
            ReviewAction::Reject => ReviewStatus::Rejected,
            ReviewAction::RequestChanges => ReviewStatus::InReview,
            ReviewAction::Revise => ReviewStatus::Draft,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            ReviewStatus::Draft,
            ReviewStatus::Submitted,
            ReviewStatus::InReview,
            ReviewStatus::Approved,
            ReviewStatus::Rejected,
        ] {
            assert_eq!(ReviewStatus::parse(status.as_str()).unwrap(), status);
        }

        assert!(matches!(
            ReviewStatus::parse("menunggu"),
            Err(StatusError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&ReviewStatus::InReview).unwrap();
        assert_eq!(json, "\"in_review\"");

        let parsed: ReviewStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(parsed, ReviewStatus::Rejected);
    }

    #[test]
    fn test_action_endpoints_match_transition_table() {
        assert_eq!(ReviewAction::Submit.canonical_from(), ReviewStatus::Draft);
        assert_eq!(ReviewAction::Submit.target(), ReviewStatus::Submitted);
        assert_eq!(ReviewAction::Approve.canonical_from(), ReviewStatus::InReview);
        assert_eq!(ReviewAction::Approve.target(), ReviewStatus::Approved);
        assert_eq!(
            ReviewAction::RequestChanges.target(),
            ReviewStatus::InReview
        );
        assert_eq!(ReviewAction::Revise.target(), ReviewStatus::Draft);
    }

    #[test]
    fn test_action_strum_parsing() {
        assert_eq!(
            ReviewAction::from_str("request_changes").unwrap(),
            ReviewAction::RequestChanges
        );
        assert_eq!(EntityKind::EvidenceFile.to_string(), "evidence_file");
    }
}
