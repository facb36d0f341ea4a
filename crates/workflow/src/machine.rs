//! Legal transition table and plan builder

use crate::error::WorkflowError;
use crate::transition::TransitionRecord;
use akredo_core::{ActorId, EntityId, ReviewAction, ReviewStatus};
use akredo_notify::{NotificationKind, Priority};

/// Every legal (from, to) edge of the review lifecycle.
///
/// `approved -> submitted` is the resubmission policy edge: a new version of
/// an approved entity re-enters review directly at `submitted`, since the
/// prior approval already implies completeness.
pub const LEGAL_TRANSITIONS: &[(ReviewStatus, ReviewStatus)] = &[
    (ReviewStatus::Draft, ReviewStatus::Submitted),
    (ReviewStatus::Submitted, ReviewStatus::InReview),
    (ReviewStatus::InReview, ReviewStatus::Approved),
    (ReviewStatus::InReview, ReviewStatus::Rejected),
    (ReviewStatus::InReview, ReviewStatus::InReview),
    (ReviewStatus::Rejected, ReviewStatus::Draft),
    (ReviewStatus::Approved, ReviewStatus::Submitted),
];

/// Configuration for the review workflow
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Role selector that receives review-queue notifications
    pub reviewer_role: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            reviewer_role: "quality-reviewers".to_string(),
        }
    }
}

/// Who a planned notification goes to, resolved by the facade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// The entity's owner
    Owner,
    /// The configured reviewer role (broadcast)
    Reviewers,
}

/// Planned notification side effect of a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPlan {
    pub audience: Audience,
    pub kind: NotificationKind,
    pub priority: Priority,
    template: &'static str,
}

impl NotificationPlan {
    const fn new(
        audience: Audience,
        kind: NotificationKind,
        priority: Priority,
        template: &'static str,
    ) -> Self {
        Self {
            audience,
            kind,
            priority,
            template,
        }
    }

    /// Render the inbox message for a concrete entity.
    pub fn message(&self, entity_id: &EntityId) -> String {
        self.template.replace("{id}", entity_id.as_str())
    }
}

/// A validated transition ready to be executed by the facade.
///
/// Executing a plan means: write the TransitionRecord, update the entity
/// head, emit the planned notification (if any), and record the audit entry,
/// all inside one atomic unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub from: ReviewStatus,
    pub to: ReviewStatus,
    pub note: Option<String>,
    pub notification: Option<NotificationPlan>,
    /// Approval freezes the current version as canonical evidence
    pub freeze_canonical: bool,
}

impl TransitionPlan {
    /// Materialize the transition record for this plan.
    pub fn record(&self, entity_id: EntityId, actor: ActorId) -> TransitionRecord {
        TransitionRecord::new(entity_id, self.from, self.to, actor, self.note.clone())
    }
}

/// The review state machine.
///
/// Pure validation and planning; storage and side-effect execution belong to
/// the facade.
#[derive(Debug, Default, Clone)]
pub struct ReviewMachine {
    config: WorkflowConfig,
}

impl ReviewMachine {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Whether (from, to) is in the legal transition table.
    pub fn is_legal(from: ReviewStatus, to: ReviewStatus) -> bool {
        LEGAL_TRANSITIONS.contains(&(from, to))
    }

    /// Validate an action against the entity's current status and build the
    /// transition plan.
    ///
    /// Conflict discrimination: when `current` does not match the action's
    /// canonical source state, the caller's assumption is stale if a
    /// concurrent writer could have legally moved the entity there in one
    /// step - that surfaces as `StaleState` (a retryable conflict). Anything
    /// else is a plain `InvalidTransition`.
    pub fn plan_action(
        &self,
        action: ReviewAction,
        current: ReviewStatus,
        note: Option<&str>,
    ) -> Result<TransitionPlan, WorkflowError> {
        let note = note
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        if action == ReviewAction::Reject && note.is_none() {
            return Err(WorkflowError::NoteRequired);
        }

        let assumed = action.canonical_from();
        let to = action.target();

        if current != assumed {
            if Self::is_legal(assumed, current) {
                return Err(WorkflowError::StaleState {
                    assumed,
                    actual: current,
                });
            }
            return Err(WorkflowError::InvalidTransition { from: current, to });
        }

        Ok(Self::build_plan(assumed, to, note))
    }

    /// Plan the transition implied by creating a new version.
    ///
    /// - `draft`: content replaced in place, no transition
    /// - `rejected`: resubmission path, silently returns to `draft`
    /// - `approved`: re-enters review at `submitted`
    /// - `submitted` / `in_review`: content is frozen during review
    pub fn plan_revision(
        &self,
        current: ReviewStatus,
    ) -> Result<Option<TransitionPlan>, WorkflowError> {
        match current {
            ReviewStatus::Draft => Ok(None),
            ReviewStatus::Rejected => Ok(Some(Self::build_plan(
                ReviewStatus::Rejected,
                ReviewStatus::Draft,
                None,
            ))),
            ReviewStatus::Approved => Ok(Some(Self::build_plan(
                ReviewStatus::Approved,
                ReviewStatus::Submitted,
                None,
            ))),
            frozen @ (ReviewStatus::Submitted | ReviewStatus::InReview) => {
                Err(WorkflowError::ContentFrozen(frozen))
            }
        }
    }

    fn build_plan(from: ReviewStatus, to: ReviewStatus, note: Option<String>) -> TransitionPlan {
        let (notification, freeze_canonical) = Self::side_effects(from, to);
        TransitionPlan {
            from,
            to,
            note,
            notification,
            freeze_canonical,
        }
    }

    /// Side effects per legal edge, exactly as the transition table defines.
    fn side_effects(
        from: ReviewStatus,
        to: ReviewStatus,
    ) -> (Option<NotificationPlan>, bool) {
        match (from, to) {
            (ReviewStatus::Draft, ReviewStatus::Submitted) => (
                Some(NotificationPlan::new(
                    Audience::Reviewers,
                    NotificationKind::Task,
                    Priority::Medium,
                    "Evidence {id} submitted for review",
                )),
                false,
            ),
            (ReviewStatus::Submitted, ReviewStatus::InReview) => (
                Some(NotificationPlan::new(
                    Audience::Owner,
                    NotificationKind::StatusChange,
                    Priority::Medium,
                    "Evidence {id} is now in review",
                )),
                false,
            ),
            (ReviewStatus::InReview, ReviewStatus::Approved) => (
                Some(NotificationPlan::new(
                    Audience::Owner,
                    NotificationKind::StatusChange,
                    Priority::Medium,
                    "Evidence {id} approved",
                )),
                true,
            ),
            (ReviewStatus::InReview, ReviewStatus::Rejected) => (
                Some(NotificationPlan::new(
                    Audience::Owner,
                    NotificationKind::StatusChange,
                    Priority::High,
                    "Evidence {id} rejected",
                )),
                false,
            ),
            (ReviewStatus::InReview, ReviewStatus::InReview) => (
                Some(NotificationPlan::new(
                    Audience::Owner,
                    NotificationKind::Task,
                    Priority::Medium,
                    "Changes requested on evidence {id}",
                )),
                false,
            ),
            // Resubmission acknowledgement is silent
            (ReviewStatus::Rejected, ReviewStatus::Draft) => (None, false),
            (ReviewStatus::Approved, ReviewStatus::Submitted) => (
                Some(NotificationPlan::new(
                    Audience::Reviewers,
                    NotificationKind::Task,
                    Priority::Medium,
                    "New version of evidence {id} submitted for review",
                )),
                false,
            ),
            _ => (None, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> ReviewMachine {
        ReviewMachine::default()
    }

    #[test]
    fn test_legal_table_is_exhaustive() {
        let all = [
            ReviewStatus::Draft,
            ReviewStatus::Submitted,
            ReviewStatus::InReview,
            ReviewStatus::Approved,
            ReviewStatus::Rejected,
        ];

        let legal: Vec<_> = all
            .iter()
            .flat_map(|&f| all.iter().map(move |&t| (f, t)))
            .filter(|&(f, t)| ReviewMachine::is_legal(f, t))
            .collect();

        assert_eq!(legal.len(), LEGAL_TRANSITIONS.len());
        assert!(!ReviewMachine::is_legal(
            ReviewStatus::Draft,
            ReviewStatus::Approved
        ));
        assert!(!ReviewMachine::is_legal(
            ReviewStatus::Approved,
            ReviewStatus::Draft
        ));
    }

    #[test]
    fn test_submit_plan_notifies_reviewers() {
        let plan = machine()
            .plan_action(ReviewAction::Submit, ReviewStatus::Draft, None)
            .unwrap();

        assert_eq!(plan.from, ReviewStatus::Draft);
        assert_eq!(plan.to, ReviewStatus::Submitted);
        assert!(!plan.freeze_canonical);

        let notification = plan.notification.unwrap();
        assert_eq!(notification.audience, Audience::Reviewers);
        assert_eq!(notification.kind, NotificationKind::Task);
        assert_eq!(notification.priority, Priority::Medium);
        assert_eq!(
            notification.message(&EntityId::from("DOC-42")),
            "Evidence DOC-42 submitted for review"
        );
    }

    #[test]
    fn test_reject_requires_note() {
        let result = machine().plan_action(ReviewAction::Reject, ReviewStatus::InReview, None);
        assert_eq!(result, Err(WorkflowError::NoteRequired));

        let result =
            machine().plan_action(ReviewAction::Reject, ReviewStatus::InReview, Some("  "));
        assert_eq!(result, Err(WorkflowError::NoteRequired));

        let plan = machine()
            .plan_action(
                ReviewAction::Reject,
                ReviewStatus::InReview,
                Some("incomplete scan"),
            )
            .unwrap();
        assert_eq!(plan.to, ReviewStatus::Rejected);
        assert_eq!(plan.note.as_deref(), Some("incomplete scan"));
        assert_eq!(plan.notification.unwrap().priority, Priority::High);
    }

    #[test]
    fn test_approval_freezes_canonical() {
        let plan = machine()
            .plan_action(ReviewAction::Approve, ReviewStatus::InReview, None)
            .unwrap();
        assert!(plan.freeze_canonical);
        assert_eq!(plan.to, ReviewStatus::Approved);
    }

    #[test]
    fn test_request_changes_stays_in_review() {
        let plan = machine()
            .plan_action(
                ReviewAction::RequestChanges,
                ReviewStatus::InReview,
                Some("add page numbers"),
            )
            .unwrap();

        assert_eq!(plan.from, ReviewStatus::InReview);
        assert_eq!(plan.to, ReviewStatus::InReview);
        let notification = plan.notification.unwrap();
        assert_eq!(notification.audience, Audience::Owner);
        assert_eq!(notification.kind, NotificationKind::Task);
    }

    #[test]
    fn test_lost_race_surfaces_as_stale_state() {
        // A competing reviewer already rejected; approve's assumption
        // (in_review) is stale because in_review -> rejected is legal
        let result = machine().plan_action(ReviewAction::Approve, ReviewStatus::Rejected, None);
        assert_eq!(
            result,
            Err(WorkflowError::StaleState {
                assumed: ReviewStatus::InReview,
                actual: ReviewStatus::Rejected,
            })
        );

        // Double-open is the same shape of conflict
        let result = machine().plan_action(ReviewAction::Open, ReviewStatus::InReview, None);
        assert!(matches!(result, Err(WorkflowError::StaleState { .. })));
    }

    #[test]
    fn test_unreachable_state_is_invalid_not_stale() {
        // Approving a draft can never be a lost race: draft is not reachable
        // from in_review
        let result = machine().plan_action(ReviewAction::Approve, ReviewStatus::Draft, None);
        assert_eq!(
            result,
            Err(WorkflowError::InvalidTransition {
                from: ReviewStatus::Draft,
                to: ReviewStatus::Approved,
            })
        );
    }

    #[test]
    fn test_revision_plans_per_status() {
        let m = machine();

        // Draft: content replaced in place
        assert_eq!(m.plan_revision(ReviewStatus::Draft).unwrap(), None);

        // Rejected: silent return to draft
        let plan = m.plan_revision(ReviewStatus::Rejected).unwrap().unwrap();
        assert_eq!(plan.to, ReviewStatus::Draft);
        assert!(plan.notification.is_none());

        // Approved: re-enters review at submitted, reviewers notified
        let plan = m.plan_revision(ReviewStatus::Approved).unwrap().unwrap();
        assert_eq!(plan.to, ReviewStatus::Submitted);
        assert_eq!(plan.notification.unwrap().audience, Audience::Reviewers);

        // Frozen during review
        assert_eq!(
            m.plan_revision(ReviewStatus::Submitted),
            Err(WorkflowError::ContentFrozen(ReviewStatus::Submitted))
        );
        assert_eq!(
            m.plan_revision(ReviewStatus::InReview),
            Err(WorkflowError::ContentFrozen(ReviewStatus::InReview))
        );
    }

    #[test]
    fn test_plan_record_chains_from_current_status() {
        let plan = machine()
            .plan_action(ReviewAction::Open, ReviewStatus::Submitted, None)
            .unwrap();
        let record = plan.record(EntityId::from("DOC-1"), ActorId::from("reviewer-01"));

        assert_eq!(record.from_status, ReviewStatus::Submitted);
        assert_eq!(record.to_status, ReviewStatus::InReview);
    }
}
