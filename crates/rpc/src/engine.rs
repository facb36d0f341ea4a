//! Workflow facade
//!
//! Composes the versioning ledger, review state machine, criteria linker,
//! notification dispatcher and audit recorder into atomic operations. Every
//! mutating method runs its component writes inside one store transaction:
//! commit makes all of them visible, any error makes none of them visible.

use crate::error::EngineError;
use akredo_audit::{AuditEntry, AuditFilter, TargetType};
use akredo_core::{ActorId, CriteriaId, CycleId, EntityId, EntityKind, ReviewAction, ReviewStatus};
use akredo_ledger::{Entity, VersionMetadata, VersionRecord};
use akredo_notify::{Notification, NotificationDispatcher, Recipient};
use akredo_store::{repo, EvidenceStore, StoreError, WorkflowStore};
use akredo_tagging::{self as tagging, CriteriaTag};
use akredo_workflow::{Audience, ReviewMachine, TransitionPlan, TransitionRecord, WorkflowConfig};
use rusqlite::Connection;
use serde_json::json;
use std::collections::BTreeSet;
use tracing::info;

/// Input for creating a brand-new entity with its first version
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub kind: EntityKind,
    pub owner: ActorId,
    pub content: Vec<u8>,
    pub content_kind: String,
    pub criteria: BTreeSet<CriteriaId>,
    pub cycle: CycleId,
    pub change_note: Option<String>,
    /// Save as draft instead of submitting straight into the review queue
    pub as_draft: bool,
}

/// Input for uploading a new version of an existing entity
#[derive(Debug, Clone)]
pub struct RevisionRequest {
    pub entity_id: EntityId,
    pub content: Vec<u8>,
    pub content_kind: String,
    /// Required: every version after the first must say what changed
    pub change_note: Option<String>,
    pub actor: ActorId,
    /// Optimistic-concurrency check against the stored current_version
    pub expected_version: Option<u32>,
}

/// The lifecycle engine facade.
///
/// Stateless per request apart from the persistence layer; callers re-fetch
/// and retry on `Conflict`.
pub struct WorkflowEngine {
    store: WorkflowStore,
    evidence: Box<dyn EvidenceStore>,
    machine: ReviewMachine,
    dispatcher: NotificationDispatcher,
}

impl WorkflowEngine {
    pub fn new(
        store: WorkflowStore,
        evidence: Box<dyn EvidenceStore>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            store,
            evidence,
            machine: ReviewMachine::new(config),
            dispatcher: NotificationDispatcher::new(),
        }
    }

    pub fn machine(&self) -> &ReviewMachine {
        &self.machine
    }

    // ========================================================================
    // Composite operations
    // ========================================================================

    /// Create a new entity with version 1, tag it, and (unless saved as
    /// draft) submit it for review - one atomic unit.
    pub fn submit_evidence(
        &mut self,
        submission: NewSubmission,
    ) -> Result<(Entity, VersionRecord), EngineError> {
        tagging::validate_tag_set(submission.kind, &submission.criteria)?;

        // Content-addressed put is idempotent; a blob from a rolled-back
        // operation is merely unreferenced
        let content_ref = self.evidence.put(&submission.content)?;

        let mut entity = Entity::new(submission.kind, submission.owner.clone());
        let version = VersionRecord::next(
            &entity,
            content_ref,
            VersionMetadata {
                size: submission.content.len() as u64,
                content_kind: submission.content_kind.clone(),
                change_note: submission.change_note.clone(),
            },
            submission.owner.clone(),
            None,
        )?;

        let Self {
            store,
            machine,
            dispatcher,
            ..
        } = self;
        let tx = store.begin()?;

        repo::insert_entity(&tx, &entity)?;
        record_audit(
            &tx,
            &AuditEntry::new(
                submission.owner.clone(),
                "entity_created",
                TargetType::Entity,
                entity.id.as_str(),
                json!(null),
                entity.snapshot(),
            ),
        )?;

        repo::insert_version(&tx, &version)?;
        entity.advance_to(version.version_no);
        record_audit(&tx, &version_audit(&version, &submission.owner))?;

        if !submission.criteria.is_empty() {
            let tags = CriteriaTag::expand(
                &entity.id,
                version.version_no,
                &submission.criteria,
                &submission.cycle,
            );
            repo::upsert_tags(&tx, &tags)?;
            record_audit(
                &tx,
                &tag_audit(&entity, &submission.owner, "tagged", &submission.criteria, &submission.cycle),
            )?;
        }

        if !submission.as_draft {
            let plan = machine.plan_action(ReviewAction::Submit, entity.status, None)?;
            apply_plan(machine, dispatcher, &tx, &mut entity, &plan, &submission.owner)?;
        }

        repo::update_entity_head(&tx, &entity)?;
        tx.commit().map_err(StoreError::from)?;

        info!(
            entity = %entity.id,
            status = %entity.status,
            version = version.version_no,
            "evidence submitted"
        );
        Ok((entity, version))
    }

    /// Upload a new version of an existing entity.
    ///
    /// Rejected entities silently return to `draft`; approved entities
    /// re-enter review at `submitted`; drafts stay drafts. Content is frozen
    /// while a review is open.
    pub fn create_revision(
        &mut self,
        request: RevisionRequest,
    ) -> Result<(Entity, VersionRecord), EngineError> {
        let content_ref = self.evidence.put(&request.content)?;

        let Self {
            store,
            machine,
            dispatcher,
            ..
        } = self;
        let tx = store.begin()?;

        let mut entity = repo::get_entity(&tx, &request.entity_id)?;
        let plan = machine.plan_revision(entity.status)?;

        let version = VersionRecord::next(
            &entity,
            content_ref,
            VersionMetadata {
                size: request.content.len() as u64,
                content_kind: request.content_kind.clone(),
                change_note: request.change_note.clone(),
            },
            request.actor.clone(),
            request.expected_version,
        )?;

        repo::insert_version(&tx, &version)?;
        entity.advance_to(version.version_no);
        repo::carry_tags_forward(&tx, &entity.id, version.version_no)?;
        record_audit(&tx, &version_audit(&version, &request.actor))?;

        if let Some(ref plan) = plan {
            apply_plan(machine, dispatcher, &tx, &mut entity, plan, &request.actor)?;
        }

        repo::update_entity_head(&tx, &entity)?;
        tx.commit().map_err(StoreError::from)?;

        info!(
            entity = %entity.id,
            status = %entity.status,
            version = version.version_no,
            "revision created"
        );
        Ok((entity, version))
    }

    /// Apply a review action to an entity.
    ///
    /// Validation happens against the status read inside the transaction, so
    /// of two competing reviewers exactly one commits; the other gets a
    /// `Conflict` and must re-read.
    pub fn review_action(
        &mut self,
        entity_id: &EntityId,
        action: ReviewAction,
        note: Option<&str>,
        actor: &ActorId,
    ) -> Result<(Entity, TransitionRecord), EngineError> {
        let Self {
            store,
            machine,
            dispatcher,
            ..
        } = self;
        let tx = store.begin()?;

        let mut entity = repo::get_entity(&tx, entity_id)?;
        let plan = machine.plan_action(action, entity.status, note)?;
        let record = apply_plan(machine, dispatcher, &tx, &mut entity, &plan, actor)?;

        repo::update_entity_head(&tx, &entity)?;
        tx.commit().map_err(StoreError::from)?;

        info!(
            entity = %entity.id,
            action = %action,
            from = %record.from_status,
            to = %record.to_status,
            "review action applied"
        );
        Ok((entity, record))
    }

    /// Add criteria tags to a draft entity.
    pub fn tag(
        &mut self,
        entity_id: &EntityId,
        criteria: BTreeSet<CriteriaId>,
        cycle: CycleId,
        actor: &ActorId,
    ) -> Result<(), EngineError> {
        let Self { store, .. } = self;
        let tx = store.begin()?;

        let entity = repo::get_entity(&tx, entity_id)?;
        tagging::check_tags_mutable(entity.status)?;

        let tags = CriteriaTag::expand(&entity.id, entity.current_version, &criteria, &cycle);
        repo::upsert_tags(&tx, &tags)?;
        record_audit(&tx, &tag_audit(&entity, actor, "tagged", &criteria, &cycle))?;

        tx.commit().map_err(StoreError::from)?;
        Ok(())
    }

    /// Remove criteria tags from a draft entity.
    ///
    /// Evidence files must keep at least one criterion.
    pub fn untag(
        &mut self,
        entity_id: &EntityId,
        criteria: BTreeSet<CriteriaId>,
        cycle: CycleId,
        actor: &ActorId,
    ) -> Result<usize, EngineError> {
        let Self { store, .. } = self;
        let tx = store.begin()?;

        let entity = repo::get_entity(&tx, entity_id)?;
        tagging::check_tags_mutable(entity.status)?;

        let removed = repo::delete_tags(&tx, entity_id, &cycle, &criteria)?;

        let remaining: BTreeSet<CriteriaId> = repo::list_tags(&tx, entity_id)?
            .into_iter()
            .map(|t| t.criteria_id)
            .collect();
        tagging::validate_tag_set(entity.kind, &remaining)?;

        record_audit(&tx, &tag_audit(&entity, actor, "untagged", &criteria, &cycle))?;
        tx.commit().map_err(StoreError::from)?;
        Ok(removed)
    }

    // ========================================================================
    // Notification inbox
    // ========================================================================

    /// Flip a notification's read flag (the only mutation the inbox owns,
    /// besides delete).
    pub fn mark_notification_read(
        &mut self,
        notification_id: &str,
        actor: &ActorId,
    ) -> Result<(), EngineError> {
        let Self { store, .. } = self;
        let tx = store.begin()?;

        let before = repo::get_notification(&tx, notification_id)?;
        repo::mark_notification_read(&tx, notification_id)?;
        record_audit(
            &tx,
            &AuditEntry::new(
                actor.clone(),
                "notification_read",
                TargetType::Notification,
                notification_id,
                json!({"read": before.read}),
                json!({"read": true}),
            ),
        )?;

        tx.commit().map_err(StoreError::from)?;
        Ok(())
    }

    pub fn delete_notification(
        &mut self,
        notification_id: &str,
        actor: &ActorId,
    ) -> Result<(), EngineError> {
        let Self { store, .. } = self;
        let tx = store.begin()?;

        let before = repo::get_notification(&tx, notification_id)?;
        repo::delete_notification(&tx, notification_id)?;
        record_audit(
            &tx,
            &AuditEntry::new(
                actor.clone(),
                "notification_deleted",
                TargetType::Notification,
                notification_id,
                json!({"read": before.read, "message": before.message}),
                json!(null),
            ),
        )?;

        tx.commit().map_err(StoreError::from)?;
        Ok(())
    }

    // ========================================================================
    // Read surface
    // ========================================================================

    pub fn entity(&self, entity_id: &EntityId) -> Result<Entity, EngineError> {
        Ok(repo::get_entity(self.store.conn(), entity_id)?)
    }

    pub fn versions(&self, entity_id: &EntityId) -> Result<Vec<VersionRecord>, EngineError> {
        Ok(repo::list_versions(self.store.conn(), entity_id)?)
    }

    pub fn transitions(&self, entity_id: &EntityId) -> Result<Vec<TransitionRecord>, EngineError> {
        Ok(repo::list_transitions(self.store.conn(), entity_id)?)
    }

    pub fn tags(&self, entity_id: &EntityId) -> Result<Vec<CriteriaTag>, EngineError> {
        Ok(repo::list_tags(self.store.conn(), entity_id)?)
    }

    /// All entities currently in the given status, e.g. the review queue.
    pub fn entities_by_status(&self, status: ReviewStatus) -> Result<Vec<Entity>, EngineError> {
        Ok(repo::list_entities_by_status(self.store.conn(), status)?)
    }

    /// Entities tagged with (cycle, criterion) at their current version.
    pub fn find_by_criteria(
        &self,
        cycle: &CycleId,
        criteria: &CriteriaId,
        status: Option<ReviewStatus>,
    ) -> Result<Vec<Entity>, EngineError> {
        Ok(repo::find_by_criteria(
            self.store.conn(),
            cycle,
            criteria,
            status,
        )?)
    }

    pub fn inbox(
        &self,
        recipient: &Recipient,
        unread_only: bool,
    ) -> Result<Vec<Notification>, EngineError> {
        Ok(repo::list_notifications(
            self.store.conn(),
            recipient,
            unread_only,
        )?)
    }

    pub fn audit_log(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, EngineError> {
        Ok(repo::list_audit(self.store.conn(), filter)?)
    }

    pub fn evidence_bytes(&self, version: &VersionRecord) -> Result<Vec<u8>, EngineError> {
        Ok(self.evidence.get(&version.content_ref)?)
    }

    /// Direct read access for invariant checks in tests and tooling.
    pub fn store(&self) -> &WorkflowStore {
        &self.store
    }
}

/// Execute a validated transition plan inside the caller's transaction:
/// transition record, head update, planned notification, audit entry.
fn apply_plan(
    machine: &ReviewMachine,
    dispatcher: &NotificationDispatcher,
    tx: &Connection,
    entity: &mut Entity,
    plan: &TransitionPlan,
    actor: &ActorId,
) -> Result<TransitionRecord, EngineError> {
    let before = entity.snapshot();

    let record = plan.record(entity.id.clone(), actor.clone());
    repo::insert_transition(tx, &record)?;

    entity.set_status(plan.to);
    if plan.freeze_canonical {
        entity.freeze_canonical(entity.current_version);
    }

    if let Some(ref planned) = plan.notification {
        let recipient = match planned.audience {
            Audience::Owner => Recipient::User(entity.owner.clone()),
            Audience::Reviewers => Recipient::Role(machine.config().reviewer_role.clone()),
        };
        let notification = dispatcher.emit(
            planned.kind,
            recipient,
            planned.priority,
            planned.message(&entity.id),
            Some(entity.id.clone()),
        );
        repo::insert_notification(tx, &notification)?;
    }

    record_audit(
        tx,
        &AuditEntry::new(
            actor.clone(),
            "status_changed",
            TargetType::Entity,
            entity.id.as_str(),
            before,
            entity.snapshot(),
        ),
    )?;

    Ok(record)
}

/// An audit write failure is fatal for the whole composite operation.
fn record_audit(tx: &Connection, entry: &AuditEntry) -> Result<(), EngineError> {
    repo::insert_audit(tx, entry).map_err(|e| EngineError::InternalConsistency(e.to_string()))
}

fn version_audit(version: &VersionRecord, actor: &ActorId) -> AuditEntry {
    AuditEntry::new(
        actor.clone(),
        "version_created",
        TargetType::Version,
        format!("{}#v{}", version.entity_id, version.version_no),
        json!(null),
        json!({
            "content_ref": version.content_ref,
            "size": version.size,
            "content_kind": version.content_kind,
            "change_note": version.change_note,
        }),
    )
}

fn tag_audit(
    entity: &Entity,
    actor: &ActorId,
    action: &str,
    criteria: &BTreeSet<CriteriaId>,
    cycle: &CycleId,
) -> AuditEntry {
    AuditEntry::new(
        actor.clone(),
        action,
        TargetType::Tag,
        entity.id.as_str(),
        json!(null),
        json!({
            "criteria": criteria,
            "cycle": cycle,
            "version": entity.current_version,
        }),
    )
}
