//! CLI commands

use crate::context::AppContext;
use crate::engine::{NewSubmission, RevisionRequest};
use akredo_audit::AuditFilter;
use akredo_core::{ActorId, CriteriaId, CycleId, EntityId, EntityKind, ReviewAction, ReviewStatus};
use akredo_notify::Recipient;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::path::Path;

fn parse_bound(value: &str) -> Result<DateTime<Utc>, anyhow::Error> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

/// Submit a file as new evidence (or a generic document).
#[allow(clippy::too_many_arguments)]
pub fn submit(
    ctx: &mut AppContext,
    path: &Path,
    kind: EntityKind,
    owner: &str,
    criteria: &[String],
    cycle: &str,
    note: Option<&str>,
    draft: bool,
) -> Result<(), anyhow::Error> {
    let content = std::fs::read(path)?;
    let content_kind = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin")
        .to_string();

    let criteria: BTreeSet<CriteriaId> = criteria
        .iter()
        .map(|c| CriteriaId::from(c.as_str()))
        .collect();

    let (entity, version) = ctx.engine.submit_evidence(NewSubmission {
        kind,
        owner: ActorId::from(owner),
        content,
        content_kind,
        criteria,
        cycle: CycleId::from(cycle),
        change_note: note.map(str::to_string),
        as_draft: draft,
    })?;

    println!(
        "✅ Created {} (status: {}, v{}, {} bytes)",
        entity.id, entity.status, version.version_no, version.size
    );
    Ok(())
}

/// Upload a new version of an existing entity.
pub fn revise(
    ctx: &mut AppContext,
    entity_id: &str,
    path: &Path,
    note: &str,
    actor: &str,
    expected_version: Option<u32>,
) -> Result<(), anyhow::Error> {
    let content = std::fs::read(path)?;
    let content_kind = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin")
        .to_string();

    let (entity, version) = ctx.engine.create_revision(RevisionRequest {
        entity_id: EntityId::from(entity_id),
        content,
        content_kind,
        change_note: Some(note.to_string()),
        actor: ActorId::from(actor),
        expected_version,
    })?;

    println!(
        "✅ {} is now v{} (status: {})",
        entity.id, version.version_no, entity.status
    );
    Ok(())
}

/// Apply a review action (submit, open, approve, reject, request_changes).
pub fn review(
    ctx: &mut AppContext,
    entity_id: &str,
    action: ReviewAction,
    note: Option<&str>,
    actor: &str,
) -> Result<(), anyhow::Error> {
    let entity_id = EntityId::from(entity_id);
    let (entity, record) =
        ctx.engine
            .review_action(&entity_id, action, note, &ActorId::from(actor))?;

    println!(
        "✅ {} {} -> {} (by {})",
        entity.id, record.from_status, record.to_status, record.actor
    );
    if let Some(canonical) = entity.canonical_version {
        println!("   Canonical evidence: v{canonical}");
    }
    Ok(())
}

/// Add criteria tags to a draft entity.
pub fn tag(
    ctx: &mut AppContext,
    entity_id: &str,
    criteria: &[String],
    cycle: &str,
    actor: &str,
) -> Result<(), anyhow::Error> {
    let criteria: BTreeSet<CriteriaId> = criteria
        .iter()
        .map(|c| CriteriaId::from(c.as_str()))
        .collect();
    let count = criteria.len();
    ctx.engine.tag(
        &EntityId::from(entity_id),
        criteria,
        CycleId::from(cycle),
        &ActorId::from(actor),
    )?;

    println!("✅ Tagged {entity_id} with {count} criteria in cycle {cycle}");
    Ok(())
}

/// Remove criteria tags from a draft entity.
pub fn untag(
    ctx: &mut AppContext,
    entity_id: &str,
    criteria: &[String],
    cycle: &str,
    actor: &str,
) -> Result<(), anyhow::Error> {
    let criteria: BTreeSet<CriteriaId> = criteria
        .iter()
        .map(|c| CriteriaId::from(c.as_str()))
        .collect();
    let removed = ctx.engine.untag(
        &EntityId::from(entity_id),
        criteria,
        CycleId::from(cycle),
        &ActorId::from(actor),
    )?;

    println!("✅ Removed {removed} tag(s) from {entity_id}");
    Ok(())
}

/// Show an entity with its version history and transitions.
pub fn show(ctx: &AppContext, entity_id: &str) -> Result<(), anyhow::Error> {
    let entity_id = EntityId::from(entity_id);
    let entity = ctx.engine.entity(&entity_id)?;

    println!("{} ({}, owner: {})", entity.id, entity.kind, entity.owner);
    println!(
        "  Status: {} | current v{} | canonical {}",
        entity.status,
        entity.current_version,
        entity
            .canonical_version
            .map(|v| format!("v{v}"))
            .unwrap_or_else(|| "-".to_string())
    );

    println!("  Versions:");
    for v in ctx.engine.versions(&entity_id)? {
        println!(
            "    v{} {} ({} bytes, {}) by {}{}",
            v.version_no,
            v.content_ref,
            v.size,
            v.content_kind,
            v.created_by,
            v.change_note
                .as_deref()
                .map(|n| format!(" - {n}"))
                .unwrap_or_default()
        );
    }

    let transitions = ctx.engine.transitions(&entity_id)?;
    if !transitions.is_empty() {
        println!("  Transitions:");
        for t in transitions {
            println!(
                "    {} -> {} by {} at {}{}",
                t.from_status,
                t.to_status,
                t.actor,
                t.occurred_at.to_rfc3339(),
                t.note
                    .as_deref()
                    .map(|n| format!(" ({n})"))
                    .unwrap_or_default()
            );
        }
    }

    let tags = ctx.engine.tags(&entity_id)?;
    if !tags.is_empty() {
        println!("  Criteria:");
        for t in tags {
            println!("    {} @ {} (v{})", t.criteria_id, t.cycle_id, t.version_no);
        }
    }
    Ok(())
}

/// List entities in a given status (the review queue, the draft pile, ...).
pub fn list(ctx: &AppContext, status: ReviewStatus) -> Result<(), anyhow::Error> {
    let entities = ctx.engine.entities_by_status(status)?;

    if entities.is_empty() {
        println!("No entities in status {status}");
        return Ok(());
    }

    for e in entities {
        println!("  {} ({}, v{}, owner: {})", e.id, e.kind, e.current_version, e.owner);
    }
    Ok(())
}

/// List entities matching a (cycle, criterion) pair.
pub fn find(
    ctx: &AppContext,
    cycle: &str,
    criteria: &str,
    status: Option<ReviewStatus>,
) -> Result<(), anyhow::Error> {
    let entities = ctx.engine.find_by_criteria(
        &CycleId::from(cycle),
        &CriteriaId::from(criteria),
        status,
    )?;

    if entities.is_empty() {
        println!("No entities tagged {criteria} in cycle {cycle}");
        return Ok(());
    }

    println!("{} entities for {criteria} @ {cycle}:", entities.len());
    for e in entities {
        println!("  {} ({}, v{})", e.id, e.status, e.current_version);
    }
    Ok(())
}

/// Show a recipient's notification inbox.
pub fn inbox(ctx: &AppContext, recipient: &str, unread_only: bool) -> Result<(), anyhow::Error> {
    let recipient = Recipient::parse(recipient)?;
    let notifications = ctx.engine.inbox(&recipient, unread_only)?;

    if notifications.is_empty() {
        println!("Inbox empty for {}", recipient.as_selector());
        return Ok(());
    }

    for n in notifications {
        println!(
            "{} [{}] [{}/{}] {}",
            if n.read { " " } else { "*" },
            n.id,
            n.kind.as_str(),
            n.priority.as_str(),
            n.message
        );
    }
    Ok(())
}

/// Mark a notification as read.
pub fn read_notification(
    ctx: &mut AppContext,
    notification_id: &str,
    actor: &str,
) -> Result<(), anyhow::Error> {
    ctx.engine
        .mark_notification_read(notification_id, &ActorId::from(actor))?;
    println!("✅ Marked {notification_id} as read");
    Ok(())
}

/// Delete a notification from the inbox.
pub fn delete_notification(
    ctx: &mut AppContext,
    notification_id: &str,
    actor: &str,
) -> Result<(), anyhow::Error> {
    ctx.engine
        .delete_notification(notification_id, &ActorId::from(actor))?;
    println!("✅ Deleted {notification_id}");
    Ok(())
}

/// Show the audit trail, filterable by target, actor and date range.
pub fn audit(
    ctx: &AppContext,
    target: Option<&str>,
    actor: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(), anyhow::Error> {
    let filter = AuditFilter {
        target_id: target.map(str::to_string),
        actor: actor.map(ActorId::from),
        from: from.map(parse_bound).transpose()?,
        to: to.map(parse_bound).transpose()?,
    };

    let entries = ctx.engine.audit_log(&filter)?;
    println!("{} audit entries", entries.len());
    for e in entries {
        println!(
            "  {} {} {} {}:{} by {}",
            e.occurred_at.to_rfc3339(),
            e.id,
            e.action,
            e.target_type,
            e.target_id,
            e.actor
        );
    }
    Ok(())
}
