//! Audit entries and the read-side filter

use akredo_core::ActorId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// What kind of record a mutating action touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Entity,
    Version,
    Transition,
    Tag,
    Notification,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Entity => "entity",
            TargetType::Version => "version",
            TargetType::Transition => "transition",
            TargetType::Tag => "tag",
            TargetType::Notification => "notification",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "entity" => Some(TargetType::Entity),
            "version" => Some(TargetType::Version),
            "transition" => Some(TargetType::Transition),
            "tag" => Some(TargetType::Tag),
            "notification" => Some(TargetType::Notification),
            _ => None,
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable audit record: who did what to which record, with
/// best-effort before/after snapshots.
///
/// Snapshots carry metadata only (status, version pointers), never raw blob
/// content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique id (`AUD-` prefix)
    pub id: String,

    pub actor: ActorId,

    /// Snake_case verb, e.g. `entity_created`, `status_changed`, `tagged`
    pub action: String,

    pub target_type: TargetType,
    pub target_id: String,

    /// State before the mutation; `Null` for creations
    pub before: Value,

    /// State after the mutation; `Null` for deletions
    pub after: Value,

    pub occurred_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        actor: ActorId,
        action: impl Into<String>,
        target_type: TargetType,
        target_id: impl Into<String>,
        before: Value,
        after: Value,
    ) -> Self {
        Self {
            id: format!(
                "AUD-{}",
                uuid::Uuid::new_v4().to_string()[..8].to_uppercase()
            ),
            actor,
            action: action.into(),
            target_type,
            target_id: target_id.into(),
            before,
            after,
            occurred_at: Utc::now(),
        }
    }
}

/// Read-side filter for the audit log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub target_id: Option<String>,
    pub actor: Option<ActorId>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl AuditFilter {
    pub fn for_target(target_id: impl Into<String>) -> Self {
        Self {
            target_id: Some(target_id.into()),
            ..Self::default()
        }
    }

    pub fn for_actor(actor: ActorId) -> Self {
        Self {
            actor: Some(actor),
            ..Self::default()
        }
    }

    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(ref target_id) = self.target_id {
            if &entry.target_id != target_id {
                return false;
            }
        }
        if let Some(ref actor) = self.actor {
            if &entry.actor != actor {
                return false;
            }
        }
        if let Some(from) = self.from {
            if entry.occurred_at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if entry.occurred_at > to {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(actor: &str, target: &str) -> AuditEntry {
        AuditEntry::new(
            ActorId::from(actor),
            "status_changed",
            TargetType::Entity,
            target,
            json!({"status": "in_review"}),
            json!({"status": "approved"}),
        )
    }

    #[test]
    fn test_entry_ids_are_unique() {
        let a = entry("reviewer-01", "DOC-1");
        let b = entry("reviewer-01", "DOC-1");

        assert!(a.id.starts_with("AUD-"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_filter_by_target_and_actor() {
        let e = entry("reviewer-01", "DOC-1");

        assert!(AuditFilter::for_target("DOC-1").matches(&e));
        assert!(!AuditFilter::for_target("DOC-2").matches(&e));
        assert!(AuditFilter::for_actor(ActorId::from("reviewer-01")).matches(&e));
        assert!(!AuditFilter::for_actor(ActorId::from("reviewer-02")).matches(&e));
        assert!(AuditFilter::default().matches(&e));
    }

    #[test]
    fn test_filter_by_date_range() {
        let e = entry("reviewer-01", "DOC-1");
        let hour = chrono::Duration::hours(1);

        let inside = AuditFilter {
            from: Some(e.occurred_at - hour),
            to: Some(e.occurred_at + hour),
            ..AuditFilter::default()
        };
        assert!(inside.matches(&e));

        let past = AuditFilter {
            to: Some(e.occurred_at - hour),
            ..AuditFilter::default()
        };
        assert!(!past.matches(&e));
    }

    #[test]
    fn test_serde_round_trip() {
        let e = entry("reviewer-01", "DOC-1");
        let json = serde_json::to_string(&e).unwrap();
        let parsed: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, e);
    }
}
