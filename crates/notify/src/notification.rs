//! Notification data structures and the dispatcher

use akredo_core::{ActorId, EntityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors when decoding recipient selectors from storage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecipientError {
    #[error("Invalid recipient selector: {0}")]
    InvalidSelector(String),
}

/// Who a notification is addressed to.
///
/// Role recipients are broadcast selectors; resolving a role to concrete
/// users is delegated to the external identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Recipient {
    User(ActorId),
    Role(String),
}

impl Recipient {
    /// Encode as a single selector string (`user:...` / `role:...`) for storage.
    pub fn as_selector(&self) -> String {
        match self {
            Recipient::User(actor) => format!("user:{}", actor),
            Recipient::Role(role) => format!("role:{}", role),
        }
    }

    pub fn parse(selector: &str) -> Result<Self, RecipientError> {
        match selector.split_once(':') {
            Some(("user", id)) if !id.is_empty() => Ok(Recipient::User(ActorId::from(id))),
            Some(("role", role)) if !role.is_empty() => Ok(Recipient::Role(role.to_string())),
            _ => Err(RecipientError::InvalidSelector(selector.to_string())),
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_selector())
    }
}

/// Notification category shown in the inbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Recipient is expected to act (review queue, revision request)
    Task,
    Reminder,
    StatusChange,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Task => "task",
            NotificationKind::Reminder => "reminder",
            NotificationKind::StatusChange => "status_change",
            NotificationKind::Info => "info",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "task" => Some(NotificationKind::Task),
            "reminder" => Some(NotificationKind::Reminder),
            "status_change" => Some(NotificationKind::StatusChange),
            "info" => Some(NotificationKind::Info),
            _ => None,
        }
    }
}

/// Inbox priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

/// A single inbox notification.
///
/// Created by the workflow engine; after creation only the consuming inbox
/// may flip `read` or delete it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique id (`NTF-` prefix)
    pub id: String,

    pub recipient: Recipient,
    pub kind: NotificationKind,
    pub priority: Priority,
    pub message: String,
    pub read: bool,
    pub related_entity: Option<EntityId>,
    pub created_at: DateTime<Utc>,
}

/// Pure side-effect producer for notifications.
///
/// Assigns each notification a unique id and nothing else; it never reads or
/// alters workflow state. Deduplication is the facade's job - one emit per
/// committed transition.
#[derive(Debug, Default, Clone)]
pub struct NotificationDispatcher;

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn emit(
        &self,
        kind: NotificationKind,
        recipient: Recipient,
        priority: Priority,
        message: impl Into<String>,
        related_entity: Option<EntityId>,
    ) -> Notification {
        Notification {
            id: format!(
                "NTF-{}",
                uuid::Uuid::new_v4().to_string()[..8].to_uppercase()
            ),
            recipient,
            kind,
            priority,
            message: message.into(),
            read: false,
            related_entity,
            created_at: Utc::now(),
        }
    }
}
