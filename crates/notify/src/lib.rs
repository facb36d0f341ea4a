//! Akredo Notify - Typed notifications
//!
//! Notifications are produced as side effects of accepted workflow
//! transitions and consumed by a user-facing inbox (delivery and read-state
//! UI belong to an external collaborator). The engine creates them exactly
//! once per committed transition and never mutates them afterwards; only the
//! inbox flips the read flag or deletes them.

pub mod notification;

pub use notification::{
    Notification, NotificationDispatcher, NotificationKind, Priority, Recipient, RecipientError,
};
