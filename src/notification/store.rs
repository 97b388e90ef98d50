//! Durable per-user notification inbox.
//!
//! The store is the durability guarantee behind at-least-once delivery:
//! live WebSocket push is best-effort, and a client that reconnects
//! replays everything created since its last-seen cursor via
//! [`NotificationStore::list`]. Read-state transitions are idempotent.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::model::Notification;
use crate::domain::{NotificationId, UserId};
use crate::error::GatewayError;

/// Query options for listing an inbox.
#[derive(Debug, Clone, Copy, Default)]
pub struct InboxQuery {
    /// Only return unread notifications.
    pub unread_only: bool,
    /// Only return notifications created strictly after this cursor
    /// (reconnect replay).
    pub since: Option<DateTime<Utc>>,
}

/// In-memory per-user inbox, keyed by recipient.
///
/// Each inbox is an append-ordered `Vec`; list queries return newest
/// first. When Postgres persistence is enabled the fan-out mirrors
/// every write there as well, so inboxes survive restarts.
#[derive(Debug, Default)]
pub struct NotificationStore {
    inboxes: RwLock<HashMap<UserId, Vec<Notification>>>,
}

impl NotificationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a notification to its recipient's inbox.
    pub async fn push(&self, notification: Notification) {
        let mut inboxes = self.inboxes.write().await;
        inboxes
            .entry(notification.recipient_id)
            .or_default()
            .push(notification);
    }

    /// Bulk-loads notifications into their inboxes, preserving read
    /// state. Used at startup to rebuild inboxes from the Postgres
    /// mirror; callers pass entries oldest first so list order matches
    /// live pushes. Returns the number restored.
    pub async fn restore(&self, notifications: Vec<Notification>) -> usize {
        let mut inboxes = self.inboxes.write().await;
        let count = notifications.len();
        for notification in notifications {
            inboxes
                .entry(notification.recipient_id)
                .or_default()
                .push(notification);
        }
        count
    }

    /// Lists a user's notifications, newest first.
    pub async fn list(&self, user_id: UserId, query: InboxQuery) -> Vec<Notification> {
        let inboxes = self.inboxes.read().await;
        let Some(inbox) = inboxes.get(&user_id) else {
            return Vec::new();
        };
        let mut result: Vec<Notification> = inbox
            .iter()
            .filter(|n| !query.unread_only || !n.read)
            .filter(|n| query.since.is_none_or(|cursor| n.created_at > cursor))
            .cloned()
            .collect();
        result.reverse();
        result
    }

    /// Number of unread notifications for the inbox badge.
    pub async fn unread_count(&self, user_id: UserId) -> usize {
        let inboxes = self.inboxes.read().await;
        inboxes
            .get(&user_id)
            .map(|inbox| inbox.iter().filter(|n| !n.read).count())
            .unwrap_or(0)
    }

    /// Marks one notification as read. Re-marking an already-read
    /// notification is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotificationNotFound`] when the ID does
    /// not exist in this user's inbox.
    pub async fn mark_read(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> Result<(), GatewayError> {
        let mut inboxes = self.inboxes.write().await;
        let notification = inboxes
            .get_mut(&user_id)
            .and_then(|inbox| inbox.iter_mut().find(|n| n.id == id))
            .ok_or(GatewayError::NotificationNotFound(*id.as_uuid()))?;
        notification.read = true;
        Ok(())
    }

    /// Marks every notification in the inbox as read, returning how many
    /// were newly marked. Idempotent: a second call returns 0.
    pub async fn mark_all_read(&self, user_id: UserId) -> usize {
        let mut inboxes = self.inboxes.write().await;
        let Some(inbox) = inboxes.get_mut(&user_id) else {
            return 0;
        };
        let mut marked = 0;
        for notification in inbox.iter_mut() {
            if !notification.read {
                notification.read = true;
                marked += 1;
            }
        }
        marked
    }
}
