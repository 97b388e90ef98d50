//! Database models for the notification mirror.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{AuctionId, NotificationId, UserId};
use crate::notification::{Notification, NotificationKind};

/// A notification row from the `notifications` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRow {
    /// Notification UUID (same as the in-memory inbox entry).
    pub id: Uuid,
    /// Inbox owner.
    pub recipient_id: Uuid,
    /// Kind discriminator (e.g. `"outbid"`).
    pub kind: String,
    /// Short headline.
    pub title: String,
    /// Longer description.
    pub body: String,
    /// Auction the notification concerns, when applicable.
    pub auction_id: Option<Uuid>,
    /// Read flag.
    pub read: bool,
    /// Optional call-to-action link.
    pub action_url: Option<String>,
    /// Optional call-to-action label.
    pub action_label: Option<String>,
    /// Creation timestamp; replay cursor.
    pub created_at: DateTime<Utc>,
}

impl NotificationRow {
    /// Converts the row back into an inbox entry. Returns `None` when
    /// the stored kind discriminator is unknown (e.g. written by a
    /// newer version).
    #[must_use]
    pub fn into_notification(self) -> Option<Notification> {
        let kind = NotificationKind::parse(&self.kind)?;
        Some(Notification {
            id: NotificationId::from_uuid(self.id),
            recipient_id: UserId::from_uuid(self.recipient_id),
            kind,
            title: self.title,
            body: self.body,
            auction_id: self.auction_id.map(AuctionId::from_uuid),
            read: self.read,
            action_url: self.action_url,
            action_label: self.action_label,
            sender_id: None,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn row(kind: &str) -> NotificationRow {
        NotificationRow {
            id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
            kind: kind.to_string(),
            title: "You won \"Camera\"".to_string(),
            body: "Winning amount: 20000".to_string(),
            auction_id: Some(Uuid::new_v4()),
            read: true,
            action_url: Some("/auctions/x/checkout".to_string()),
            action_label: Some("Complete payment".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_back_to_inbox_entry() {
        let r = row("won");
        let id = r.id;
        let Some(n) = r.into_notification() else {
            panic!("known kind should convert");
        };
        assert_eq!(*n.id.as_uuid(), id);
        assert_eq!(n.kind, NotificationKind::Won);
        assert!(n.read);
        assert_eq!(n.action_label.as_deref(), Some("Complete payment"));
    }

    #[test]
    fn unknown_kind_is_dropped() {
        assert!(row("promotion").into_notification().is_none());
    }
}
