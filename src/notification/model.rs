//! Notification model: per-user inbox entries with read state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{AuctionId, NotificationId, UserId};

/// Kind of notification, matching the inbox filter categories of the
/// storefront UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A bid was placed on an auction the user watches or owns.
    Bid,
    /// The user's leading bid was surpassed.
    Outbid,
    /// The user won an auction (or a buy-by-parts batch).
    Won,
    /// An auction the user participates in is about to close.
    Ending,
    /// Operational notice from the platform.
    System,
    /// High-priority warning.
    Alert,
    /// Informational state update.
    Update,
    /// The notice asks the user to do something (e.g. complete payment).
    Action,
    /// Direct message relayed from another user.
    Message,
}

impl NotificationKind {
    /// Returns the kind as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bid => "bid",
            Self::Outbid => "outbid",
            Self::Won => "won",
            Self::Ending => "ending",
            Self::System => "system",
            Self::Alert => "alert",
            Self::Update => "update",
            Self::Action => "action",
            Self::Message => "message",
        }
    }

    /// Parses the wire/database discriminator back into a kind.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bid" => Some(Self::Bid),
            "outbid" => Some(Self::Outbid),
            "won" => Some(Self::Won),
            "ending" => Some(Self::Ending),
            "system" => Some(Self::System),
            "alert" => Some(Self::Alert),
            "update" => Some(Self::Update),
            "action" => Some(Self::Action),
            "message" => Some(Self::Message),
            _ => None,
        }
    }
}

/// A single inbox entry.
///
/// Created by the event fan-out; mutated only by read-state transitions.
/// Never deleted by the user-facing flow — retention is an external
/// concern.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// Inbox owner.
    pub recipient_id: UserId,
    /// Category for inbox filtering.
    pub kind: NotificationKind,
    /// Short headline.
    pub title: String,
    /// Longer description.
    pub body: String,
    /// Auction the notification concerns, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_id: Option<AuctionId>,
    /// Whether the user has read it.
    pub read: bool,
    /// Optional deep link for a call-to-action button.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    /// Optional label for the call-to-action button.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_label: Option<String>,
    /// Originating user for relayed messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<UserId>,
    /// Creation timestamp; also the replay cursor.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates an unread notification.
    #[must_use]
    pub fn new(
        recipient_id: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        auction_id: Option<AuctionId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            recipient_id,
            kind,
            title: title.into(),
            body: body.into(),
            auction_id,
            read: false,
            action_url: None,
            action_label: None,
            sender_id: None,
            created_at,
        }
    }

    /// Attaches a call-to-action link.
    #[must_use]
    pub fn with_action(mut self, url: impl Into<String>, label: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self.action_label = Some(label.into());
        self
    }
}
