//! Notification inbox DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{AuctionId, NotificationId, UserId};
use crate::notification::Notification;

/// Query parameters for `GET /notifications`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct NotificationQueryParams {
    /// Inbox owner.
    pub user_id: UserId,
    /// Only return unread notifications. Defaults to false.
    #[serde(default)]
    pub unread: bool,
    /// Only return notifications created strictly after this cursor
    /// (reconnect replay).
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
}

/// A single inbox entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationDto {
    /// Notification identifier.
    pub id: NotificationId,
    /// Kind discriminator string.
    pub kind: String,
    /// Short headline.
    pub title: String,
    /// Longer description.
    pub body: String,
    /// Auction the notification concerns, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_id: Option<AuctionId>,
    /// Read flag.
    pub read: bool,
    /// Optional call-to-action link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    /// Optional call-to-action label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_label: Option<String>,
    /// Creation timestamp; replay cursor.
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationDto {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id,
            kind: n.kind.as_str().to_string(),
            title: n.title.clone(),
            body: n.body.clone(),
            auction_id: n.auction_id,
            read: n.read,
            action_url: n.action_url.clone(),
            action_label: n.action_label.clone(),
            created_at: n.created_at,
        }
    }
}

/// Response body for `GET /notifications`.
#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationListResponse {
    /// Matching notifications, newest first.
    pub data: Vec<NotificationDto>,
    /// Unread count for the whole inbox (ignores filters).
    pub unread_count: usize,
    /// Pagination metadata.
    pub pagination: super::common_dto::PaginationMeta,
}

/// Request body for `POST /notifications/mark-read`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkReadRequest {
    /// Inbox owner.
    pub user_id: UserId,
    /// Notification to mark read.
    pub id: NotificationId,
}

/// Request body for `POST /notifications/mark-all-read`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkAllReadRequest {
    /// Inbox owner.
    pub user_id: UserId,
}

/// Response body for the mark-read endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct MarkReadResponse {
    /// Number of notifications flipped to read.
    pub marked: usize,
}
