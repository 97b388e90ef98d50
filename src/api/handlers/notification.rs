//! Notification inbox handlers.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    MarkAllReadRequest, MarkReadRequest, MarkReadResponse, NotificationDto,
    NotificationListResponse, NotificationQueryParams, PaginationMeta, PaginationParams,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};
use crate::notification::InboxQuery;

/// `GET /notifications` — List a user's notifications.
///
/// # Errors
///
/// Returns [`GatewayError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    tag = "Notifications",
    summary = "List notifications",
    description = "Returns the user's inbox, newest first, optionally filtered to unread entries or to entries created after a cursor (reconnect replay).",
    params(NotificationQueryParams, PaginationParams),
    responses(
        (status = 200, description = "Inbox contents", body = NotificationListResponse),
    )
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(params): Query<NotificationQueryParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let query = InboxQuery {
        unread_only: params.unread,
        since: params.since,
    };
    let notifications = state.notifications.list(params.user_id, query).await;
    let unread_count = state.notifications.unread_count(params.user_id).await;

    let pagination = pagination.clamped();
    let total = notifications.len() as u32;
    let total_pages = if total == 0 {
        0
    } else {
        total.div_ceil(pagination.per_page)
    };
    let data: Vec<NotificationDto> = notifications
        .iter()
        .skip(pagination.offset())
        .take(pagination.per_page as usize)
        .map(NotificationDto::from)
        .collect();

    Ok(Json(NotificationListResponse {
        data,
        unread_count,
        pagination: PaginationMeta {
            page: pagination.page,
            per_page: pagination.per_page,
            total,
            total_pages,
        },
    }))
}

/// `POST /notifications/mark-read` — Mark one notification read.
///
/// # Errors
///
/// Returns [`GatewayError::NotificationNotFound`] if the user has no
/// such notification.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/mark-read",
    tag = "Notifications",
    summary = "Mark one notification read",
    description = "Idempotent: marking an already-read notification succeeds without effect.",
    request_body = MarkReadRequest,
    responses(
        (status = 200, description = "Notification marked read", body = MarkReadResponse),
        (status = 404, description = "Notification not found", body = ErrorResponse),
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Json(req): Json<MarkReadRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    state
        .auction_service
        .fanout()
        .mark_read(req.user_id, req.id)
        .await?;
    Ok(Json(MarkReadResponse { marked: 1 }))
}

/// `POST /notifications/mark-all-read` — Mark the whole inbox read.
///
/// # Errors
///
/// Returns [`GatewayError`] on internal failures.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/mark-all-read",
    tag = "Notifications",
    summary = "Mark all notifications read",
    description = "Flips every unread notification in the user's inbox to read and returns the count.",
    request_body = MarkAllReadRequest,
    responses(
        (status = 200, description = "Inbox marked read", body = MarkReadResponse),
    )
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Json(req): Json<MarkAllReadRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let marked = state
        .auction_service
        .fanout()
        .mark_all_read(req.user_id)
        .await;
    Ok(Json(MarkReadResponse { marked }))
}

/// Notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/mark-read", post(mark_read))
        .route("/notifications/mark-all-read", post(mark_all_read))
}
