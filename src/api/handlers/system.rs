//! System endpoints: health check and event-type catalog.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// WebSocket event type info.
#[derive(Debug, Serialize, ToSchema)]
struct EventTypeInfo {
    event_type: &'static str,
    description: &'static str,
    scope: &'static str,
}

/// `GET /config/event-types` — List WebSocket event types.
#[utoipa::path(
    get,
    path = "/config/event-types",
    tag = "System",
    summary = "List WebSocket event types",
    description = "Returns metadata for every event type published over the WebSocket endpoint, including whether it is broadcast to an auction room or targeted at one user.",
    responses(
        (status = 200, description = "Event type catalog", body = Vec<EventTypeInfo>),
    )
)]
pub async fn event_types_handler() -> impl IntoResponse {
    let types = vec![
        EventTypeInfo {
            event_type: "newBid",
            description: "A bid was accepted; current price and bid count updated",
            scope: "room",
        },
        EventTypeInfo {
            event_type: "outbid",
            description: "The recipient's leading bid was surpassed",
            scope: "user",
        },
        EventTypeInfo {
            event_type: "won",
            description: "The recipient won the auction or a buy-by-parts batch",
            scope: "user",
        },
        EventTypeInfo {
            event_type: "stateChanged",
            description: "The auction moved to a new lifecycle state",
            scope: "room",
        },
        EventTypeInfo {
            event_type: "ending",
            description: "The auction is inside the ending-soon window",
            scope: "room",
        },
        EventTypeInfo {
            event_type: "system",
            description: "Operational notice for one user (approval outcomes)",
            scope: "user",
        },
    ];
    (StatusCode::OK, Json(types))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/event-types", get(event_types_handler))
}
