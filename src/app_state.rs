//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::notification::NotificationStore;
use crate::service::AuctionService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Auction service for all business logic.
    pub auction_service: Arc<AuctionService>,
    /// Durable per-user notification inboxes.
    pub notifications: Arc<NotificationStore>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}
