//! REST endpoint handlers organized by resource.

pub mod auction;
pub mod bid;
pub mod notification;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auction::routes())
        .merge(bid::routes())
        .merge(notification::routes())
}
