//! Bid handlers: placement and history.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{BidDto, BidHistoryResponse, BidReceiptResponse, PlaceBidRequest};
use crate::app_state::AppState;
use crate::domain::AuctionId;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /auctions/:id/bids` — Submit a bid.
///
/// # Errors
///
/// Returns [`GatewayError::BidTooLow`] (with the current minimum) or
/// another 409 state-conflict variant on rejection.
#[utoipa::path(
    post,
    path = "/api/v1/auctions/{id}/bids",
    tag = "Bids",
    summary = "Place a bid",
    description = "Submits a bid for arbitration. Accepted bids return a receipt with the new minimum; rejected bids return a specific reason and, for too-low bids, the minimum the next bid must reach.",
    params(
        ("id" = uuid::Uuid, Path, description = "Auction UUID"),
    ),
    request_body = PlaceBidRequest,
    responses(
        (status = 200, description = "Bid accepted", body = BidReceiptResponse),
        (status = 400, description = "Malformed bid", body = ErrorResponse),
        (status = 404, description = "Auction not found", body = ErrorResponse),
        (status = 409, description = "Bid rejected (too low, not active, self bid, closed)", body = ErrorResponse),
    )
)]
pub async fn place_bid(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<PlaceBidRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let receipt = state
        .auction_service
        .place_bid(AuctionId::from_uuid(id), req.bidder_id, req.amount)
        .await?;
    Ok(Json(BidReceiptResponse::from(receipt)))
}

/// `GET /auctions/:id/bids` — Get the full bid history.
///
/// # Errors
///
/// Returns [`GatewayError::AuctionNotFound`] if the auction does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/auctions/{id}/bids",
    tag = "Bids",
    summary = "Get bid history",
    description = "Returns every bid on the auction, oldest first, with ledger status (active, outbid, won).",
    params(
        ("id" = uuid::Uuid, Path, description = "Auction UUID"),
    ),
    responses(
        (status = 200, description = "Bid history", body = BidHistoryResponse),
        (status = 404, description = "Auction not found", body = ErrorResponse),
    )
)]
pub async fn list_bids(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let auction_id = AuctionId::from_uuid(id);
    let history = state.auction_service.bid_history(auction_id).await?;
    let bids: Vec<BidDto> = history.iter().map(BidDto::from).collect();
    let total = bids.len() as u32;
    Ok(Json(BidHistoryResponse {
        auction_id,
        bids,
        total,
    }))
}

/// Bid routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auctions/{id}/bids", post(place_bid).get(list_bids))
}
