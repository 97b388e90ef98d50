//! Auction handlers: create, list, get, lifecycle actions, and
//! buy-by-parts sales.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AuctionActionRequest, AuctionDetailResponse, AuctionFilterParams, AuctionListResponse,
    AuctionSummaryDto, CreateAuctionRequest, PaginationMeta, PaginationParams, PartialSaleRequest,
    PartialSaleResponse,
};
use crate::app_state::AppState;
use crate::domain::{AuctionDraft, AuctionId, AuctionStatus, Condition, RejectionReason};
use crate::error::{ErrorResponse, GatewayError};
use crate::service::AdminAction;

/// `POST /auctions` — Submit a new auction for review.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on a malformed submission.
#[utoipa::path(
    post,
    path = "/api/v1/auctions",
    tag = "Auctions",
    summary = "Create a new auction",
    description = "Creates an auction in pending state awaiting admin approval. It becomes visible to bidders only after approval and activation at its start time.",
    request_body = CreateAuctionRequest,
    responses(
        (status = 201, description = "Auction created", body = AuctionDetailResponse),
        (status = 400, description = "Invalid submission", body = ErrorResponse),
    )
)]
pub async fn create_auction(
    State(state): State<AppState>,
    Json(req): Json<CreateAuctionRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let condition = match req.condition.as_str() {
        "new" => Condition::New,
        "used" => Condition::Used,
        other => {
            return Err(GatewayError::InvalidRequest(format!(
                "unknown condition: {other}"
            )));
        }
    };

    let draft = AuctionDraft {
        merchant_id: req.merchant_id,
        title: req.title,
        description: req.description,
        category: req.category,
        condition,
        product_id: req.product_id,
        start_time: req.start_time,
        end_time: req.end_time,
        starting_price: req.starting_price,
        reserved_price: req.reserved_price,
        bid_increment: req.bid_increment,
        total_quantity: req.total_quantity,
        buy_by_parts: req.buy_by_parts,
        single_item_price: req.single_item_price,
    };

    let auction = state.auction_service.create_auction(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuctionDetailResponse::from(&auction)),
    ))
}

/// `GET /auctions` — List auctions with pagination and status filter.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on an unknown status filter.
#[utoipa::path(
    get,
    path = "/api/v1/auctions",
    tag = "Auctions",
    summary = "List auctions",
    description = "Returns a paginated list of auctions, optionally filtered by lifecycle status.",
    params(PaginationParams, AuctionFilterParams),
    responses(
        (status = 200, description = "Paginated auction list", body = AuctionListResponse),
        (status = 400, description = "Unknown status filter", body = ErrorResponse),
    )
)]
pub async fn list_auctions(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<AuctionFilterParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let status = match filter.status.as_deref() {
        None => None,
        Some("pending") => Some(AuctionStatus::Pending),
        Some("active") => Some(AuctionStatus::Active),
        Some("ended") => Some(AuctionStatus::Ended),
        Some("cancelled") => Some(AuctionStatus::Cancelled),
        Some(other) => {
            return Err(GatewayError::InvalidRequest(format!(
                "unknown status: {other}"
            )));
        }
    };

    let params = params.clamped();
    let summaries = state.auction_service.list_auctions(status).await;

    let total = summaries.len() as u32;
    let per_page = params.per_page;
    let page = params.page;
    let total_pages = if total == 0 {
        0
    } else {
        total.div_ceil(per_page)
    };

    let data: Vec<AuctionSummaryDto> = summaries
        .into_iter()
        .skip(params.offset())
        .take(per_page as usize)
        .map(AuctionSummaryDto::from)
        .collect();

    Ok(Json(AuctionListResponse {
        data,
        pagination: PaginationMeta {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

/// `GET /auctions/:id` — Get full auction details.
///
/// # Errors
///
/// Returns [`GatewayError::AuctionNotFound`] if the auction does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/auctions/{id}",
    tag = "Auctions",
    summary = "Get auction details",
    description = "Returns the full auction state including the current leading bid, the minimum next bid, and approval state.",
    params(
        ("id" = uuid::Uuid, Path, description = "Auction UUID"),
    ),
    responses(
        (status = 200, description = "Auction details", body = AuctionDetailResponse),
        (status = 404, description = "Auction not found", body = ErrorResponse),
    )
)]
pub async fn get_auction(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let auction = state
        .auction_service
        .get_auction(AuctionId::from_uuid(id))
        .await?;
    Ok(Json(AuctionDetailResponse::from(&auction)))
}

/// `PUT /auctions/:id` — Apply a lifecycle action.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidTransition`] for actions not allowed
/// from the current state.
#[utoipa::path(
    put,
    path = "/api/v1/auctions/{id}",
    tag = "Auctions",
    summary = "Apply a lifecycle action",
    description = "Applies approve, reject (with reason), cancel, or resubmit. Resubmit is the merchant's edit-after-rejection trigger and resets approval to pending.",
    params(
        ("id" = uuid::Uuid, Path, description = "Auction UUID"),
    ),
    request_body = AuctionActionRequest,
    responses(
        (status = 200, description = "Updated auction state", body = AuctionDetailResponse),
        (status = 404, description = "Auction not found", body = ErrorResponse),
        (status = 409, description = "Action not allowed from the current state", body = ErrorResponse),
    )
)]
pub async fn apply_action(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<AuctionActionRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let action = match req.action.as_str() {
        "approve" => AdminAction::Approve,
        "reject" => AdminAction::Reject {
            reason: RejectionReason {
                reason: req
                    .reason
                    .ok_or_else(|| GatewayError::InvalidRequest("reject requires a reason".to_string()))?,
                description: req.description,
            },
        },
        "cancel" => AdminAction::Cancel,
        "resubmit" => AdminAction::Resubmit,
        other => return Err(GatewayError::InvalidAction(other.to_string())),
    };

    let auction = state
        .auction_service
        .admin_action(AuctionId::from_uuid(id), action)
        .await?;
    Ok(Json(AuctionDetailResponse::from(&auction)))
}

/// `POST /auctions/:id/sales` — Record a buy-by-parts purchase.
///
/// # Errors
///
/// Returns [`GatewayError::QuantityExhausted`] when fewer units remain
/// than requested, or a state-conflict error outside the active window.
#[utoipa::path(
    post,
    path = "/api/v1/auctions/{id}/sales",
    tag = "Auctions",
    summary = "Record a buy-by-parts sale",
    description = "Settlement callback for a per-unit purchase on a buy-by-parts lot. Selling the last unit ends the auction.",
    params(
        ("id" = uuid::Uuid, Path, description = "Auction UUID"),
    ),
    request_body = PartialSaleRequest,
    responses(
        (status = 200, description = "Sale recorded", body = PartialSaleResponse),
        (status = 404, description = "Auction not found", body = ErrorResponse),
        (status = 409, description = "Not active or quantity exhausted", body = ErrorResponse),
    )
)]
pub async fn record_sale(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<PartialSaleRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let receipt = state
        .auction_service
        .record_partial_sale(AuctionId::from_uuid(id), req.buyer_id, req.quantity)
        .await?;
    Ok(Json(PartialSaleResponse::from(receipt)))
}

/// Auction management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auctions", post(create_auction).get(list_auctions))
        .route("/auctions/{id}", get(get_auction).put(apply_action))
        .route("/auctions/{id}/sales", post(record_sale))
}
