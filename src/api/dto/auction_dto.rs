//! Auction-related DTOs for create, get, list, and lifecycle actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::{AdminApproval, Auction, AuctionId, AuctionSummary, UserId};

/// Request body for `POST /auctions`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAuctionRequest {
    /// Merchant submitting the listing.
    pub merchant_id: UserId,
    /// Listing title.
    pub title: String,
    /// Listing description.
    #[serde(default)]
    pub description: String,
    /// Category name from the catalog taxonomy.
    pub category: String,
    /// Item condition: `"new"` or `"used"`.
    pub condition: String,
    /// Optional catalog product back-reference.
    #[serde(default)]
    pub product_id: Option<uuid::Uuid>,
    /// Bidding window open.
    pub start_time: DateTime<Utc>,
    /// Bidding window close.
    pub end_time: DateTime<Utc>,
    /// Opening price in minor units.
    pub starting_price: i64,
    /// Optional reserve floor.
    #[serde(default)]
    pub reserved_price: Option<i64>,
    /// Minimum delta between consecutive bids.
    pub bid_increment: i64,
    /// Units in the lot. Defaults to 1.
    #[serde(default = "default_quantity")]
    pub total_quantity: u32,
    /// Whether units may be purchased individually during the auction.
    #[serde(default)]
    pub buy_by_parts: bool,
    /// Per-unit price; required when `buy_by_parts` is set.
    #[serde(default)]
    pub single_item_price: Option<i64>,
}

fn default_quantity() -> u32 {
    1
}

/// Request body for `PUT /auctions/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AuctionActionRequest {
    /// One of `approve`, `reject`, `cancel`, `resubmit`.
    pub action: String,
    /// Machine-friendly rejection reason (reject only).
    #[serde(default)]
    pub reason: Option<String>,
    /// Free-text explanation for the merchant (reject only).
    #[serde(default)]
    pub description: Option<String>,
}

/// Rejection detail included in auction responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RejectionReasonDto {
    /// Short machine-friendly reason.
    pub reason: String,
    /// Optional free-text explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Full auction detail for create/get/action responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuctionDetailResponse {
    /// Auction identifier.
    pub id: AuctionId,
    /// Owning merchant.
    pub merchant_id: UserId,
    /// Listing title.
    pub title: String,
    /// Listing description.
    pub description: String,
    /// Category name.
    pub category: String,
    /// Item condition string.
    pub condition: String,
    /// Optional catalog product back-reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<uuid::Uuid>,
    /// Bidding window open.
    pub start_time: DateTime<Utc>,
    /// Bidding window close.
    pub end_time: DateTime<Utc>,
    /// Opening price in minor units.
    pub starting_price: i64,
    /// Optional reserve floor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserved_price: Option<i64>,
    /// Minimum delta between consecutive bids.
    pub bid_increment: i64,
    /// Units in the lot.
    pub total_quantity: u32,
    /// Units still unsold.
    pub remaining_quantity: u32,
    /// Whether units may be purchased individually.
    pub buy_by_parts: bool,
    /// Per-unit price for buy-by-parts sales.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_item_price: Option<i64>,
    /// Lifecycle status string.
    pub status: String,
    /// Approval state string.
    pub admin_approval: String,
    /// Rejection detail when `admin_approval` is `rejected`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<RejectionReasonDto>,
    /// Leading bid amount (or starting price before the first bid).
    pub current_bid: i64,
    /// What the next bid must reach to be accepted.
    pub min_next_bid: i64,
    /// Number of bids placed.
    pub bid_count: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last state mutation timestamp.
    pub last_modified_at: DateTime<Utc>,
}

impl From<&Auction> for AuctionDetailResponse {
    fn from(auction: &Auction) -> Self {
        let rejection_reason = match &auction.admin_approval {
            AdminApproval::Rejected { reason } => Some(RejectionReasonDto {
                reason: reason.reason.clone(),
                description: reason.description.clone(),
            }),
            _ => None,
        };
        Self {
            id: auction.id,
            merchant_id: auction.merchant_id,
            title: auction.title.clone(),
            description: auction.description.clone(),
            category: auction.category.clone(),
            condition: match auction.condition {
                crate::domain::Condition::New => "new".to_string(),
                crate::domain::Condition::Used => "used".to_string(),
            },
            product_id: auction.product_id,
            start_time: auction.start_time,
            end_time: auction.end_time,
            starting_price: auction.starting_price,
            reserved_price: auction.reserved_price,
            bid_increment: auction.bid_increment,
            total_quantity: auction.total_quantity,
            remaining_quantity: auction.remaining_quantity,
            buy_by_parts: auction.buy_by_parts,
            single_item_price: auction.single_item_price,
            status: auction.status.as_str().to_string(),
            admin_approval: auction.admin_approval.as_str().to_string(),
            rejection_reason,
            current_bid: auction.current_bid,
            min_next_bid: auction.min_next_bid(),
            bid_count: auction.bid_count,
            created_at: auction.created_at,
            last_modified_at: auction.last_modified_at,
        }
    }
}

/// Auction summary for list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuctionSummaryDto {
    /// Auction identifier.
    pub id: AuctionId,
    /// Listing title.
    pub title: String,
    /// Category name.
    pub category: String,
    /// Lifecycle status string.
    pub status: String,
    /// Approval state string.
    pub admin_approval: String,
    /// Leading bid amount.
    pub current_bid: i64,
    /// Number of bids placed.
    pub bid_count: u64,
    /// Bidding window close.
    pub end_time: DateTime<Utc>,
}

impl From<AuctionSummary> for AuctionSummaryDto {
    fn from(summary: AuctionSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            category: summary.category,
            status: summary.status.as_str().to_string(),
            admin_approval: summary.admin_approval,
            current_bid: summary.current_bid,
            bid_count: summary.bid_count,
            end_time: summary.end_time,
        }
    }
}

/// Paginated list response for `GET /auctions`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuctionListResponse {
    /// Auction summaries.
    pub data: Vec<AuctionSummaryDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Status filter for `GET /auctions`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AuctionFilterParams {
    /// Filter by lifecycle status: `pending`, `active`, `ended`, `cancelled`.
    #[serde(default)]
    pub status: Option<String>,
}
