//! Bid-related DTOs: placement, receipts, and history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AuctionId, Bid, BidId, UserId};
use crate::service::{BidReceipt, PartialSaleReceipt};

/// Request body for `POST /auctions/{id}/bids`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceBidRequest {
    /// Bidding user.
    pub bidder_id: UserId,
    /// Bid amount in minor units.
    pub amount: i64,
}

/// Response body for an accepted bid.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BidReceiptResponse {
    /// Auction the bid was placed on.
    pub auction_id: AuctionId,
    /// Identifier of the committed bid.
    pub bid_id: BidId,
    /// The new leader.
    pub bidder_id: UserId,
    /// Accepted amount.
    pub amount: i64,
    /// Ledger size after the commit.
    pub bid_count: u64,
    /// Bidder who lost the lead, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_leader: Option<UserId>,
    /// What the next bid must reach.
    pub min_next_bid: i64,
    /// Commit timestamp.
    pub placed_at: DateTime<Utc>,
}

impl From<BidReceipt> for BidReceiptResponse {
    fn from(receipt: BidReceipt) -> Self {
        Self {
            auction_id: receipt.auction_id,
            bid_id: receipt.bid_id,
            bidder_id: receipt.bidder_id,
            amount: receipt.amount,
            bid_count: receipt.bid_count,
            previous_leader: receipt.previous_leader,
            min_next_bid: receipt.min_next_bid,
            placed_at: receipt.placed_at,
        }
    }
}

/// A single bid in the history response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BidDto {
    /// Bid identifier.
    pub id: BidId,
    /// Bidding user.
    pub bidder_id: UserId,
    /// Bid amount in minor units.
    pub amount: i64,
    /// Ledger status: `active`, `outbid`, or `won`.
    pub status: String,
    /// Commit timestamp.
    pub placed_at: DateTime<Utc>,
}

impl From<&Bid> for BidDto {
    fn from(bid: &Bid) -> Self {
        Self {
            id: bid.id,
            bidder_id: bid.bidder_id,
            amount: bid.amount,
            status: bid.status.as_str().to_string(),
            placed_at: bid.placed_at,
        }
    }
}

/// Response body for `GET /auctions/{id}/bids`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BidHistoryResponse {
    /// Auction identifier.
    pub auction_id: AuctionId,
    /// All bids, oldest first.
    pub bids: Vec<BidDto>,
    /// Total number of bids.
    pub total: u32,
}

/// Request body for `POST /auctions/{id}/sales` (buy-by-parts).
#[derive(Debug, Deserialize, ToSchema)]
pub struct PartialSaleRequest {
    /// Purchasing user.
    pub buyer_id: UserId,
    /// Units to purchase.
    pub quantity: u32,
}

/// Response body for a recorded buy-by-parts sale.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PartialSaleResponse {
    /// Auction the sale belongs to.
    pub auction_id: AuctionId,
    /// Purchasing user.
    pub buyer_id: UserId,
    /// Units sold.
    pub quantity: u32,
    /// Total price in minor units.
    pub total_price: i64,
    /// Units left after the sale.
    pub remaining_quantity: u32,
    /// Whether the sale exhausted the lot and ended the auction.
    pub ended: bool,
}

impl From<PartialSaleReceipt> for PartialSaleResponse {
    fn from(receipt: PartialSaleReceipt) -> Self {
        Self {
            auction_id: receipt.auction_id,
            buyer_id: receipt.buyer_id,
            quantity: receipt.quantity,
            total_price: receipt.total_price,
            remaining_quantity: receipt.remaining_quantity,
            ended: receipt.ended,
        }
    }
}
