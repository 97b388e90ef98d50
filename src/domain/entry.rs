//! Auction entry combining the aggregate with its bid ledger.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::auction::{Auction, AuctionStatus};
use super::ids::{AuctionId, UserId};
use super::ledger::BidLedger;

/// Registry entry pairing an [`Auction`] with its [`BidLedger`].
///
/// Both live behind the same per-auction lock, so the denormalized
/// `current_bid`/`bid_count` fields and the ledger can never be observed
/// disagreeing.
#[derive(Debug)]
pub struct AuctionEntry {
    /// The auction aggregate.
    pub auction: Auction,
    /// Append-only bid history for this auction.
    pub ledger: BidLedger,
    /// Whether the ending-soon warning has already been emitted.
    pub ending_notified: bool,
}

impl AuctionEntry {
    /// Creates an entry for a freshly submitted auction.
    #[must_use]
    pub fn new(auction: Auction) -> Self {
        Self {
            auction,
            ledger: BidLedger::new(),
            ending_notified: false,
        }
    }

    /// Everyone with a stake in this auction: the merchant plus every
    /// distinct bidder. Used by the fan-out to address room-scoped
    /// notifications.
    #[must_use]
    pub fn watchers(&self) -> Vec<UserId> {
        let mut watchers = vec![self.auction.merchant_id];
        for bidder in self.ledger.distinct_bidders() {
            if !watchers.contains(&bidder) {
                watchers.push(bidder);
            }
        }
        watchers
    }
}

/// Lightweight summary of an auction for list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct AuctionSummary {
    /// Auction identifier.
    pub id: AuctionId,
    /// Listing title.
    pub title: String,
    /// Category name.
    pub category: String,
    /// Lifecycle status.
    pub status: AuctionStatus,
    /// Approval state string.
    pub admin_approval: String,
    /// Leading bid amount (or starting price).
    pub current_bid: i64,
    /// Number of bids placed.
    pub bid_count: u64,
    /// Bidding window close.
    pub end_time: DateTime<Utc>,
}

impl From<&AuctionEntry> for AuctionSummary {
    fn from(entry: &AuctionEntry) -> Self {
        Self {
            id: entry.auction.id,
            title: entry.auction.title.clone(),
            category: entry.auction.category.clone(),
            status: entry.auction.status,
            admin_approval: entry.auction.admin_approval.as_str().to_string(),
            current_bid: entry.auction.current_bid,
            bid_count: entry.auction.bid_count,
            end_time: entry.auction.end_time,
        }
    }
}
