//! Append-only bid ledger.
//!
//! The ledger is the single source of truth for "current highest bid".
//! Bids are never removed; surpassed bids flip to `outbid` and the final
//! leader flips to `won` at settlement. The auction's denormalized
//! `current_bid`/`bid_count` fields are recomputed from the ledger on
//! every accepted bid, under the same per-auction write lock.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::{AuctionId, BidId, UserId};

/// Status of a single bid in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    /// The current leader. At most one per auction.
    Active,
    /// Surpassed by a later, higher bid.
    Outbid,
    /// The leader at settlement time, with the reserve met.
    Won,
}

impl BidStatus {
    /// Returns the status as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Outbid => "outbid",
            Self::Won => "won",
        }
    }
}

/// A single bid record.
#[derive(Debug, Clone, Serialize)]
pub struct Bid {
    /// Unique bid identifier.
    pub id: BidId,
    /// Auction this bid belongs to.
    pub auction_id: AuctionId,
    /// User who placed the bid.
    pub bidder_id: UserId,
    /// Bid amount in minor units.
    pub amount: i64,
    /// When the bid was committed.
    pub placed_at: DateTime<Utc>,
    /// Current status.
    pub status: BidStatus,
}

impl Bid {
    /// Creates a new leading bid.
    #[must_use]
    pub fn new(
        auction_id: AuctionId,
        bidder_id: UserId,
        amount: i64,
        placed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BidId::new(),
            auction_id,
            bidder_id,
            amount,
            placed_at,
            status: BidStatus::Active,
        }
    }
}

/// Append-only store of all bids placed on one auction.
#[derive(Debug, Default)]
pub struct BidLedger {
    bids: Vec<Bid>,
}

impl BidLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new leading bid, flipping the previous leader to
    /// `outbid`. Returns the previous leader's bidder so the caller can
    /// target the outbid notification.
    pub fn append_leader(&mut self, bid: Bid) -> Option<UserId> {
        let previous = self
            .bids
            .iter_mut()
            .find(|b| b.status == BidStatus::Active)
            .map(|b| {
                b.status = BidStatus::Outbid;
                b.bidder_id
            });
        self.bids.push(bid);
        previous
    }

    /// Returns the current leading bid, if any.
    #[must_use]
    pub fn leader(&self) -> Option<&Bid> {
        self.bids.iter().find(|b| b.status == BidStatus::Active)
    }

    /// Flips the current leader to `won`, returning a copy of it.
    ///
    /// Called once at settlement; returns `None` when no leader exists.
    pub fn settle_winner(&mut self) -> Option<Bid> {
        let winner = self
            .bids
            .iter_mut()
            .find(|b| b.status == BidStatus::Active)?;
        winner.status = BidStatus::Won;
        Some(winner.clone())
    }

    /// Number of bids in the ledger.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bids.len()
    }

    /// Returns `true` when no bids have been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }

    /// Full bid history, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Bid] {
        &self.bids
    }

    /// Distinct bidders that have participated, in first-bid order.
    #[must_use]
    pub fn distinct_bidders(&self) -> Vec<UserId> {
        let mut seen = Vec::new();
        for bid in &self.bids {
            if !seen.contains(&bid.bidder_id) {
                seen.push(bid.bidder_id);
            }
        }
        seen
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn bid(auction_id: AuctionId, bidder: UserId, amount: i64) -> Bid {
        Bid::new(auction_id, bidder, amount, Utc::now())
    }

    #[test]
    fn first_bid_has_no_previous_leader() {
        let auction_id = AuctionId::new();
        let mut ledger = BidLedger::new();
        let previous = ledger.append_leader(bid(auction_id, UserId::new(), 11_000));
        assert!(previous.is_none());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn at_most_one_active_bid() {
        let auction_id = AuctionId::new();
        let alice = UserId::new();
        let bob = UserId::new();
        let mut ledger = BidLedger::new();

        ledger.append_leader(bid(auction_id, alice, 11_000));
        let previous = ledger.append_leader(bid(auction_id, bob, 12_000));
        assert_eq!(previous, Some(alice));

        let active = ledger
            .history()
            .iter()
            .filter(|b| b.status == BidStatus::Active)
            .count();
        assert_eq!(active, 1);

        let Some(leader) = ledger.leader() else {
            panic!("leader expected");
        };
        assert_eq!(leader.bidder_id, bob);
        assert_eq!(leader.amount, 12_000);
    }

    #[test]
    fn surpassed_bids_are_outbid() {
        let auction_id = AuctionId::new();
        let mut ledger = BidLedger::new();
        ledger.append_leader(bid(auction_id, UserId::new(), 11_000));
        ledger.append_leader(bid(auction_id, UserId::new(), 12_000));
        ledger.append_leader(bid(auction_id, UserId::new(), 13_000));

        let outbid = ledger
            .history()
            .iter()
            .filter(|b| b.status == BidStatus::Outbid)
            .count();
        assert_eq!(outbid, 2);
    }

    #[test]
    fn settle_winner_flips_leader() {
        let auction_id = AuctionId::new();
        let winner_id = UserId::new();
        let mut ledger = BidLedger::new();
        ledger.append_leader(bid(auction_id, UserId::new(), 11_000));
        ledger.append_leader(bid(auction_id, winner_id, 12_000));

        let Some(winner) = ledger.settle_winner() else {
            panic!("winner expected");
        };
        assert_eq!(winner.bidder_id, winner_id);
        assert_eq!(winner.status, BidStatus::Won);
        assert!(ledger.leader().is_none());
    }

    #[test]
    fn settle_without_bids_returns_none() {
        let mut ledger = BidLedger::new();
        assert!(ledger.settle_winner().is_none());
    }

    #[test]
    fn distinct_bidders_dedupes() {
        let auction_id = AuctionId::new();
        let alice = UserId::new();
        let bob = UserId::new();
        let mut ledger = BidLedger::new();
        ledger.append_leader(bid(auction_id, alice, 11_000));
        ledger.append_leader(bid(auction_id, bob, 12_000));
        ledger.append_leader(bid(auction_id, alice, 13_000));

        assert_eq!(ledger.distinct_bidders(), vec![alice, bob]);
    }
}
