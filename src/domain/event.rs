//! Domain events reflecting auction state mutations.
//!
//! Every state-changing operation emits [`AuctionEvent`]s through the
//! [`super::EventBus`] for live WebSocket delivery, after the durable
//! notification write has happened. Events use the public camelCase
//! wire names (`newBid`, `outbid`, `won`, `stateChanged`, `ending`,
//! `system`).
//!
//! Routing is two-scoped: room events go to subscribers of
//! `auction:{id}`, targeted events to the subscriber of `user:{id}`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::auction::AuctionStatus;
use super::ids::{AuctionId, UserId};

/// Domain event emitted after every state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AuctionEvent {
    /// A bid was accepted; broadcast to the auction room.
    NewBid {
        /// Auction identifier.
        auction_id: AuctionId,
        /// User who placed the bid.
        bidder_id: UserId,
        /// Accepted amount in minor units.
        amount: i64,
        /// Ledger size after the commit.
        bid_count: u64,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The previous leader was surpassed; targeted at that user.
    Outbid {
        /// Auction identifier.
        auction_id: AuctionId,
        /// The user who lost the lead.
        bidder_id: UserId,
        /// The new leading amount they would have to beat.
        amount: i64,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Settlement picked a winner; targeted at that user.
    Won {
        /// Auction identifier.
        auction_id: AuctionId,
        /// The winning bidder (or buy-by-parts buyer).
        bidder_id: UserId,
        /// Winning amount in minor units.
        amount: i64,
        /// Units won (1 for whole-lot auctions).
        quantity: u32,
        /// Settlement timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Lifecycle or approval state changed; broadcast to the room.
    StateChanged {
        /// Auction identifier.
        auction_id: AuctionId,
        /// New lifecycle status.
        status: AuctionStatus,
        /// New approval state string.
        admin_approval: String,
        /// Optional reason (rejection / cancellation).
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        /// Transition timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The auction is about to close; broadcast to the room.
    Ending {
        /// Auction identifier.
        auction_id: AuctionId,
        /// When bidding closes.
        ends_at: DateTime<Utc>,
        /// Emission timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Operational notice targeted at a single user (e.g. the merchant
    /// on approval or rejection).
    System {
        /// Auction the notice concerns.
        auction_id: AuctionId,
        /// Addressee.
        recipient_id: UserId,
        /// Human-readable message.
        message: String,
        /// Emission timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl AuctionEvent {
    /// Returns the auction this event concerns.
    #[must_use]
    pub const fn auction_id(&self) -> AuctionId {
        match self {
            Self::NewBid { auction_id, .. }
            | Self::Outbid { auction_id, .. }
            | Self::Won { auction_id, .. }
            | Self::StateChanged { auction_id, .. }
            | Self::Ending { auction_id, .. }
            | Self::System { auction_id, .. } => *auction_id,
        }
    }

    /// Room scope: `Some(auction_id)` for events broadcast to the
    /// auction room, `None` for targeted events.
    #[must_use]
    pub const fn room(&self) -> Option<AuctionId> {
        match self {
            Self::NewBid { auction_id, .. }
            | Self::StateChanged { auction_id, .. }
            | Self::Ending { auction_id, .. } => Some(*auction_id),
            Self::Outbid { .. } | Self::Won { .. } | Self::System { .. } => None,
        }
    }

    /// User scope: `Some(user_id)` for events addressed to one user,
    /// `None` for room broadcasts.
    #[must_use]
    pub const fn recipient(&self) -> Option<UserId> {
        match self {
            Self::Outbid { bidder_id, .. } | Self::Won { bidder_id, .. } => Some(*bidder_id),
            Self::System { recipient_id, .. } => Some(*recipient_id),
            Self::NewBid { .. } | Self::StateChanged { .. } | Self::Ending { .. } => None,
        }
    }

    /// Returns the wire event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::NewBid { .. } => "newBid",
            Self::Outbid { .. } => "outbid",
            Self::Won { .. } => "won",
            Self::StateChanged { .. } => "stateChanged",
            Self::Ending { .. } => "ending",
            Self::System { .. } => "system",
        }
    }
}
