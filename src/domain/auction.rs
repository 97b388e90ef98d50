//! Auction aggregate and its lifecycle state machine.
//!
//! Lifecycle (`status`) and admin approval (`admin_approval`) are two
//! orthogonal enums rather than one combined status string, so invalid
//! combinations such as "active but rejected" are unrepresentable.
//! Allowed lifecycle transitions:
//!
//! ```text
//! pending ──▶ active ──▶ ended
//!    │           │
//!    └───────────┴─────▶ cancelled
//! ```
//!
//! `ended` and `cancelled` are terminal; any further transition attempt
//! is rejected with [`GatewayError::InvalidTransition`]. The approval
//! axis gates the pending → active transition: only approved auctions
//! activate once `start_time` is reached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AuctionId, UserId};
use crate::error::GatewayError;

/// Physical condition of the auctioned item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Brand new item.
    New,
    /// Previously used item.
    Used,
}

/// Lifecycle status of an auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionStatus {
    /// Created but not yet activated.
    Pending,
    /// Accepting bids.
    Active,
    /// Reached `end_time` or sold out; terminal.
    Ended,
    /// Cancelled by admin or merchant; terminal.
    Cancelled,
}

impl AuctionStatus {
    /// Returns the status as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Ended => "ended",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` for terminal states (`ended`, `cancelled`).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }
}

/// Reason attached to an admin rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionReason {
    /// Short machine-friendly reason (e.g. `"prohibited_item"`).
    pub reason: String,
    /// Optional free-text explanation for the merchant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Admin approval state, orthogonal to the lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AdminApproval {
    /// Awaiting admin review.
    Pending,
    /// Cleared for activation.
    Approved,
    /// Rejected; terminal unless the merchant edits and resubmits.
    Rejected {
        /// Why the auction was rejected.
        reason: RejectionReason,
    },
}

impl AdminApproval {
    /// Returns the approval state as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected { .. } => "rejected",
        }
    }
}

/// Parameters for creating a new auction.
#[derive(Debug, Clone)]
pub struct AuctionDraft {
    /// Merchant submitting the auction.
    pub merchant_id: UserId,
    /// Listing title.
    pub title: String,
    /// Listing description.
    pub description: String,
    /// Category name from the catalog taxonomy.
    pub category: String,
    /// Item condition.
    pub condition: Condition,
    /// Optional back-reference to a catalog product.
    pub product_id: Option<uuid::Uuid>,
    /// Bidding window open.
    pub start_time: DateTime<Utc>,
    /// Bidding window close.
    pub end_time: DateTime<Utc>,
    /// Opening price in minor units.
    pub starting_price: i64,
    /// Optional reserve floor; below it the auction ends without a winner.
    pub reserved_price: Option<i64>,
    /// Minimum delta between consecutive bids.
    pub bid_increment: i64,
    /// Units in the lot.
    pub total_quantity: u32,
    /// Whether units may be purchased individually during the auction.
    pub buy_by_parts: bool,
    /// Per-unit price; required when `buy_by_parts` is set.
    pub single_item_price: Option<i64>,
}

/// Auction aggregate.
///
/// `current_bid` and `bid_count` are denormalized from the bid ledger and
/// must equal the ledger aggregate at all times. Only the bid arbiter
/// (via [`crate::service::AuctionService`]) writes them, and only under
/// the per-auction write lock.
#[derive(Debug, Clone, Serialize)]
pub struct Auction {
    /// Unique auction identifier.
    pub id: AuctionId,
    /// Merchant who owns the listing. Merchants cannot bid on their own
    /// auctions.
    pub merchant_id: UserId,
    /// Listing title.
    pub title: String,
    /// Listing description.
    pub description: String,
    /// Category name.
    pub category: String,
    /// Item condition.
    pub condition: Condition,
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
    /// Units still unsold. Decremented by buy-by-parts sales.
    pub remaining_quantity: u32,
    /// Whether units may be purchased individually.
    pub buy_by_parts: bool,
    /// Per-unit price for buy-by-parts sales.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_item_price: Option<i64>,
    /// Lifecycle status.
    pub status: AuctionStatus,
    /// Admin approval state.
    pub admin_approval: AdminApproval,
    /// Amount of the leading bid, or `starting_price` when no bids exist.
    pub current_bid: i64,
    /// Number of bids in the ledger.
    pub bid_count: u64,
    /// Creation timestamp (immutable).
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last state mutation.
    pub last_modified_at: DateTime<Utc>,
}

impl Auction {
    /// Creates a new auction in `pending`/`pending` state from a draft.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] when the draft is
    /// malformed (inverted time window, non-positive prices, missing
    /// `single_item_price` on a buy-by-parts lot).
    pub fn from_draft(draft: AuctionDraft, now: DateTime<Utc>) -> Result<Self, GatewayError> {
        if draft.end_time <= draft.start_time {
            return Err(GatewayError::InvalidRequest(
                "end_time must be after start_time".to_string(),
            ));
        }
        if draft.starting_price <= 0 {
            return Err(GatewayError::InvalidRequest(
                "starting_price must be positive".to_string(),
            ));
        }
        if draft.bid_increment <= 0 {
            return Err(GatewayError::InvalidRequest(
                "bid_increment must be positive".to_string(),
            ));
        }
        if draft.total_quantity == 0 {
            return Err(GatewayError::InvalidRequest(
                "total_quantity must be at least 1".to_string(),
            ));
        }
        if draft.buy_by_parts && draft.single_item_price.is_none() {
            return Err(GatewayError::InvalidRequest(
                "single_item_price is required when buy_by_parts is set".to_string(),
            ));
        }
        if let Some(reserve) = draft.reserved_price
            && reserve < draft.starting_price
        {
            return Err(GatewayError::InvalidRequest(
                "reserved_price must not be below starting_price".to_string(),
            ));
        }

        Ok(Self {
            id: AuctionId::new(),
            merchant_id: draft.merchant_id,
            title: draft.title,
            description: draft.description,
            category: draft.category,
            condition: draft.condition,
            product_id: draft.product_id,
            start_time: draft.start_time,
            end_time: draft.end_time,
            starting_price: draft.starting_price,
            reserved_price: draft.reserved_price,
            bid_increment: draft.bid_increment,
            total_quantity: draft.total_quantity,
            remaining_quantity: draft.total_quantity,
            buy_by_parts: draft.buy_by_parts,
            single_item_price: draft.single_item_price,
            status: AuctionStatus::Pending,
            admin_approval: AdminApproval::Pending,
            current_bid: draft.starting_price,
            bid_count: 0,
            created_at: now,
            last_modified_at: now,
        })
    }

    /// Lowest amount the auction would accept as the next bid.
    ///
    /// `current_bid` starts at `starting_price`, so the first bid must
    /// already clear one increment above the opening price.
    #[must_use]
    pub const fn min_next_bid(&self) -> i64 {
        self.current_bid.saturating_add(self.bid_increment)
    }

    /// Checks every bid precondition except the amount and self-bid rules.
    ///
    /// # Errors
    ///
    /// Returns the first failing precondition: [`GatewayError::NotApproved`],
    /// [`GatewayError::AuctionNotActive`], [`GatewayError::NotStarted`], or
    /// [`GatewayError::BiddingClosed`].
    pub fn ensure_biddable(&self, now: DateTime<Utc>) -> Result<(), GatewayError> {
        if self.admin_approval != AdminApproval::Approved {
            return Err(GatewayError::NotApproved);
        }
        if self.status != AuctionStatus::Active {
            return Err(GatewayError::AuctionNotActive {
                status: self.status.as_str().to_string(),
            });
        }
        if now < self.start_time {
            return Err(GatewayError::NotStarted);
        }
        if now >= self.end_time {
            return Err(GatewayError::BiddingClosed);
        }
        Ok(())
    }

    /// Grants admin approval.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] unless approval is
    /// currently pending and the auction is not terminal.
    pub fn approve(&mut self, now: DateTime<Utc>) -> Result<(), GatewayError> {
        if self.status.is_terminal() {
            return Err(self.transition_error("approved"));
        }
        if self.admin_approval != AdminApproval::Pending {
            return Err(GatewayError::InvalidTransition {
                from: self.admin_approval.as_str().to_string(),
                to: "approved".to_string(),
            });
        }
        self.admin_approval = AdminApproval::Approved;
        self.last_modified_at = now;
        Ok(())
    }

    /// Rejects the auction with a reason.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] unless approval is
    /// currently pending and the auction is not terminal.
    pub fn reject(
        &mut self,
        reason: RejectionReason,
        now: DateTime<Utc>,
    ) -> Result<(), GatewayError> {
        if self.status.is_terminal() {
            return Err(self.transition_error("rejected"));
        }
        if self.admin_approval != AdminApproval::Pending {
            return Err(GatewayError::InvalidTransition {
                from: self.admin_approval.as_str().to_string(),
                to: "rejected".to_string(),
            });
        }
        self.admin_approval = AdminApproval::Rejected { reason };
        self.last_modified_at = now;
        Ok(())
    }

    /// Merchant edit-after-rejection: resets approval to pending.
    ///
    /// The lifecycle status is untouched; the auction stays `pending`
    /// until it passes review again.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] unless the auction is
    /// currently rejected and not terminal.
    pub fn resubmit(&mut self, now: DateTime<Utc>) -> Result<(), GatewayError> {
        if self.status.is_terminal() {
            return Err(self.transition_error("pending"));
        }
        if !matches!(self.admin_approval, AdminApproval::Rejected { .. }) {
            return Err(GatewayError::InvalidTransition {
                from: self.admin_approval.as_str().to_string(),
                to: "pending".to_string(),
            });
        }
        self.admin_approval = AdminApproval::Pending;
        self.last_modified_at = now;
        Ok(())
    }

    /// Cancels the auction (admin or merchant action).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] when the auction is
    /// already terminal.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), GatewayError> {
        if self.status.is_terminal() {
            return Err(self.transition_error("cancelled"));
        }
        self.status = AuctionStatus::Cancelled;
        self.last_modified_at = now;
        Ok(())
    }

    /// Activates a pending, approved auction whose window has opened.
    ///
    /// Returns `true` if the auction transitioned to `active`. Unlike the
    /// admin actions this is a no-op (not an error) when the conditions
    /// are not met, because the sweeper probes every auction on a timer.
    pub fn activate_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == AuctionStatus::Pending
            && self.admin_approval == AdminApproval::Approved
            && now >= self.start_time
        {
            self.status = AuctionStatus::Active;
            self.last_modified_at = now;
            return true;
        }
        false
    }

    /// Moves the auction to terminal `ended`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] when already terminal.
    pub fn end(&mut self, now: DateTime<Utc>) -> Result<(), GatewayError> {
        if self.status.is_terminal() {
            return Err(self.transition_error("ended"));
        }
        self.status = AuctionStatus::Ended;
        self.last_modified_at = now;
        Ok(())
    }

    /// Returns `true` when the reserve is met (or absent) for the given
    /// leading amount.
    #[must_use]
    pub fn reserve_met(&self, leading_amount: i64) -> bool {
        self.reserved_price.is_none_or(|floor| leading_amount >= floor)
    }

    /// Records a buy-by-parts sale of `quantity` units.
    ///
    /// Decrements `remaining_quantity`; when it hits zero the auction
    /// moves to terminal `ended`. Returns `true` when the sale exhausted
    /// the lot. Bidding does not re-open after a partial sale.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for non-buy-by-parts lots
    /// or a zero quantity, [`GatewayError::AuctionNotActive`] when not
    /// active, and [`GatewayError::QuantityExhausted`] when fewer units
    /// remain than requested.
    pub fn record_partial_sale(
        &mut self,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<bool, GatewayError> {
        if !self.buy_by_parts {
            return Err(GatewayError::InvalidRequest(
                "auction does not sell by parts".to_string(),
            ));
        }
        if quantity == 0 {
            return Err(GatewayError::InvalidRequest(
                "quantity must be at least 1".to_string(),
            ));
        }
        if self.status != AuctionStatus::Active {
            return Err(GatewayError::AuctionNotActive {
                status: self.status.as_str().to_string(),
            });
        }
        if quantity > self.remaining_quantity {
            return Err(GatewayError::QuantityExhausted {
                remaining: self.remaining_quantity,
            });
        }
        self.remaining_quantity -= quantity;
        self.last_modified_at = now;
        if self.remaining_quantity == 0 {
            self.status = AuctionStatus::Ended;
            return Ok(true);
        }
        Ok(false)
    }

    fn transition_error(&self, to: &str) -> GatewayError {
        GatewayError::InvalidTransition {
            from: self.status.as_str().to_string(),
            to: to.to_string(),
        }
    }
}
