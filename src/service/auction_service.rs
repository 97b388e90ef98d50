//! Auction service: bid arbitration and lifecycle orchestration.
//!
//! Every mutation follows the pattern: acquire the per-auction write
//! lock → validate → commit ledger + denormalized fields together →
//! drop the lock → fan out. Because validation and commit happen under
//! one lock, the loser of a concurrent bid race is re-validated against
//! the post-commit state and told the minimum it actually has to beat.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::{
    Auction, AuctionDraft, AuctionEntry, AuctionId, AuctionRegistry, AuctionStatus,
    AuctionSummary, Bid, BidId, RejectionReason, UserId,
};
use crate::error::GatewayError;
use crate::service::fanout::EventFanout;

/// Admin or merchant action on an auction's lifecycle.
#[derive(Debug, Clone)]
pub enum AdminAction {
    /// Grant admin approval.
    Approve,
    /// Reject with a reason.
    Reject {
        /// Why the auction was rejected.
        reason: RejectionReason,
    },
    /// Cancel the auction.
    Cancel,
    /// Merchant edit-after-rejection; resets approval to pending.
    Resubmit,
}

/// Outcome of an accepted bid.
#[derive(Debug, Clone, Serialize)]
pub struct BidReceipt {
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
    /// What the next bid would have to reach.
    pub min_next_bid: i64,
    /// Commit timestamp.
    pub placed_at: DateTime<Utc>,
}

/// Outcome of a buy-by-parts sale.
#[derive(Debug, Clone, Serialize)]
pub struct PartialSaleReceipt {
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

/// Counters from one sweeper pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepStats {
    /// Auctions transitioned pending → active.
    pub activated: usize,
    /// Ending-soon warnings emitted.
    pub ending_warned: usize,
    /// Auctions settled at `end_time`.
    pub ended: usize,
}

/// Orchestration layer for all auction operations.
///
/// Stateless coordinator: owns references to [`AuctionRegistry`] for
/// state and [`EventFanout`] for delivery. Only this service writes the
/// auction's bid fields; only its lifecycle methods write
/// status/approval.
#[derive(Debug, Clone)]
pub struct AuctionService {
    registry: Arc<AuctionRegistry>,
    fanout: EventFanout,
}

impl AuctionService {
    /// Creates a new `AuctionService`.
    #[must_use]
    pub fn new(registry: Arc<AuctionRegistry>, fanout: EventFanout) -> Self {
        Self { registry, fanout }
    }

    /// Returns a reference to the inner [`EventFanout`].
    #[must_use]
    pub fn fanout(&self) -> &EventFanout {
        &self.fanout
    }

    /// Returns a reference to the inner [`AuctionRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<AuctionRegistry> {
        &self.registry
    }

    /// Creates a new auction from a merchant submission.
    ///
    /// The auction starts in `pending`/`pending` and is invisible to
    /// bidders until approved and activated.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for a malformed draft.
    pub async fn create_auction(&self, draft: AuctionDraft) -> Result<Auction, GatewayError> {
        let now = Utc::now();
        let auction = Auction::from_draft(draft, now)?;
        let snapshot = auction.clone();
        let auction_id = self.registry.insert(AuctionEntry::new(auction)).await?;
        tracing::info!(%auction_id, "auction created");
        Ok(snapshot)
    }

    /// Returns a point-in-time copy of the auction.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AuctionNotFound`] for an unknown ID.
    pub async fn get_auction(&self, auction_id: AuctionId) -> Result<Auction, GatewayError> {
        let entry_lock = self.registry.get(auction_id).await?;
        let entry = entry_lock.read().await;
        Ok(entry.auction.clone())
    }

    /// Returns the full bid history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AuctionNotFound`] for an unknown ID.
    pub async fn bid_history(&self, auction_id: AuctionId) -> Result<Vec<Bid>, GatewayError> {
        let entry_lock = self.registry.get(auction_id).await?;
        let entry = entry_lock.read().await;
        Ok(entry.ledger.history().to_vec())
    }

    /// Returns summaries of all auctions, optionally filtered by status.
    pub async fn list_auctions(&self, status: Option<AuctionStatus>) -> Vec<AuctionSummary> {
        self.registry.list(status).await
    }

    /// Submits a bid. Validation order: lifecycle/approval/window, then
    /// amount against the current minimum, then the self-bid rule.
    ///
    /// # Errors
    ///
    /// Returns the first failing precondition as a [`GatewayError`]
    /// state-conflict variant. The [`GatewayError::BidTooLow`] minimum
    /// is computed against the committed leader at arbitration time.
    pub async fn place_bid(
        &self,
        auction_id: AuctionId,
        bidder_id: UserId,
        amount: i64,
    ) -> Result<BidReceipt, GatewayError> {
        if amount <= 0 {
            return Err(GatewayError::InvalidRequest(
                "amount must be positive".to_string(),
            ));
        }

        let entry_lock = self.registry.get(auction_id).await?;
        let mut entry = entry_lock.write().await;
        let now = Utc::now();

        entry.auction.ensure_biddable(now)?;
        let minimum = entry.auction.min_next_bid();
        if amount < minimum {
            return Err(GatewayError::BidTooLow { minimum });
        }
        if bidder_id == entry.auction.merchant_id {
            return Err(GatewayError::SelfBid);
        }

        // Commit: ledger append and denormalized fields move together
        // under the same write lock.
        let bid = Bid::new(auction_id, bidder_id, amount, now);
        let bid_id = bid.id;
        let previous_leader = entry.ledger.append_leader(bid);
        entry.auction.current_bid = amount;
        entry.auction.bid_count = entry.ledger.len() as u64;
        entry.auction.last_modified_at = now;

        let title = entry.auction.title.clone();
        let merchant_id = entry.auction.merchant_id;
        let bid_count = entry.auction.bid_count;
        let min_next_bid = entry.auction.min_next_bid();
        drop(entry);

        self.fanout
            .bid_placed(
                auction_id,
                &title,
                bidder_id,
                amount,
                bid_count,
                merchant_id,
                previous_leader,
                now,
            )
            .await;

        tracing::info!(%auction_id, %bidder_id, amount, "bid accepted");
        Ok(BidReceipt {
            auction_id,
            bid_id,
            bidder_id,
            amount,
            bid_count,
            previous_leader,
            min_next_bid,
            placed_at: now,
        })
    }

    /// Applies an admin or merchant lifecycle action.
    ///
    /// Approval of an auction whose window is already open activates it
    /// immediately; otherwise the sweeper activates it at `start_time`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] for actions not
    /// allowed from the current state, or
    /// [`GatewayError::AuctionNotFound`] for an unknown ID.
    pub async fn admin_action(
        &self,
        auction_id: AuctionId,
        action: AdminAction,
    ) -> Result<Auction, GatewayError> {
        let entry_lock = self.registry.get(auction_id).await?;
        let mut entry = entry_lock.write().await;
        let now = Utc::now();

        match action {
            AdminAction::Approve => {
                entry.auction.approve(now)?;
                let activated = entry.auction.activate_if_due(now);
                let snapshot = entry.auction.clone();
                let watchers = entry.watchers();
                drop(entry);

                self.fanout
                    .approval_changed(auction_id, &snapshot.title, snapshot.merchant_id, true, None, now)
                    .await;
                if activated {
                    self.fanout
                        .state_changed(
                            auction_id,
                            &snapshot.title,
                            snapshot.status,
                            snapshot.admin_approval.as_str(),
                            None,
                            &watchers,
                            now,
                        )
                        .await;
                }
                tracing::info!(%auction_id, activated, "auction approved");
                Ok(snapshot)
            }
            AdminAction::Reject { reason } => {
                entry.auction.reject(reason.clone(), now)?;
                let snapshot = entry.auction.clone();
                drop(entry);

                self.fanout
                    .approval_changed(
                        auction_id,
                        &snapshot.title,
                        snapshot.merchant_id,
                        false,
                        Some(reason.reason),
                        now,
                    )
                    .await;
                tracing::info!(%auction_id, "auction rejected");
                Ok(snapshot)
            }
            AdminAction::Cancel => {
                entry.auction.cancel(now)?;
                let snapshot = entry.auction.clone();
                let watchers = entry.watchers();
                drop(entry);

                self.fanout
                    .state_changed(
                        auction_id,
                        &snapshot.title,
                        snapshot.status,
                        snapshot.admin_approval.as_str(),
                        Some("cancelled".to_string()),
                        &watchers,
                        now,
                    )
                    .await;
                tracing::info!(%auction_id, "auction cancelled");
                Ok(snapshot)
            }
            AdminAction::Resubmit => {
                entry.auction.resubmit(now)?;
                let snapshot = entry.auction.clone();
                tracing::info!(%auction_id, "auction resubmitted for review");
                Ok(snapshot)
            }
        }
    }

    /// Records a buy-by-parts purchase of `quantity` units at the
    /// per-unit price. Bidding does not re-open; the lot ends when the
    /// last unit sells.
    ///
    /// # Errors
    ///
    /// Propagates the state-machine errors from
    /// [`Auction::record_partial_sale`], plus [`GatewayError::SelfBid`]
    /// when the merchant buys from themselves.
    pub async fn record_partial_sale(
        &self,
        auction_id: AuctionId,
        buyer_id: UserId,
        quantity: u32,
    ) -> Result<PartialSaleReceipt, GatewayError> {
        let entry_lock = self.registry.get(auction_id).await?;
        let mut entry = entry_lock.write().await;
        let now = Utc::now();

        if buyer_id == entry.auction.merchant_id {
            return Err(GatewayError::SelfBid);
        }
        let unit_price = entry.auction.single_item_price.ok_or_else(|| {
            GatewayError::InvalidRequest("auction does not sell by parts".to_string())
        })?;

        let ended = entry.auction.record_partial_sale(quantity, now)?;
        let total_price = unit_price.saturating_mul(i64::from(quantity));
        let remaining_quantity = entry.auction.remaining_quantity;
        let snapshot = entry.auction.clone();
        let watchers = entry.watchers();
        drop(entry);

        self.fanout
            .auction_won(
                auction_id,
                &snapshot.title,
                buyer_id,
                total_price,
                quantity,
                snapshot.merchant_id,
                now,
            )
            .await;
        if ended {
            self.fanout
                .state_changed(
                    auction_id,
                    &snapshot.title,
                    snapshot.status,
                    snapshot.admin_approval.as_str(),
                    Some("sold out".to_string()),
                    &watchers,
                    now,
                )
                .await;
        }

        tracing::info!(%auction_id, %buyer_id, quantity, "partial sale recorded");
        Ok(PartialSaleReceipt {
            auction_id,
            buyer_id,
            quantity,
            total_price,
            remaining_quantity,
            ended,
        })
    }

    /// One sweeper pass over every non-terminal auction: activates due
    /// auctions, emits one ending-soon warning inside the window, and
    /// settles auctions whose `end_time` has passed.
    pub async fn sweep(&self, now: DateTime<Utc>, ending_soon: Duration) -> SweepStats {
        let mut stats = SweepStats::default();

        for entry_lock in self.registry.live_entries().await {
            let mut entry = entry_lock.write().await;
            let auction_id = entry.auction.id;

            if entry.auction.activate_if_due(now) {
                let snapshot = entry.auction.clone();
                let watchers = entry.watchers();
                drop(entry);
                stats.activated += 1;
                self.fanout
                    .state_changed(
                        auction_id,
                        &snapshot.title,
                        snapshot.status,
                        snapshot.admin_approval.as_str(),
                        None,
                        &watchers,
                        now,
                    )
                    .await;
                continue;
            }

            // Covers active auctions reaching end_time and pending ones
            // whose window elapsed without ever activating.
            if !entry.auction.status.is_terminal() && now >= entry.auction.end_time {
                stats.ended += 1;
                self.settle(entry, now).await;
                continue;
            }

            if entry.auction.status == AuctionStatus::Active
                && !entry.ending_notified
                && entry.auction.end_time - now <= ending_soon
            {
                entry.ending_notified = true;
                let snapshot = entry.auction.clone();
                let leader = entry.ledger.leader().map(|b| b.bidder_id);
                drop(entry);
                stats.ending_warned += 1;
                self.fanout
                    .auction_ending(
                        auction_id,
                        &snapshot.title,
                        snapshot.end_time,
                        leader,
                        snapshot.merchant_id,
                        now,
                    )
                    .await;
            }
        }

        stats
    }

    /// Ends one auction and settles the winner.
    ///
    /// The leading bid flips to `won` only when it clears the reserve;
    /// otherwise the auction ends with no winner and no `won` event.
    async fn settle(
        &self,
        mut entry: tokio::sync::RwLockWriteGuard<'_, AuctionEntry>,
        now: DateTime<Utc>,
    ) {
        let auction_id = entry.auction.id;
        if let Err(e) = entry.auction.end(now) {
            // Raced with an admin cancel; nothing to settle.
            tracing::debug!(%auction_id, error = %e, "skipping settlement");
            return;
        }

        let winner = match entry.ledger.leader() {
            Some(leader) if entry.auction.reserve_met(leader.amount) => entry.ledger.settle_winner(),
            _ => None,
        };

        let snapshot = entry.auction.clone();
        let watchers = entry.watchers();
        drop(entry);

        self.fanout
            .state_changed(
                auction_id,
                &snapshot.title,
                snapshot.status,
                snapshot.admin_approval.as_str(),
                None,
                &watchers,
                now,
            )
            .await;

        if let Some(winning_bid) = winner {
            self.fanout
                .auction_won(
                    auction_id,
                    &snapshot.title,
                    winning_bid.bidder_id,
                    winning_bid.amount,
                    snapshot.remaining_quantity.max(1),
                    snapshot.merchant_id,
                    now,
                )
                .await;
            tracing::info!(%auction_id, winner = %winning_bid.bidder_id, "auction settled with winner");
        } else {
            tracing::info!(%auction_id, "auction ended without winner");
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{AdminApproval, BidStatus, Condition, EventBus};
    use crate::notification::{InboxQuery, NotificationKind, NotificationStore};

    struct Harness {
        service: AuctionService,
        store: Arc<NotificationStore>,
    }

    fn harness() -> Harness {
        let registry = Arc::new(AuctionRegistry::new());
        let store = Arc::new(NotificationStore::new());
        let fanout = EventFanout::new(Arc::clone(&store), EventBus::new(1000), None);
        Harness {
            service: AuctionService::new(registry, fanout),
            store,
        }
    }

    fn draft(merchant: UserId, starting_price: i64, increment: i64) -> AuctionDraft {
        let now = Utc::now();
        AuctionDraft {
            merchant_id: merchant,
            title: "Vintage camera".to_string(),
            description: "Working condition".to_string(),
            category: "electronics".to_string(),
            condition: Condition::Used,
            product_id: None,
            start_time: now - Duration::minutes(1),
            end_time: now + Duration::hours(1),
            starting_price,
            reserved_price: None,
            bid_increment: increment,
            total_quantity: 1,
            buy_by_parts: false,
            single_item_price: None,
        }
    }

    async fn live_auction(h: &Harness, d: AuctionDraft) -> AuctionId {
        let Ok(auction) = h.service.create_auction(d).await else {
            panic!("create should succeed");
        };
        // Approve activates immediately because start_time is in the past.
        let Ok(approved) = h
            .service
            .admin_action(auction.id, AdminAction::Approve)
            .await
        else {
            panic!("approve should succeed");
        };
        assert_eq!(approved.status, AuctionStatus::Active);
        auction.id
    }

    #[tokio::test]
    async fn bid_on_unapproved_auction_is_rejected() {
        let h = harness();
        let Ok(auction) = h.service.create_auction(draft(UserId::new(), 100, 10)).await else {
            panic!("create should succeed");
        };
        let result = h.service.place_bid(auction.id, UserId::new(), 110).await;
        assert!(matches!(result, Err(GatewayError::NotApproved)));
    }

    #[tokio::test]
    async fn bid_on_unknown_auction_is_not_found() {
        let h = harness();
        let result = h.service.place_bid(AuctionId::new(), UserId::new(), 110).await;
        assert!(matches!(result, Err(GatewayError::AuctionNotFound(_))));
    }

    #[tokio::test]
    async fn merchant_cannot_bid_on_own_auction() {
        let h = harness();
        let merchant = UserId::new();
        let id = live_auction(&h, draft(merchant, 100, 10)).await;
        let result = h.service.place_bid(id, merchant, 110).await;
        assert!(matches!(result, Err(GatewayError::SelfBid)));
    }

    #[tokio::test]
    async fn increment_scenario_from_the_storefront() {
        // startingPrice=100, bidIncrement=10:
        // 105 rejected, 110 accepted, 115 rejected, 120 accepted + outbid.
        let h = harness();
        let id = live_auction(&h, draft(UserId::new(), 100, 10)).await;
        let alice = UserId::new();
        let bob = UserId::new();

        assert!(matches!(
            h.service.place_bid(id, alice, 105).await,
            Err(GatewayError::BidTooLow { minimum: 110 })
        ));

        let Ok(receipt) = h.service.place_bid(id, alice, 110).await else {
            panic!("110 should be accepted");
        };
        assert_eq!(receipt.amount, 110);
        assert!(receipt.previous_leader.is_none());

        assert!(matches!(
            h.service.place_bid(id, bob, 115).await,
            Err(GatewayError::BidTooLow { minimum: 120 })
        ));

        let Ok(receipt) = h.service.place_bid(id, bob, 120).await else {
            panic!("120 should be accepted");
        };
        assert_eq!(receipt.previous_leader, Some(alice));

        // The outbid notification landed in alice's inbox.
        let inbox = h.store.list(alice, InboxQuery::default()).await;
        assert!(inbox.iter().any(|n| n.kind == NotificationKind::Outbid));

        // Ledger invariant: one active bid, denormalized fields agree.
        let Ok(auction) = h.service.get_auction(id).await else {
            panic!("auction should exist");
        };
        assert_eq!(auction.current_bid, 120);
        assert_eq!(auction.bid_count, 2);

        let Ok(history) = h.service.bid_history(id).await else {
            panic!("history should exist");
        };
        let active: Vec<_> = history
            .iter()
            .filter(|b| b.status == BidStatus::Active)
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active.first().map(|b| b.amount), Some(120));
    }

    #[tokio::test]
    async fn concurrent_bids_serialize_to_one_acceptance() {
        // Amounts chosen so whichever commits first invalidates the
        // other: exactly one acceptance, one BidTooLow citing the
        // post-commit minimum.
        let h = harness();
        let id = live_auction(&h, draft(UserId::new(), 10_000, 1_000)).await;
        let alice = UserId::new();
        let bob = UserId::new();

        let s1 = h.service.clone();
        let s2 = h.service.clone();
        let (r1, r2) = tokio::join!(
            s1.place_bid(id, alice, 11_000),
            s2.place_bid(id, bob, 11_500),
        );

        let accepted = [r1.is_ok(), r2.is_ok()].iter().filter(|&&ok| ok).count();
        assert_eq!(accepted, 1);

        let Ok(auction) = h.service.get_auction(id).await else {
            panic!("auction should exist");
        };
        let (winner_amount, loser_result) = if r1.is_ok() { (11_000, r2) } else { (11_500, r1) };
        assert_eq!(auction.current_bid, winner_amount);
        assert_eq!(auction.bid_count, 1);

        // The loser sees the minimum computed against the committed
        // leader, not the state it read at submission time.
        let Err(GatewayError::BidTooLow { minimum }) = loser_result else {
            panic!("loser should be rejected as too low");
        };
        assert_eq!(minimum, winner_amount + 1_000);
    }

    #[tokio::test]
    async fn late_bid_after_end_is_rejected_not_queued() {
        let h = harness();
        let merchant = UserId::new();
        let mut d = draft(merchant, 100, 10);
        d.end_time = Utc::now() + Duration::milliseconds(10);
        let id = live_auction(&h, d).await;

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let result = h.service.place_bid(id, UserId::new(), 110).await;
        assert!(matches!(result, Err(GatewayError::BiddingClosed)));
    }

    #[tokio::test]
    async fn sweep_activates_approved_auction_at_start_time() {
        let h = harness();
        let now = Utc::now();
        let mut d = draft(UserId::new(), 100, 10);
        d.start_time = now + Duration::minutes(5);
        d.end_time = now + Duration::hours(1);
        let Ok(auction) = h.service.create_auction(d).await else {
            panic!("create should succeed");
        };
        let Ok(approved) = h
            .service
            .admin_action(auction.id, AdminAction::Approve)
            .await
        else {
            panic!("approve should succeed");
        };
        assert_eq!(approved.status, AuctionStatus::Pending);

        // Before start_time: nothing to do.
        let stats = h.service.sweep(now, Duration::minutes(1)).await;
        assert_eq!(stats.activated, 0);

        // After start_time: activated.
        let stats = h
            .service
            .sweep(now + Duration::minutes(6), Duration::minutes(1))
            .await;
        assert_eq!(stats.activated, 1);
        let Ok(refreshed) = h.service.get_auction(auction.id).await else {
            panic!("auction should exist");
        };
        assert_eq!(refreshed.status, AuctionStatus::Active);
    }

    #[tokio::test]
    async fn reserve_not_met_ends_without_winner() {
        let h = harness();
        let bidder = UserId::new();
        let mut d = draft(UserId::new(), 100, 10);
        d.reserved_price = Some(250);
        let id = live_auction(&h, d).await;

        let Ok(_) = h.service.place_bid(id, bidder, 200).await else {
            panic!("200 should be accepted");
        };

        let stats = h
            .service
            .sweep(Utc::now() + Duration::hours(2), Duration::minutes(1))
            .await;
        assert_eq!(stats.ended, 1);

        let Ok(auction) = h.service.get_auction(id).await else {
            panic!("auction should exist");
        };
        assert_eq!(auction.status, AuctionStatus::Ended);

        // No won flip, no won notification.
        let Ok(history) = h.service.bid_history(id).await else {
            panic!("history should exist");
        };
        assert!(history.iter().all(|b| b.status != BidStatus::Won));
        let inbox = h.store.list(bidder, InboxQuery::default()).await;
        assert!(inbox.iter().all(|n| n.kind != NotificationKind::Won));
    }

    #[tokio::test]
    async fn reserve_met_settles_winner_with_notification() {
        let h = harness();
        let bidder = UserId::new();
        let mut d = draft(UserId::new(), 100, 10);
        d.reserved_price = Some(250);
        let id = live_auction(&h, d).await;

        let Ok(_) = h.service.place_bid(id, bidder, 300).await else {
            panic!("300 should be accepted");
        };

        let stats = h
            .service
            .sweep(Utc::now() + Duration::hours(2), Duration::minutes(1))
            .await;
        assert_eq!(stats.ended, 1);

        let Ok(history) = h.service.bid_history(id).await else {
            panic!("history should exist");
        };
        let won: Vec<_> = history
            .iter()
            .filter(|b| b.status == BidStatus::Won)
            .collect();
        assert_eq!(won.len(), 1);
        assert_eq!(won.first().map(|b| b.bidder_id), Some(bidder));

        let inbox = h.store.list(bidder, InboxQuery::default()).await;
        assert!(inbox.iter().any(|n| n.kind == NotificationKind::Won));
    }

    #[tokio::test]
    async fn ending_warning_fires_once() {
        let h = harness();
        let bidder = UserId::new();
        let now = Utc::now();
        let mut d = draft(UserId::new(), 100, 10);
        d.end_time = now + Duration::minutes(3);
        let id = live_auction(&h, d).await;
        let Ok(_) = h.service.place_bid(id, bidder, 110).await else {
            panic!("bid should be accepted");
        };

        let window = Duration::minutes(5);
        let stats = h.service.sweep(now, window).await;
        assert_eq!(stats.ending_warned, 1);

        // Second pass inside the window: no duplicate warning.
        let stats = h.service.sweep(now + Duration::seconds(30), window).await;
        assert_eq!(stats.ending_warned, 0);

        let inbox = h.store.list(bidder, InboxQuery::default()).await;
        let warnings = inbox
            .iter()
            .filter(|n| n.kind == NotificationKind::Ending)
            .count();
        assert_eq!(warnings, 1);
    }

    #[tokio::test]
    async fn cancel_notifies_watchers_and_blocks_bids() {
        let h = harness();
        let bidder = UserId::new();
        let id = live_auction(&h, draft(UserId::new(), 100, 10)).await;
        let Ok(_) = h.service.place_bid(id, bidder, 110).await else {
            panic!("bid should be accepted");
        };

        let Ok(cancelled) = h.service.admin_action(id, AdminAction::Cancel).await else {
            panic!("cancel should succeed");
        };
        assert_eq!(cancelled.status, AuctionStatus::Cancelled);

        let inbox = h.store.list(bidder, InboxQuery::default()).await;
        assert!(inbox.iter().any(|n| n.kind == NotificationKind::Update));

        let result = h.service.place_bid(id, UserId::new(), 200).await;
        assert!(matches!(
            result,
            Err(GatewayError::AuctionNotActive { .. })
        ));
    }

    #[tokio::test]
    async fn cancelling_ended_auction_is_rejected() {
        let h = harness();
        let id = live_auction(&h, draft(UserId::new(), 100, 10)).await;
        let _ = h
            .service
            .sweep(Utc::now() + Duration::hours(2), Duration::minutes(1))
            .await;

        let result = h.service.admin_action(id, AdminAction::Cancel).await;
        assert!(matches!(
            result,
            Err(GatewayError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn rejection_and_resubmit_round_trip() {
        let h = harness();
        let merchant = UserId::new();
        let Ok(auction) = h.service.create_auction(draft(merchant, 100, 10)).await else {
            panic!("create should succeed");
        };

        let reason = RejectionReason {
            reason: "poor_photos".to_string(),
            description: None,
        };
        let Ok(rejected) = h
            .service
            .admin_action(auction.id, AdminAction::Reject { reason })
            .await
        else {
            panic!("reject should succeed");
        };
        assert!(matches!(
            rejected.admin_approval,
            AdminApproval::Rejected { .. }
        ));

        let inbox = h.store.list(merchant, InboxQuery::default()).await;
        assert!(inbox.iter().any(|n| n.kind == NotificationKind::Alert));

        let Ok(resubmitted) = h
            .service
            .admin_action(auction.id, AdminAction::Resubmit)
            .await
        else {
            panic!("resubmit should succeed");
        };
        assert_eq!(resubmitted.admin_approval, AdminApproval::Pending);
        assert_eq!(resubmitted.status, AuctionStatus::Pending);
    }

    #[tokio::test]
    async fn buy_by_parts_sales_end_the_lot_at_zero() {
        let h = harness();
        let merchant = UserId::new();
        let buyer = UserId::new();
        let mut d = draft(merchant, 100, 10);
        d.total_quantity = 3;
        d.buy_by_parts = true;
        d.single_item_price = Some(150);
        let id = live_auction(&h, d).await;

        let Ok(receipt) = h.service.record_partial_sale(id, buyer, 2).await else {
            panic!("sale should succeed");
        };
        assert_eq!(receipt.total_price, 300);
        assert_eq!(receipt.remaining_quantity, 1);
        assert!(!receipt.ended);

        let inbox = h.store.list(buyer, InboxQuery::default()).await;
        assert!(inbox.iter().any(|n| n.kind == NotificationKind::Won));

        let Ok(receipt) = h.service.record_partial_sale(id, buyer, 1).await else {
            panic!("final sale should succeed");
        };
        assert!(receipt.ended);

        let Ok(auction) = h.service.get_auction(id).await else {
            panic!("auction should exist");
        };
        assert_eq!(auction.status, AuctionStatus::Ended);

        // Lot is gone; further sales conflict.
        let result = h.service.record_partial_sale(id, buyer, 1).await;
        assert!(matches!(
            result,
            Err(GatewayError::AuctionNotActive { .. })
        ));
    }
}
