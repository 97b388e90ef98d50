//! Event fan-out: one durable inbox write per recipient, then
//! best-effort live push.
//!
//! Each method is called exactly once per state-changing operation.
//! The notification store write is the delivery guarantee; the
//! [`EventBus`] publish and the Postgres mirror may fail or find no
//! subscribers without affecting the underlying commit.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{AuctionEvent, AuctionId, AuctionStatus, EventBus, UserId};
use crate::notification::{Notification, NotificationKind, NotificationStore};
use crate::persistence::PostgresPersistence;

/// Distributes domain events to inboxes and live subscribers.
#[derive(Debug, Clone)]
pub struct EventFanout {
    store: Arc<NotificationStore>,
    bus: EventBus,
    persistence: Option<PostgresPersistence>,
}

impl EventFanout {
    /// Creates a fan-out over the given store and bus.
    #[must_use]
    pub fn new(
        store: Arc<NotificationStore>,
        bus: EventBus,
        persistence: Option<PostgresPersistence>,
    ) -> Self {
        Self {
            store,
            bus,
            persistence,
        }
    }

    /// Returns a reference to the underlying [`EventBus`].
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// An accepted bid: room broadcast, a `bid` notification for the
    /// merchant, and an `outbid` notification + targeted event for the
    /// previous leader, if any.
    pub async fn bid_placed(
        &self,
        auction_id: AuctionId,
        auction_title: &str,
        bidder_id: UserId,
        amount: i64,
        bid_count: u64,
        merchant_id: UserId,
        previous_leader: Option<UserId>,
        at: DateTime<Utc>,
    ) {
        let mut notifications = vec![Notification::new(
            merchant_id,
            NotificationKind::Bid,
            format!("New bid on \"{auction_title}\""),
            format!("A bid of {amount} was placed ({bid_count} bids so far)."),
            Some(auction_id),
            at,
        )];
        let mut events = vec![AuctionEvent::NewBid {
            auction_id,
            bidder_id,
            amount,
            bid_count,
            timestamp: at,
        }];

        if let Some(loser) = previous_leader {
            notifications.push(
                Notification::new(
                    loser,
                    NotificationKind::Outbid,
                    format!("You were outbid on \"{auction_title}\""),
                    format!("The leading bid is now {amount}."),
                    Some(auction_id),
                    at,
                )
                .with_action(format!("/auctions/{auction_id}"), "Bid again"),
            );
            events.push(AuctionEvent::Outbid {
                auction_id,
                bidder_id: loser,
                amount,
                timestamp: at,
            });
        }

        self.deliver(notifications, events).await;
    }

    /// A lifecycle transition visible to the room: `update`
    /// notifications for every watcher plus a `stateChanged` broadcast.
    pub async fn state_changed(
        &self,
        auction_id: AuctionId,
        auction_title: &str,
        status: AuctionStatus,
        admin_approval: &str,
        reason: Option<String>,
        watchers: &[UserId],
        at: DateTime<Utc>,
    ) {
        let body = match &reason {
            Some(r) => format!("Auction is now {} ({r}).", status.as_str()),
            None => format!("Auction is now {}.", status.as_str()),
        };
        let notifications = watchers
            .iter()
            .map(|&watcher| {
                Notification::new(
                    watcher,
                    NotificationKind::Update,
                    format!("\"{auction_title}\" changed state"),
                    body.clone(),
                    Some(auction_id),
                    at,
                )
            })
            .collect();

        let events = vec![AuctionEvent::StateChanged {
            auction_id,
            status,
            admin_approval: admin_approval.to_string(),
            reason,
            timestamp: at,
        }];

        self.deliver(notifications, events).await;
    }

    /// Admin approval outcome: a targeted `system` event and a
    /// `system`/`alert` notification for the merchant.
    pub async fn approval_changed(
        &self,
        auction_id: AuctionId,
        auction_title: &str,
        merchant_id: UserId,
        approved: bool,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) {
        let (kind, message) = if approved {
            (
                NotificationKind::System,
                format!("\"{auction_title}\" was approved and will go live at its start time."),
            )
        } else {
            let detail = reason.as_deref().unwrap_or("no reason given");
            (
                NotificationKind::Alert,
                format!("\"{auction_title}\" was rejected: {detail}. Edit and resubmit to try again."),
            )
        };

        let notifications = vec![Notification::new(
            merchant_id,
            kind,
            if approved {
                "Auction approved"
            } else {
                "Auction rejected"
            },
            message.clone(),
            Some(auction_id),
            at,
        )];

        let events = vec![AuctionEvent::System {
            auction_id,
            recipient_id: merchant_id,
            message,
            timestamp: at,
        }];

        self.deliver(notifications, events).await;
    }

    /// A settled win (whole lot or buy-by-parts batch): targeted `won`
    /// event, a `won` notification with a payment call-to-action for
    /// the winner, and an `update` for the merchant.
    pub async fn auction_won(
        &self,
        auction_id: AuctionId,
        auction_title: &str,
        winner_id: UserId,
        amount: i64,
        quantity: u32,
        merchant_id: UserId,
        at: DateTime<Utc>,
    ) {
        let notifications = vec![
            Notification::new(
                winner_id,
                NotificationKind::Won,
                format!("You won \"{auction_title}\""),
                format!("Winning amount: {amount} for {quantity} unit(s)."),
                Some(auction_id),
                at,
            )
            .with_action(format!("/auctions/{auction_id}/checkout"), "Complete payment"),
            Notification::new(
                merchant_id,
                NotificationKind::Update,
                format!("\"{auction_title}\" sold"),
                format!("Sold {quantity} unit(s) at {amount}."),
                Some(auction_id),
                at,
            ),
        ];

        let events = vec![AuctionEvent::Won {
            auction_id,
            bidder_id: winner_id,
            amount,
            quantity,
            timestamp: at,
        }];

        self.deliver(notifications, events).await;
    }

    /// Ending-soon warning: room broadcast plus `ending` notifications
    /// for the current leader and the merchant.
    pub async fn auction_ending(
        &self,
        auction_id: AuctionId,
        auction_title: &str,
        ends_at: DateTime<Utc>,
        leader_id: Option<UserId>,
        merchant_id: UserId,
        at: DateTime<Utc>,
    ) {
        let mut notifications = vec![Notification::new(
            merchant_id,
            NotificationKind::Ending,
            format!("\"{auction_title}\" is ending soon"),
            format!("Bidding closes at {}.", ends_at.to_rfc3339()),
            Some(auction_id),
            at,
        )];
        if let Some(leader) = leader_id {
            notifications.push(Notification::new(
                leader,
                NotificationKind::Ending,
                format!("\"{auction_title}\" is ending soon"),
                "You are currently the highest bidder.".to_string(),
                Some(auction_id),
                at,
            ));
        }

        let events = vec![AuctionEvent::Ending {
            auction_id,
            ends_at,
            timestamp: at,
        }];

        self.deliver(notifications, events).await;
    }

    /// Marks a single notification read, mirroring the flag to the
    /// Postgres mirror when enabled.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GatewayError::NotificationNotFound`] if
    /// the recipient has no such notification.
    pub async fn mark_read(
        &self,
        recipient_id: UserId,
        id: crate::domain::NotificationId,
    ) -> Result<(), crate::error::GatewayError> {
        self.store.mark_read(recipient_id, id).await?;
        if let Some(persistence) = &self.persistence
            && let Err(e) = persistence
                .mark_read(*recipient_id.as_uuid(), *id.as_uuid())
                .await
        {
            tracing::warn!(error = %e, "failed to mirror read flag to postgres");
        }
        Ok(())
    }

    /// Marks every unread notification for the recipient as read,
    /// returning the number flipped.
    pub async fn mark_all_read(&self, recipient_id: UserId) -> usize {
        let flipped = self.store.mark_all_read(recipient_id).await;
        if let Some(persistence) = &self.persistence
            && let Err(e) = persistence.mark_all_read(*recipient_id.as_uuid()).await
        {
            tracing::warn!(error = %e, "failed to mirror read flags to postgres");
        }
        flipped
    }

    /// Durable side first, best-effort side second. A persistence or
    /// broadcast failure is logged and swallowed; it never propagates
    /// back into the committing operation.
    async fn deliver(&self, notifications: Vec<Notification>, events: Vec<AuctionEvent>) {
        for notification in notifications {
            if let Some(persistence) = &self.persistence
                && let Err(e) = persistence.save_notification(&notification).await
            {
                tracing::warn!(error = %e, "failed to mirror notification to postgres");
            }
            self.store.push(notification).await;
        }

        for event in events {
            if let Some(persistence) = &self.persistence {
                let payload = serde_json::to_value(&event).unwrap_or_default();
                if let Err(e) = persistence
                    .save_event(*event.auction_id().as_uuid(), event.event_type_str(), &payload)
                    .await
                {
                    tracing::warn!(error = %e, "failed to append event to postgres log");
                }
            }
            let delivered = self.bus.publish(event);
            tracing::debug!(receivers = delivered, "event published");
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::notification::InboxQuery;

    fn make_fanout() -> (EventFanout, Arc<NotificationStore>) {
        let store = Arc::new(NotificationStore::new());
        let fanout = EventFanout::new(Arc::clone(&store), EventBus::new(100), None);
        (fanout, store)
    }

    #[tokio::test]
    async fn bid_placed_notifies_merchant_and_loser() {
        let (fanout, store) = make_fanout();
        let merchant = UserId::new();
        let loser = UserId::new();
        let auction_id = AuctionId::new();

        fanout
            .bid_placed(
                auction_id,
                "Camera",
                UserId::new(),
                12_000,
                2,
                merchant,
                Some(loser),
                Utc::now(),
            )
            .await;

        let merchant_inbox = store.list(merchant, InboxQuery::default()).await;
        assert_eq!(merchant_inbox.len(), 1);
        assert_eq!(
            merchant_inbox.first().map(|n| n.kind),
            Some(NotificationKind::Bid)
        );

        let loser_inbox = store.list(loser, InboxQuery::default()).await;
        assert_eq!(loser_inbox.len(), 1);
        assert_eq!(
            loser_inbox.first().map(|n| n.kind),
            Some(NotificationKind::Outbid)
        );
    }

    #[tokio::test]
    async fn bid_placed_emits_room_and_targeted_events() {
        let (fanout, _store) = make_fanout();
        let mut rx = fanout.bus().subscribe();
        let loser = UserId::new();

        fanout
            .bid_placed(
                AuctionId::new(),
                "Camera",
                UserId::new(),
                12_000,
                2,
                UserId::new(),
                Some(loser),
                Utc::now(),
            )
            .await;

        let Ok(first) = rx.recv().await else {
            panic!("expected newBid event");
        };
        assert_eq!(first.event_type_str(), "newBid");

        let Ok(second) = rx.recv().await else {
            panic!("expected outbid event");
        };
        assert_eq!(second.event_type_str(), "outbid");
        assert_eq!(second.recipient(), Some(loser));
    }

    #[tokio::test]
    async fn no_subscribers_does_not_affect_inbox_write() {
        let (fanout, store) = make_fanout();
        let winner = UserId::new();

        // No bus receivers at all: the durable write must still land.
        fanout
            .auction_won(
                AuctionId::new(),
                "Camera",
                winner,
                20_000,
                1,
                UserId::new(),
                Utc::now(),
            )
            .await;

        let inbox = store.list(winner, InboxQuery::default()).await;
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox.first().map(|n| n.kind), Some(NotificationKind::Won));
        assert!(inbox.first().and_then(|n| n.action_url.as_deref()).is_some());
    }

    #[tokio::test]
    async fn state_changed_notifies_every_watcher() {
        let (fanout, store) = make_fanout();
        let watchers = [UserId::new(), UserId::new(), UserId::new()];

        fanout
            .state_changed(
                AuctionId::new(),
                "Camera",
                AuctionStatus::Cancelled,
                "approved",
                Some("merchant request".to_string()),
                &watchers,
                Utc::now(),
            )
            .await;

        for watcher in watchers {
            let inbox = store.list(watcher, InboxQuery::default()).await;
            assert_eq!(inbox.len(), 1);
        }
    }

    #[tokio::test]
    async fn rejection_is_an_alert_with_reason() {
        let (fanout, store) = make_fanout();
        let merchant = UserId::new();

        fanout
            .approval_changed(
                AuctionId::new(),
                "Camera",
                merchant,
                false,
                Some("prohibited item".to_string()),
                Utc::now(),
            )
            .await;

        let inbox = store.list(merchant, InboxQuery::default()).await;
        let Some(notification) = inbox.first() else {
            panic!("merchant should be notified");
        };
        assert_eq!(notification.kind, NotificationKind::Alert);
        assert!(notification.body.contains("prohibited item"));
    }

    #[tokio::test]
    async fn replay_after_reconnect_is_complete() {
        let (fanout, store) = make_fanout();
        let loser = UserId::new();
        let auction_id = AuctionId::new();
        let before = Utc::now() - chrono::Duration::seconds(1);

        // Subscribe, then drop the receiver to simulate a disconnect.
        let rx = fanout.bus().subscribe();
        drop(rx);

        fanout
            .bid_placed(
                auction_id,
                "Camera",
                UserId::new(),
                12_000,
                2,
                UserId::new(),
                Some(loser),
                Utc::now(),
            )
            .await;

        // Reconnect: everything since the cursor is retrievable.
        let replayed = store
            .list(
                loser,
                InboxQuery {
                    unread_only: false,
                    since: Some(before),
                },
            )
            .await;
        assert_eq!(replayed.len(), 1);
    }
}
