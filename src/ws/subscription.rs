//! Per-connection subscription manager.
//!
//! Tracks which channels a WebSocket client is subscribed to and
//! provides server-side event filtering. Two channel families exist:
//! auction rooms (`auction:{uuid}`) carrying room-scoped events, and
//! user channels (`user:{uuid}`) carrying targeted events. The
//! wildcard `"*"` matches every event.

use std::collections::HashSet;

use crate::domain::{AuctionEvent, AuctionId, UserId};

/// A parsed subscription channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Room channel for one auction's public events.
    Auction(AuctionId),
    /// Targeted channel for one user's personal events.
    User(UserId),
    /// Every event on the bus.
    All,
}

impl Channel {
    /// Parses a channel string: `auction:{uuid}`, `user:{uuid}`, or `*`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s == "*" {
            return Some(Self::All);
        }
        if let Some(raw) = s.strip_prefix("auction:") {
            return raw.parse().ok().map(AuctionId::from_uuid).map(Self::Auction);
        }
        if let Some(raw) = s.strip_prefix("user:") {
            return raw.parse().ok().map(UserId::from_uuid).map(Self::User);
        }
        None
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auction(id) => write!(f, "auction:{id}"),
            Self::User(id) => write!(f, "user:{id}"),
            Self::All => write!(f, "*"),
        }
    }
}

/// Manages the channel subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed auction rooms. Ignored when `subscribe_all` is set.
    rooms: HashSet<AuctionId>,
    /// Subscribed user channels. Ignored when `subscribe_all` is set.
    users: HashSet<UserId>,
    /// Whether the wildcard `"*"` subscription is active.
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds channels to the subscription set.
    pub fn subscribe(&mut self, channels: &[Channel]) {
        for channel in channels {
            match channel {
                Channel::Auction(id) => {
                    self.rooms.insert(*id);
                }
                Channel::User(id) => {
                    self.users.insert(*id);
                }
                Channel::All => self.subscribe_all = true,
            }
        }
    }

    /// Removes channels from the subscription set.
    pub fn unsubscribe(&mut self, channels: &[Channel]) {
        for channel in channels {
            match channel {
                Channel::Auction(id) => {
                    self.rooms.remove(id);
                }
                Channel::User(id) => {
                    self.users.remove(id);
                }
                Channel::All => self.subscribe_all = false,
            }
        }
    }

    /// Returns `true` if the event matches the subscription filter.
    ///
    /// Room events match their auction room; targeted events match
    /// their recipient's user channel. An event can match both (an
    /// `outbid` reaches the loser's user channel only, a `newBid`
    /// reaches the room only).
    #[must_use]
    pub fn matches(&self, event: &AuctionEvent) -> bool {
        if self.subscribe_all {
            return true;
        }
        if let Some(room) = event.room()
            && self.rooms.contains(&room)
        {
            return true;
        }
        if let Some(recipient) = event.recipient()
            && self.users.contains(&recipient)
        {
            return true;
        }
        false
    }

    /// Returns the number of explicitly subscribed channels.
    #[must_use]
    pub fn count(&self) -> usize {
        self.rooms.len() + self.users.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn new_bid(auction_id: AuctionId) -> AuctionEvent {
        AuctionEvent::NewBid {
            auction_id,
            bidder_id: UserId::new(),
            amount: 110,
            bid_count: 1,
            timestamp: Utc::now(),
        }
    }

    fn outbid(recipient: UserId) -> AuctionEvent {
        AuctionEvent::Outbid {
            auction_id: AuctionId::new(),
            bidder_id: recipient,
            amount: 110,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(&new_bid(AuctionId::new())));
    }

    #[test]
    fn room_subscription_matches_room_events_only() {
        let mut mgr = SubscriptionManager::new();
        let id = AuctionId::new();
        mgr.subscribe(&[Channel::Auction(id)]);
        assert!(mgr.matches(&new_bid(id)));
        assert!(!mgr.matches(&new_bid(AuctionId::new())));
        // Targeted events never leak into rooms.
        assert!(!mgr.matches(&outbid(UserId::new())));
    }

    #[test]
    fn user_subscription_matches_targeted_events() {
        let mut mgr = SubscriptionManager::new();
        let user = UserId::new();
        mgr.subscribe(&[Channel::User(user)]);
        assert!(mgr.matches(&outbid(user)));
        assert!(!mgr.matches(&outbid(UserId::new())));
        assert!(!mgr.matches(&new_bid(AuctionId::new())));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[Channel::All]);
        assert!(mgr.matches(&new_bid(AuctionId::new())));
        assert!(mgr.matches(&outbid(UserId::new())));
    }

    #[test]
    fn unsubscribe_removes_channel() {
        let mut mgr = SubscriptionManager::new();
        let id = AuctionId::new();
        mgr.subscribe(&[Channel::Auction(id)]);
        assert!(mgr.matches(&new_bid(id)));
        mgr.unsubscribe(&[Channel::Auction(id)]);
        assert!(!mgr.matches(&new_bid(id)));
    }

    #[test]
    fn channel_parse_round_trip() {
        let auction = AuctionId::new();
        let user = UserId::new();
        assert_eq!(
            Channel::parse(&format!("auction:{auction}")),
            Some(Channel::Auction(auction))
        );
        assert_eq!(
            Channel::parse(&format!("user:{user}")),
            Some(Channel::User(user))
        );
        assert_eq!(Channel::parse("*"), Some(Channel::All));
        assert_eq!(Channel::parse("auction:not-a-uuid"), None);
        assert_eq!(Channel::parse("room:123"), None);
    }

    #[test]
    fn count_tracks_explicit_channels() {
        let mut mgr = SubscriptionManager::new();
        assert_eq!(mgr.count(), 0);
        mgr.subscribe(&[
            Channel::Auction(AuctionId::new()),
            Channel::User(UserId::new()),
        ]);
        assert_eq!(mgr.count(), 2);
    }
}
