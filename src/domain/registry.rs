//! Concurrent auction storage with per-auction fine-grained locking.
//!
//! [`AuctionRegistry`] stores all known auctions in a `HashMap` where
//! each entry is individually protected by a [`tokio::sync::RwLock`].
//! The per-entry write lock is what serializes competing bid
//! submissions for the same auction: the loser of a race re-validates
//! against the committed state, never against a stale read.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::AuctionId;
use super::entry::{AuctionEntry, AuctionSummary};
use crate::domain::auction::AuctionStatus;
use crate::error::GatewayError;

/// Central store for all auctions the gateway knows about.
///
/// Uses a `RwLock<HashMap<...>>` for the outer map and per-entry
/// `Arc<RwLock<AuctionEntry>>` for fine-grained per-auction locking.
///
/// # Concurrency
///
/// - Multiple tasks may read the same auction concurrently.
/// - Writes to different auctions are concurrent.
/// - Writes to the same auction are serialized; bid acceptance order
///   equals commit order within one auction.
#[derive(Debug)]
pub struct AuctionRegistry {
    auctions: RwLock<HashMap<AuctionId, Arc<RwLock<AuctionEntry>>>>,
}

impl AuctionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            auctions: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new auction entry into the registry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if an auction with the
    /// same ID already exists (should never happen with UUID v4).
    pub async fn insert(&self, entry: AuctionEntry) -> Result<AuctionId, GatewayError> {
        let auction_id = entry.auction.id;
        let mut map = self.auctions.write().await;
        if map.contains_key(&auction_id) {
            return Err(GatewayError::InvalidRequest(format!(
                "auction {auction_id} already exists"
            )));
        }
        map.insert(auction_id, Arc::new(RwLock::new(entry)));
        Ok(auction_id)
    }

    /// Returns a shared handle to the entry behind its per-auction lock.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AuctionNotFound`] if no auction with the
    /// given ID exists.
    pub async fn get(
        &self,
        auction_id: AuctionId,
    ) -> Result<Arc<RwLock<AuctionEntry>>, GatewayError> {
        let map = self.auctions.read().await;
        map.get(&auction_id)
            .cloned()
            .ok_or(GatewayError::AuctionNotFound(*auction_id.as_uuid()))
    }

    /// Returns handles to every non-terminal auction, for the sweeper.
    ///
    /// Terminal auctions are skipped without taking their entry lock
    /// where possible; the sweeper re-checks status under the write lock
    /// anyway.
    pub async fn live_entries(&self) -> Vec<Arc<RwLock<AuctionEntry>>> {
        let map = self.auctions.read().await;
        let mut entries = Vec::new();
        for entry_lock in map.values() {
            let entry = entry_lock.read().await;
            if !entry.auction.status.is_terminal() {
                entries.push(Arc::clone(entry_lock));
            }
        }
        entries
    }

    /// Returns summaries of all auctions, optionally filtered by status.
    pub async fn list(&self, status_filter: Option<AuctionStatus>) -> Vec<AuctionSummary> {
        let map = self.auctions.read().await;
        let mut summaries = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            let entry = entry_lock.read().await;
            if let Some(filter) = status_filter
                && entry.auction.status != filter
            {
                continue;
            }
            summaries.push(AuctionSummary::from(&*entry));
        }
        summaries
    }

    /// Returns the number of auctions in the registry.
    pub async fn len(&self) -> usize {
        self.auctions.read().await.len()
    }

    /// Returns `true` if the registry contains no auctions.
    pub async fn is_empty(&self) -> bool {
        self.auctions.read().await.is_empty()
    }
}

impl Default for AuctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::auction::{Auction, AuctionDraft, Condition};
    use crate::domain::ids::UserId;
    use chrono::{Duration, Utc};

    fn make_entry() -> AuctionEntry {
        let now = Utc::now();
        let draft = AuctionDraft {
            merchant_id: UserId::new(),
            title: "Lot".to_string(),
            description: String::new(),
            category: "misc".to_string(),
            condition: Condition::New,
            product_id: None,
            start_time: now,
            end_time: now + Duration::hours(1),
            starting_price: 10_000,
            reserved_price: None,
            bid_increment: 1_000,
            total_quantity: 1,
            buy_by_parts: false,
            single_item_price: None,
        };
        let Ok(auction) = Auction::from_draft(draft, now) else {
            panic!("valid draft");
        };
        AuctionEntry::new(auction)
    }

    #[tokio::test]
    async fn insert_and_get() {
        let registry = AuctionRegistry::new();
        let entry = make_entry();
        let id = entry.auction.id;

        let result = registry.insert(entry).await;
        assert!(result.is_ok());

        let fetched = registry.get(id).await;
        assert!(fetched.is_ok());
    }

    #[tokio::test]
    async fn get_nonexistent_returns_error() {
        let registry = AuctionRegistry::new();
        let result = registry.get(AuctionId::new()).await;
        assert!(matches!(result, Err(GatewayError::AuctionNotFound(_))));
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let registry = AuctionRegistry::new();
        let entry = make_entry();
        let mut duplicate = make_entry();
        duplicate.auction.id = entry.auction.id;

        let Ok(_) = registry.insert(entry).await else {
            panic!("first insert should succeed");
        };
        assert!(registry.insert(duplicate).await.is_err());
    }

    #[tokio::test]
    async fn list_returns_all() {
        let registry = AuctionRegistry::new();
        let _ = registry.insert(make_entry()).await;
        let _ = registry.insert(make_entry()).await;

        let list = registry.list(None).await;
        assert_eq!(list.len(), 2);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let registry = AuctionRegistry::new();
        let _ = registry.insert(make_entry()).await;

        let pending = registry.list(Some(AuctionStatus::Pending)).await;
        assert_eq!(pending.len(), 1);

        let active = registry.list(Some(AuctionStatus::Active)).await;
        assert!(active.is_empty());
    }

    #[tokio::test]
    async fn live_entries_skips_terminal() {
        let registry = AuctionRegistry::new();
        let terminal = make_entry();
        let id = terminal.auction.id;
        let _ = registry.insert(terminal).await;
        let _ = registry.insert(make_entry()).await;

        let Ok(entry_lock) = registry.get(id).await else {
            panic!("auction should exist");
        };
        let Ok(()) = entry_lock.write().await.auction.cancel(Utc::now()) else {
            panic!("cancel should succeed");
        };

        assert_eq!(registry.live_entries().await.len(), 1);
    }

    #[tokio::test]
    async fn len_and_is_empty() {
        let registry = AuctionRegistry::new();
        assert!(registry.is_empty().await);
        assert_eq!(registry.len().await, 0);

        let _ = registry.insert(make_entry()).await;
        assert!(!registry.is_empty().await);
        assert_eq!(registry.len().await, 1);
    }
}
