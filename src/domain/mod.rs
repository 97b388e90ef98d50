//! Domain layer: core types, auction registry, ledger, and event system.
//!
//! This module contains the server-side domain model including typed
//! identifiers, the auction aggregate with its lifecycle state machine,
//! the append-only bid ledger, the event bus for broadcasting state
//! changes, and the registry for concurrent auction storage.

pub mod auction;
pub mod entry;
pub mod event;
pub mod event_bus;
pub mod ids;
pub mod ledger;
pub mod registry;

pub use auction::{AdminApproval, Auction, AuctionDraft, AuctionStatus, Condition, RejectionReason};
pub use entry::{AuctionEntry, AuctionSummary};
pub use event::AuctionEvent;
pub use event_bus::EventBus;
pub use ids::{AuctionId, BidId, NotificationId, UserId};
pub use ledger::{Bid, BidLedger, BidStatus};
pub use registry::AuctionRegistry;
