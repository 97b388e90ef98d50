//! # auction-gateway
//!
//! Live auction and bid-notification engine for a marketplace storefront.
//!
//! This crate arbitrates bids, drives the auction lifecycle, and delivers
//! the outcome of every state change twice: durably to per-user inboxes
//! and live over WebSocket. Auction state is authoritative in memory;
//! PostgreSQL mirrors the inboxes (reloaded at startup) and keeps an
//! append-only event audit log.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── AuctionService (service/)
//!     ├── EventFanout (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── AuctionRegistry + BidLedger (domain/)
//!     ├── NotificationStore (notification/)
//!     ├── Sweeper (sweeper/)
//!     │
//!     └── PostgreSQL Persistence
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod notification;
pub mod persistence;
pub mod service;
pub mod sweeper;
pub mod ws;
