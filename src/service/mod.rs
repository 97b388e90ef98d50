//! Service layer: bid arbitration, lifecycle orchestration, and fan-out.

pub mod auction_service;
pub mod fanout;

pub use auction_service::{
    AdminAction, AuctionService, BidReceipt, PartialSaleReceipt, SweepStats,
};
pub use fanout::EventFanout;
