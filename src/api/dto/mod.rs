//! Data Transfer Objects for REST request/response serialization.
//!
//! All monetary amounts are integers in minor units (cents); enum-like
//! fields cross the wire as lowercase strings.

pub mod auction_dto;
pub mod bid_dto;
pub mod common_dto;
pub mod notification_dto;

pub use auction_dto::*;
pub use bid_dto::*;
pub use common_dto::*;
pub use notification_dto::*;
