//! Notification inbox: durable per-user delivery record.
//!
//! The inbox is independent of any live connection. The event fan-out
//! writes here first; WebSocket push happens after and may fail freely.

pub mod model;
pub mod store;

pub use model::{Notification, NotificationKind};
pub use store::{InboxQuery, NotificationStore};
