//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` pushes auction events to subscribed
//! clients. Clients subscribe to auction rooms (`auction:{uuid}`) for
//! public room events, to their own user channel (`user:{uuid}`) for
//! targeted events, or to `"*"` for everything.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
