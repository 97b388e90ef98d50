//! Time-based lifecycle sweeper.
//!
//! A background task ticks on a fixed interval and drives every
//! transition that depends on the clock rather than on a request:
//! activating approved auctions at `start_time`, emitting the one-shot
//! ending-soon warning, and settling auctions at `end_time`. Bids and
//! admin actions never wait for a tick; only clock-driven transitions
//! run here.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::service::AuctionService;

/// Spawns the sweeper loop as a background tokio task.
///
/// `interval_secs` bounds the transition latency: an auction ends at
/// most one interval after its `end_time`. `ending_soon_secs` is the
/// warning window before `end_time`.
pub fn spawn(
    auction_service: Arc<AuctionService>,
    interval_secs: u64,
    ending_soon_secs: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let window = chrono::Duration::seconds(i64::try_from(ending_soon_secs).unwrap_or(300));

        tracing::info!(interval_secs, ending_soon_secs, "sweeper started");
        loop {
            ticker.tick().await;
            let stats = auction_service.sweep(Utc::now(), window).await;
            if stats.activated > 0 || stats.ending_warned > 0 || stats.ended > 0 {
                tracing::info!(
                    activated = stats.activated,
                    ending_warned = stats.ending_warned,
                    ended = stats.ended,
                    "sweep pass applied transitions"
                );
            }
        }
    })
}
