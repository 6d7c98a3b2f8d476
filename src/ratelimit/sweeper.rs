//! Background eviction of idle partition keys.
//!
//! Every distinct key ever seen holds a store entry, and key cardinality is
//! attacker-controlled, so a long-lived process needs a way to shed state
//! for clients that went away. The sweeper periodically drops entries whose
//! state has gone untouched for the configured idle period.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::backend::RateLimiterBackend;

/// Spawn the idle-key sweeper for `backend`.
///
/// Every `sweep_interval` the sweeper evicts keys idle for at least
/// `idle_after`. An evicted key that reappears starts a fresh budget, so
/// `idle_after` should comfortably exceed the window length.
///
/// Must be called from within a tokio runtime. The returned handle can be
/// aborted to stop sweeping; the backend keeps working without it.
pub fn spawn(
    backend: Arc<dyn RateLimiterBackend>,
    idle_after: Duration,
    sweep_interval: Duration,
) -> JoinHandle<()> {
    info!(
        idle_after_secs = idle_after.as_secs(),
        sweep_interval_secs = sweep_interval.as_secs(),
        "starting idle-key sweeper"
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick resolves immediately; skip it so no sweep runs
        // before a full interval has passed.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let evicted = backend.evict_idle(idle_after, Instant::now());
            if evicted > 0 {
                debug!(
                    evicted,
                    remaining = backend.tracked_keys(),
                    "evicted idle partition keys"
                );
            }
        }
    })
}
