//! Admission policy implementations.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::config::{AdmissionConfig, PolicyKind};
use crate::error::Result;

use super::backend::{Decision, RateLimiterBackend};
use super::bucket::BucketState;
use super::descriptor::PartitionKey;
use super::store::KeyedStore;
use super::window::WindowState;

/// Build the backend the configuration selects.
///
/// Both algorithms satisfy the same [`RateLimiterBackend`] contract;
/// callers never branch on which one is active.
pub fn from_config(config: &AdmissionConfig) -> Result<Arc<dyn RateLimiterBackend>> {
    config.validate()?;
    Ok(match config.policy {
        PolicyKind::FixedWindow => {
            Arc::new(FixedWindowLimiter::new(config.capacity, config.window()))
        }
        PolicyKind::TokenBucket => {
            Arc::new(TokenBucketLimiter::new(config.capacity, config.window()))
        }
    })
}

/// Fixed-window admission: a per-key counter that resets at window
/// boundaries.
///
/// Thread-safe and shareable across tasks.
pub struct FixedWindowLimiter {
    capacity: u64,
    window: Duration,
    store: KeyedStore<WindowState>,
}

impl FixedWindowLimiter {
    /// Create a limiter admitting `capacity` requests per `window`.
    pub fn new(capacity: u64, window: Duration) -> Self {
        Self {
            capacity,
            window,
            store: KeyedStore::new(),
        }
    }

    /// Drop all tracked state.
    ///
    /// This is primarily useful for testing.
    pub fn clear(&self) {
        self.store.clear();
    }
}

impl RateLimiterBackend for FixedWindowLimiter {
    fn check_at(&self, key: &PartitionKey, now: Instant) -> Decision {
        let handle = self.store.get_or_create(key, || {
            debug!(
                key = %key,
                capacity = self.capacity,
                window = ?self.window,
                "creating fixed-window state"
            );
            WindowState::new(now)
        });

        let mut state = handle.lock();
        let allowed = state.admit(now, self.capacity, self.window);
        let decision = Decision {
            allowed,
            limit: self.capacity,
            remaining: state.remaining(self.capacity),
            retry_after: state.until_reset(now, self.window),
        };
        drop(state);

        trace!(
            key = %key,
            allowed = decision.allowed,
            remaining = decision.remaining,
            "fixed-window decision"
        );
        if !decision.allowed {
            debug!(key = %key, "rate limit exceeded");
        }

        decision
    }

    fn tracked_keys(&self) -> usize {
        self.store.len()
    }

    fn evict_idle(&self, idle_for: Duration, now: Instant) -> usize {
        self.store.retain(|state| state.idle_for(now) < idle_for)
    }
}

/// Token-bucket admission: per-key budgets refill continuously instead of
/// resetting at window boundaries, so a client draining its budget is
/// re-admitted gradually rather than all at once.
///
/// Thread-safe and shareable across tasks.
pub struct TokenBucketLimiter {
    capacity: u64,
    window: Duration,
    store: KeyedStore<BucketState>,
}

impl TokenBucketLimiter {
    /// Create a limiter refilling `capacity` tokens per `window`.
    pub fn new(capacity: u64, window: Duration) -> Self {
        Self {
            capacity,
            window,
            store: KeyedStore::new(),
        }
    }

    /// Drop all tracked state.
    ///
    /// This is primarily useful for testing.
    pub fn clear(&self) {
        self.store.clear();
    }
}

impl RateLimiterBackend for TokenBucketLimiter {
    fn check_at(&self, key: &PartitionKey, now: Instant) -> Decision {
        let handle = self.store.get_or_create(key, || {
            debug!(
                key = %key,
                capacity = self.capacity,
                window = ?self.window,
                "creating token-bucket state"
            );
            BucketState::new(now, self.capacity)
        });

        let mut state = handle.lock();
        let allowed = state.admit(now, self.capacity, self.window);
        let decision = Decision {
            allowed,
            limit: self.capacity,
            remaining: state.remaining(),
            retry_after: state.until_token(self.capacity, self.window),
        };
        drop(state);

        trace!(
            key = %key,
            allowed = decision.allowed,
            remaining = decision.remaining,
            "token-bucket decision"
        );
        if !decision.allowed {
            debug!(key = %key, "rate limit exceeded");
        }

        decision
    }

    fn tracked_keys(&self) -> usize {
        self.store.len()
    }

    fn evict_idle(&self, idle_for: Duration, now: Instant) -> usize {
        self.store.retain(|state| state.idle_for(now) < idle_for)
    }
}
