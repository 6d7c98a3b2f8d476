//! Admission backend contract shared by the rate limiting policies.

use std::time::{Duration, Instant};

use super::descriptor::PartitionKey;

/// Outcome of one admission check.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// The configured capacity for the partition
    pub limit: u64,
    /// Requests (or whole tokens) still available after this decision
    pub remaining: u64,
    /// How long until capacity becomes available again
    pub retry_after: Duration,
}

/// Contract satisfied by every admission policy implementation.
///
/// Implementations serialize decisions per key without contending across
/// keys, and never block on anything but their own per-key critical
/// section. The whole check is synchronous and completes in bounded time.
pub trait RateLimiterBackend: Send + Sync {
    /// Evaluate one request for `key` at the given instant.
    fn check_at(&self, key: &PartitionKey, now: Instant) -> Decision;

    /// Evaluate one request for `key` against the monotonic clock.
    fn check(&self, key: &PartitionKey) -> Decision {
        self.check_at(key, Instant::now())
    }

    /// Number of partition keys currently tracked.
    fn tracked_keys(&self) -> usize;

    /// Drop state for keys idle at least `idle_for`. Returns how many
    /// entries were evicted.
    fn evict_idle(&self, idle_for: Duration, now: Instant) -> usize;
}
