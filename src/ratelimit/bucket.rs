//! Token-bucket admission state.

use std::time::{Duration, Instant};

/// Per-key state for the token-bucket policy.
///
/// Tokens accrue continuously at `capacity / window` up to `capacity`; each
/// admitted request consumes one. A denied request consumes nothing.
#[derive(Debug)]
pub(crate) struct BucketState {
    /// Tokens currently available, in `0.0..=capacity`
    tokens: f64,
    /// When tokens were last accrued
    last_refill: Instant,
    /// Last time this key was observed
    last_seen: Instant,
}

impl BucketState {
    /// A bucket observed for the first time starts full.
    pub fn new(now: Instant, capacity: u64) -> Self {
        Self {
            tokens: capacity as f64,
            last_refill: now,
            last_seen: now,
        }
    }

    /// Refill greedily for the elapsed time, then try to consume one token.
    pub fn admit(&mut self, now: Instant, capacity: u64, window: Duration) -> bool {
        let elapsed = now.duration_since(self.last_refill);
        let rate = capacity as f64 / window.as_secs_f64();
        self.tokens = (self.tokens + elapsed.as_secs_f64() * rate).min(capacity as f64);
        self.last_refill = now;
        self.last_seen = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Whole tokens currently available.
    pub fn remaining(&self) -> u64 {
        self.tokens as u64
    }

    /// Time until at least one token has accrued.
    pub fn until_token(&self, capacity: u64, window: Duration) -> Duration {
        if self.tokens >= 1.0 {
            return Duration::ZERO;
        }
        let rate = capacity as f64 / window.as_secs_f64();
        Duration::from_secs_f64((1.0 - self.tokens) / rate)
    }

    /// How long this key has gone unobserved.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.duration_since(self.last_seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn test_initial_burst_up_to_capacity() {
        let t0 = Instant::now();
        let mut bucket = BucketState::new(t0, 5);

        for _ in 0..5 {
            assert!(bucket.admit(t0, 5, WINDOW));
        }
        assert!(!bucket.admit(t0, 5, WINDOW));
    }

    #[test]
    fn test_denial_consumes_nothing() {
        let t0 = Instant::now();
        let mut bucket = BucketState::new(t0, 2);

        bucket.admit(t0, 2, WINDOW);
        bucket.admit(t0, 2, WINDOW);
        assert!(!bucket.admit(t0, 2, WINDOW));

        // A fraction over one refill period accrues one token; had the
        // denials consumed anything the balance would still be negative.
        let refill = t0 + Duration::from_secs(31);
        assert!(bucket.admit(refill, 2, WINDOW));
    }

    #[test]
    fn test_partial_refill_readmits() {
        // capacity 5 per minute refills one token every 12 seconds
        let t0 = Instant::now();
        let mut bucket = BucketState::new(t0, 5);

        for _ in 0..5 {
            bucket.admit(t0, 5, WINDOW);
        }
        assert!(!bucket.admit(t0 + Duration::from_secs(5), 5, WINDOW));
        assert!(bucket.admit(t0 + Duration::from_secs(13), 5, WINDOW));
        assert!(!bucket.admit(t0 + Duration::from_secs(14), 5, WINDOW));
    }

    #[test]
    fn test_tokens_cap_at_capacity() {
        let t0 = Instant::now();
        let mut bucket = BucketState::new(t0, 3);

        // A long idle stretch must not bank more than capacity.
        let much_later = t0 + Duration::from_secs(3600);
        for _ in 0..3 {
            assert!(bucket.admit(much_later, 3, WINDOW));
        }
        assert!(!bucket.admit(much_later, 3, WINDOW));
    }

    #[test]
    fn test_until_token() {
        let t0 = Instant::now();
        let mut bucket = BucketState::new(t0, 5);

        assert_eq!(bucket.until_token(5, WINDOW), Duration::ZERO);

        for _ in 0..5 {
            bucket.admit(t0, 5, WINDOW);
        }
        assert!(!bucket.admit(t0, 5, WINDOW));

        // Empty bucket at 5 per minute: next token in ~12 seconds.
        let wait = bucket.until_token(5, WINDOW);
        assert!(wait > Duration::from_secs(11) && wait < Duration::from_secs(13));
    }

    #[test]
    fn test_remaining_reports_whole_tokens() {
        let t0 = Instant::now();
        let mut bucket = BucketState::new(t0, 5);
        bucket.admit(t0, 5, WINDOW);
        bucket.admit(t0, 5, WINDOW);
        assert_eq!(bucket.remaining(), 3);
    }
}
