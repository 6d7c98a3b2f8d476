//! Fixed-window admission state.

use std::time::{Duration, Instant};

/// Per-key state for the fixed-window policy.
///
/// Only touched while the owning entry's mutex is held, so the
/// reset/increment/check sequence is one atomic critical section per key.
#[derive(Debug)]
pub(crate) struct WindowState {
    /// Requests charged to the current window, denied ones included
    count: u64,
    /// When the current window began
    window_start: Instant,
    /// Last time this key was observed
    last_seen: Instant,
}

impl WindowState {
    pub fn new(now: Instant) -> Self {
        Self {
            count: 0,
            window_start: now,
            last_seen: now,
        }
    }

    /// Charge one request to the window and report whether it fits.
    ///
    /// The window resets once at least `window` has elapsed since it began;
    /// the boundary instant itself starts a fresh window. The counter is
    /// incremented before the capacity check, so a denied request still
    /// occupies a slot in the window's ledger and `count` may exceed
    /// `capacity` while the window lasts.
    pub fn admit(&mut self, now: Instant, capacity: u64, window: Duration) -> bool {
        if now.duration_since(self.window_start) >= window {
            self.window_start = now;
            self.count = 0;
        }
        self.count += 1;
        self.last_seen = now;
        self.count <= capacity
    }

    #[cfg(test)]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Requests still admissible in the current window.
    pub fn remaining(&self, capacity: u64) -> u64 {
        capacity.saturating_sub(self.count)
    }

    /// Time until the current window rolls over.
    pub fn until_reset(&self, now: Instant, window: Duration) -> Duration {
        window.saturating_sub(now.duration_since(self.window_start))
    }

    /// How long this key has gone unobserved.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.duration_since(self.last_seen)
    }
}
