//! Configuration management for the admission filter.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, TurnstileError};
use crate::ratelimit::KeyPolicy;

/// Configuration for the admission filter and its rate limiting backend.
///
/// Loaded once at startup and immutable for the lifetime of the filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Requests allowed per window
    #[serde(default = "default_capacity")]
    pub capacity: u64,

    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Which admission algorithm to run
    #[serde(default)]
    pub policy: PolicyKind,

    /// How partition keys are derived from requests
    #[serde(default)]
    pub key_policy: KeyPolicy,

    /// Idle-key eviction; absent means per-key state is never evicted
    #[serde(default)]
    pub eviction: Option<EvictionConfig>,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            window_secs: default_window_secs(),
            policy: PolicyKind::default(),
            key_policy: KeyPolicy::default(),
            eviction: None,
        }
    }
}

fn default_capacity() -> u64 {
    100
}

fn default_window_secs() -> u64 {
    60
}

/// Admission algorithm selection.
///
/// The two algorithms are alternative policies behind the same backend
/// contract, not refinements of one another: the fixed window enforces a
/// hard per-window ceiling and allows a burst of up to twice the capacity
/// across a window boundary; the token bucket smooths admission at the cost
/// of gradual rather than window-scoped accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Per-window counter that resets at fixed boundaries
    #[default]
    FixedWindow,
    /// Continuously refilling token bucket
    TokenBucket,
}

/// Idle-key eviction policy.
///
/// Evicting a key discards its window: a key that reappears after eviction
/// starts a fresh budget. That is an observable behavior change, so eviction
/// is opt-in rather than always on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvictionConfig {
    /// Evict keys whose state has not been touched for this many seconds
    #[serde(default = "default_idle_after_secs")]
    pub idle_after_secs: u64,

    /// How often the sweeper runs, in seconds
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self {
            idle_after_secs: default_idle_after_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_idle_after_secs() -> u64 {
    300
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl EvictionConfig {
    /// How long a key must go unseen before it is evicted.
    pub fn idle_after(&self) -> Duration {
        Duration::from_secs(self.idle_after_secs)
    }

    /// Interval between sweeper passes.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.idle_after_secs == 0 {
            return Err(TurnstileError::Config(
                "eviction idle_after_secs must be positive".to_string(),
            ));
        }
        if self.sweep_interval_secs == 0 {
            return Err(TurnstileError::Config(
                "eviction sweep_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl AdmissionConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AdmissionConfig = serde_yaml::from_str(yaml)
            .map_err(|e| TurnstileError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The window length as a duration.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Reject invalid parameters before any filter is installed.
    ///
    /// Non-positive capacity or duration is a fatal configuration error,
    /// never clamped to a default.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(TurnstileError::Config(
                "capacity must be positive".to_string(),
            ));
        }
        if self.window_secs == 0 {
            return Err(TurnstileError::Config(
                "window_secs must be positive".to_string(),
            ));
        }
        if let Some(ref eviction) = self.eviction {
            eviction.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdmissionConfig::default();
        assert_eq!(config.capacity, 100);
        assert_eq!(config.window(), Duration::from_secs(60));
        assert_eq!(config.policy, PolicyKind::FixedWindow);
        assert_eq!(config.key_policy, KeyPolicy::ClientAddress);
        assert!(config.eviction.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
capacity: 20
window_secs: 30
policy: token_bucket
key_policy: client_endpoint
eviction:
  idle_after_secs: 120
  sweep_interval_secs: 15
"#;
        let config = AdmissionConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.capacity, 20);
        assert_eq!(config.window_secs, 30);
        assert_eq!(config.policy, PolicyKind::TokenBucket);
        assert_eq!(config.key_policy, KeyPolicy::ClientEndpoint);
        let eviction = config.eviction.unwrap();
        assert_eq!(eviction.idle_after(), Duration::from_secs(120));
        assert_eq!(eviction.sweep_interval(), Duration::from_secs(15));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = "capacity: 5\n";
        let config = AdmissionConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.capacity, 5);
        assert_eq!(config.window_secs, 60);
        assert_eq!(config.policy, PolicyKind::FixedWindow);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = AdmissionConfig::from_yaml("capacity: 0\n").unwrap_err();
        assert!(matches!(err, TurnstileError::Config(_)));
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = AdmissionConfig::from_yaml("window_secs: 0\n").unwrap_err();
        assert!(matches!(err, TurnstileError::Config(_)));
    }

    #[test]
    fn test_zero_eviction_periods_rejected() {
        let yaml = r#"
eviction:
  idle_after_secs: 0
"#;
        assert!(AdmissionConfig::from_yaml(yaml).is_err());

        let yaml = r#"
eviction:
  sweep_interval_secs: 0
"#;
        assert!(AdmissionConfig::from_yaml(yaml).is_err());
    }
}
