//! Service configuration
//!
//! Admission-control policy and the knobs the observed behavior left
//! ambiguous (whether reorder consumes quota).

use std::time::Duration;

/// Sliding-window admission policy, keyed by authenticated owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum admitted calls per rolling window
    pub max_calls: usize,
    /// Window length
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls: 30,
            window: Duration::from_secs(10),
        }
    }
}

/// Configuration for the task service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Admission-control policy for mutating calls
    pub rate_limit: RateLimitConfig,
    /// Whether `reorder` consumes rate-limit quota.
    ///
    /// The observed method set excludes it; kept configurable rather
    /// than hard-coded.
    pub limit_reorder: bool,
}

impl ServiceConfig {
    /// Create a config with the default policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the admission-control policy
    pub fn with_rate_limit(mut self, max_calls: usize, window: Duration) -> Self {
        self.rate_limit = RateLimitConfig { max_calls, window };
        self
    }

    /// Include `reorder` in the rate-limited method set
    pub fn limit_reorder(mut self) -> Self {
        self.limit_reorder = true;
        self
    }
}
