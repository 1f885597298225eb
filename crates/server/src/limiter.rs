//! Sliding-window admission control per owner
//!
//! Tracks the timestamps of admitted calls in a rolling window. Only
//! admitted calls consume quota; a rejected call leaves the window
//! untouched so the quota genuinely means "30 admitted calls per 10
//! seconds" and not "30 attempts".

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::RateLimitConfig;

/// Sliding-window rate limiter keyed by owner
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    calls: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    /// Create a limiter with the given policy
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            max_calls: config.max_calls,
            window: config.window,
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Try to admit a call for an owner.
    ///
    /// Returns `false` when the owner already has `max_calls` admitted
    /// calls inside the rolling window.
    pub fn admit(&self, owner: &str) -> bool {
        self.admit_at(owner, Instant::now())
    }

    fn admit_at(&self, owner: &str, now: Instant) -> bool {
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());

        // Evict owners whose newest call already expired, so the table
        // does not grow with every distinct owner ever seen
        calls.retain(|_, window| {
            window
                .back()
                .is_some_and(|&t| now.duration_since(t) < self.window)
        });

        let window = calls.entry(owner.to_string()).or_default();

        // Expire timestamps that slid out of the window
        while window
            .front()
            .is_some_and(|&t| now.duration_since(t) >= self.window)
        {
            window.pop_front();
        }

        if window.len() >= self.max_calls {
            debug!("Rate limit exceeded for owner {}", owner);
            return false;
        }

        window.push_back(now);
        true
    }

    #[cfg(test)]
    fn tracked_owners(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
