//! Explicit retry policy values injected into probes.
//!
//! Policies are plain data so tests can swap in zero-delay variants and
//! probe retry behavior stays visible at the construction site instead of
//! buried in sleep calls.

use std::time::Duration;

/// How often and how patiently a probe retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed, counting the first.
    pub max_attempts: u32,

    /// Fixed pause between attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// A single attempt, no retries.
    pub fn single() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Retries without any pause. Test policies mostly want this.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Whether another attempt is allowed after `attempts_made` tries.
    pub fn allows_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(1))
    }
}
