//! Inter-candidate pacing.
//!
//! The delay between candidates is cumulative: a randomized baseline is
//! always applied, a fixed cooldown is added after any Available verdict,
//! and an extended cooldown is added when the anomaly guard fires. The
//! WHOIS rate-limit backoff is separate and lives inside the WHOIS retry
//! loop.

use std::time::Duration;

use rand::Rng;

use crate::config::PacingConfig;

/// Cumulative delay policy consumed by the hunt loop between candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingPolicy {
    base_min: Duration,
    base_max: Duration,
    found_cooldown: Duration,
    anomaly_cooldown: Duration,
}

impl PacingPolicy {
    pub fn from_config(config: &PacingConfig) -> Self {
        Self {
            base_min: Duration::from_millis(config.base_delay_min_ms),
            base_max: Duration::from_millis(config.base_delay_max_ms.max(config.base_delay_min_ms)),
            found_cooldown: Duration::from_millis(config.found_cooldown_ms),
            anomaly_cooldown: Duration::from_millis(config.anomaly_cooldown_ms),
        }
    }

    /// Zero everywhere, for tests that step the loop without sleeping.
    pub fn instant() -> Self {
        Self {
            base_min: Duration::ZERO,
            base_max: Duration::ZERO,
            found_cooldown: Duration::ZERO,
            anomaly_cooldown: Duration::ZERO,
        }
    }

    /// Randomized baseline within the configured range.
    fn baseline(&self) -> Duration {
        if self.base_max <= self.base_min {
            return self.base_min;
        }
        let span = (self.base_max - self.base_min).as_millis() as u64;
        self.base_min + Duration::from_millis(rand::rng().random_range(0..=span))
    }

    /// The pause before the next candidate, given what the last one did.
    pub fn pause(&self, found: bool, anomaly: bool) -> Duration {
        let mut delay = self.baseline();
        if found {
            delay += self.found_cooldown;
        }
        if anomaly {
            delay += self.anomaly_cooldown;
        }
        delay
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::from_config(&PacingConfig::default())
    }
}
