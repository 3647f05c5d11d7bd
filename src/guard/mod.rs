//! Temporal anomaly detection over the stream of Available verdicts.
//!
//! Rate-limited or broken upstream sources can make a run of candidates
//! look available at once. Genuine finds are rare and spread out, so two
//! Available verdicts inside a short window are treated as suspect: every
//! windowed domain is re-verified and the loop cools down. This is a
//! correlation check across candidates, not a content check on any one of
//! them.

use chrono::{DateTime, Duration, Utc};

/// Width of the clustering window.
pub const DEFAULT_WINDOW_SECS: u64 = 30;

/// Available verdicts inside the window (current one included) that
/// trigger the guard.
pub const CLUSTER_THRESHOLD: usize = 2;

/// Sliding record of recent Available verdicts.
#[derive(Debug, Clone, Default)]
pub struct AnomalyWindow {
    entries: Vec<(String, DateTime<Utc>)>,
}

impl AnomalyWindow {
    /// Drop entries older than `width` before `now`.
    fn prune(&mut self, now: DateTime<Utc>, width: Duration) {
        self.entries.retain(|(_, at)| now.signed_duration_since(*at) <= width);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What the guard decided about the latest Available verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Nothing suspicious; proceed normally.
    Clear,

    /// Clustered finds. Every listed domain (the current one included)
    /// must be re-verified, and a cooldown applies before the next
    /// candidate.
    Flagged { domains: Vec<String> },
}

impl GuardOutcome {
    pub fn is_flagged(&self) -> bool {
        matches!(self, GuardOutcome::Flagged { .. })
    }
}

/// Watches Available verdicts for suspicious clustering.
#[derive(Debug, Clone)]
pub struct AnomalyGuard {
    window: AnomalyWindow,
    width: Duration,
}

impl AnomalyGuard {
    pub fn new(window_secs: u64) -> Self {
        Self {
            window: AnomalyWindow::default(),
            width: Duration::seconds(window_secs as i64),
        }
    }

    /// Record an Available verdict at `at` and check for clustering. The
    /// timestamp is passed in so tests can drive the window with a fake
    /// clock.
    pub fn observe(&mut self, domain: &str, at: DateTime<Utc>) -> GuardOutcome {
        self.window.prune(at, self.width);
        self.window.entries.push((domain.to_string(), at));

        if self.window.len() >= CLUSTER_THRESHOLD {
            let domains: Vec<String> =
                self.window.entries.iter().map(|(d, _)| d.clone()).collect();
            log::warn!(
                "anomaly: {} available verdicts within {}s ({}), forcing re-verification",
                domains.len(),
                self.width.num_seconds(),
                domains.join(", ")
            );
            GuardOutcome::Flagged { domains }
        } else {
            GuardOutcome::Clear
        }
    }

    /// Forget a domain that failed re-verification so it cannot re-trigger
    /// the guard.
    pub fn forget(&mut self, domain: &str) {
        self.window.entries.retain(|(d, _)| d != domain);
    }

    pub fn window(&self) -> &AnomalyWindow {
        &self.window
    }
}

impl Default for AnomalyGuard {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SECS)
    }
}
