//! Signal probes and the collector that drives them.
//!
//! Each source is probed with an independent retry policy; a failing source
//! degrades to an inconclusive reading rather than aborting the candidate.
//! Only total collection failure (no network-backed source reachable)
//! surfaces as an error so the cursor stays put.

pub mod collector;
pub mod dns;
pub mod registrar;
pub mod retry;
pub mod whois;

use async_trait::async_trait;
use rand::Rng;

use crate::domain::SignalReading;
use crate::error::Result;

pub use collector::SignalCollector;
pub use dns::DnsProbe;
pub use registrar::{RegistrarEndpoint, RegistrarProbe};
pub use retry::RetryPolicy;
pub use whois::{WhoisProbe, WhoisTransport, classify_whois_body};

/// The probe surface the hunt loop and classifier depend on. Production
/// code uses [`SignalCollector`]; tests inject scripted fakes.
#[async_trait]
pub trait ProbeSet: Send + Sync {
    /// Fast pre-filter: does the name resolve at all?
    async fn dns_resolves(&self, domain: &str) -> bool;

    /// Probe every source for one candidate.
    async fn collect(&self, domain: &str) -> Result<Vec<SignalReading>>;

    /// Re-run the WHOIS probe alone, for double verification.
    async fn recheck_whois(&self, domain: &str) -> SignalReading;
}

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/120.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Pick a browser user agent at random for outbound probe requests.
pub(crate) fn random_user_agent() -> &'static str {
    USER_AGENTS[rand::rng().random_range(0..USER_AGENTS.len())]
}
