//! Signal readings - one probe's output for one candidate.

use serde::{Deserialize, Serialize};

/// Maximum length of the diagnostic excerpt kept from a raw response.
pub const MAX_EXCERPT_LEN: usize = 160;

/// Where a signal reading came from.
///
/// DNS is deliberately kept apart from the network-backed availability
/// sources: it is a weak pre-filter signal and never counts toward the
/// consensus threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSource {
    Dns,
    Whois,
    GoDaddy,
    Namecheap,
    Porkbun,
}

impl SignalSource {
    /// Fixed per-source contribution, diagnostic only. The consensus rule
    /// counts agreeing sources rather than summing weights.
    pub fn weight(&self) -> u32 {
        match self {
            SignalSource::Dns => 2,
            SignalSource::Whois => 10,
            SignalSource::GoDaddy => 8,
            SignalSource::Namecheap => 8,
            SignalSource::Porkbun => 8,
        }
    }

    /// True for the DNS source, which never counts toward consensus.
    pub fn is_dns(&self) -> bool {
        matches!(self, SignalSource::Dns)
    }
}

impl std::fmt::Display for SignalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SignalSource::Dns => "dns",
            SignalSource::Whois => "whois",
            SignalSource::GoDaddy => "godaddy",
            SignalSource::Namecheap => "namecheap",
            SignalSource::Porkbun => "porkbun",
        };
        write!(f, "{}", name)
    }
}

/// What a single probe concluded about a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalVerdict {
    Available,
    Taken,
    RateLimited,
    Inconclusive,
}

/// One probe's output for one candidate. Ephemeral: produced fresh per
/// classification attempt, then folded into the result's evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalReading {
    pub source: SignalSource,
    pub verdict: SignalVerdict,

    /// Bounded slice of the raw response, for diagnostics.
    pub raw_excerpt: String,

    /// Source-specific constant, recorded for diagnostics.
    pub weight: u32,
}

impl SignalReading {
    /// Build a reading, truncating the excerpt to [`MAX_EXCERPT_LEN`].
    pub fn new(source: SignalSource, verdict: SignalVerdict, raw: &str) -> Self {
        let raw_excerpt: String = raw.chars().take(MAX_EXCERPT_LEN).collect();
        Self {
            source,
            verdict,
            raw_excerpt,
            weight: source.weight(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_weights_fixed() {
        assert_eq!(SignalSource::Dns.weight(), 2);
        assert_eq!(SignalSource::Whois.weight(), 10);
        assert_eq!(SignalSource::GoDaddy.weight(), 8);
        assert_eq!(SignalSource::Namecheap.weight(), 8);
        assert_eq!(SignalSource::Porkbun.weight(), 8);
    }

    #[test]
    fn test_only_dns_is_dns() {
        assert!(SignalSource::Dns.is_dns());
        assert!(!SignalSource::Whois.is_dns());
        assert!(!SignalSource::GoDaddy.is_dns());
        assert!(!SignalSource::Namecheap.is_dns());
        assert!(!SignalSource::Porkbun.is_dns());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(SignalSource::Whois.to_string(), "whois");
        assert_eq!(SignalSource::GoDaddy.to_string(), "godaddy");
    }

    #[test]
    fn test_reading_carries_source_weight() {
        let r = SignalReading::new(SignalSource::Whois, SignalVerdict::Taken, "Registrar: X");
        assert_eq!(r.weight, 10);
        assert_eq!(r.raw_excerpt, "Registrar: X");
    }

    #[test]
    fn test_excerpt_truncated() {
        let long = "x".repeat(1000);
        let r = SignalReading::new(SignalSource::Porkbun, SignalVerdict::Inconclusive, &long);
        assert_eq!(r.raw_excerpt.len(), MAX_EXCERPT_LEN);
    }

    #[test]
    fn test_verdict_serialization() {
        assert_eq!(
            serde_json::to_string(&SignalVerdict::RateLimited).unwrap(),
            "\"rate-limited\""
        );
        assert_eq!(
            serde_json::to_string(&SignalVerdict::Available).unwrap(),
            "\"available\""
        );
    }

    #[test]
    fn test_reading_serialization_roundtrip() {
        let r = SignalReading::new(SignalSource::Namecheap, SignalVerdict::Available, "add to cart");
        let json = serde_json::to_string(&r).unwrap();
        let parsed: SignalReading = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, r);
    }
}
