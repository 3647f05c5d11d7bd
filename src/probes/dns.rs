//! DNS existence probe.
//!
//! A resolvable name is a weak Taken signal (names can resolve without
//! being registered-and-parkable) and an unresolvable one a weak Available
//! signal. The reading never counts toward the consensus threshold; the
//! hunt loop also uses resolution as a fast pre-filter.

use tokio::net::lookup_host;

use crate::domain::{SignalReading, SignalSource, SignalVerdict};

#[derive(Debug, Clone, Default)]
pub struct DnsProbe;

impl DnsProbe {
    pub fn new() -> Self {
        Self
    }

    /// Whether the name resolves to at least one address.
    pub async fn resolves(&self, domain: &str) -> bool {
        match lookup_host((domain, 80u16)).await {
            Ok(mut addrs) => addrs.next().is_some(),
            Err(_) => false,
        }
    }

    /// Produce the weak existence reading for a candidate.
    pub async fn probe(&self, domain: &str) -> SignalReading {
        if self.resolves(domain).await {
            SignalReading::new(SignalSource::Dns, SignalVerdict::Taken, "resolves")
        } else {
            SignalReading::new(SignalSource::Dns, SignalVerdict::Available, "no records")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unresolvable_name_reads_available() {
        let probe = DnsProbe::new();
        // invalid TLD, guaranteed not to resolve
        let reading = probe.probe("zzzzzz.invalid").await;
        assert_eq!(reading.source, SignalSource::Dns);
        assert_eq!(reading.verdict, SignalVerdict::Available);
    }

    #[tokio::test]
    async fn test_unresolvable_name_does_not_resolve() {
        let probe = DnsProbe::new();
        assert!(!probe.resolves("zzzzzz.invalid").await);
    }
}
