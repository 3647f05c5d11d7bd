//! The collector that probes every source for one candidate.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::future::join_all;

use crate::config::Config;
use crate::domain::{SignalReading, SignalSource, SignalVerdict};
use crate::error::{HuntError, Result};
use crate::probes::dns::DnsProbe;
use crate::probes::registrar::{RegistrarEndpoint, RegistrarProbe};
use crate::probes::whois::{HttpWhoisTransport, WhoisProbe};
use crate::probes::ProbeSet;

/// Probes DNS, WHOIS, and the registrar endpoints for one candidate at a
/// time. Registrar probes run concurrently among themselves; candidates
/// are strictly sequential, so the collector holds no cross-candidate
/// state beyond health counters.
pub struct SignalCollector {
    dns: DnsProbe,
    whois: WhoisProbe,
    registrars: Vec<RegistrarProbe>,

    /// Consecutive failures per source, for periodic health logging.
    health: Mutex<HashMap<SignalSource, u32>>,
}

impl SignalCollector {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http.timeout())
            .build()?;

        let whois = WhoisProbe::new(
            std::sync::Arc::new(HttpWhoisTransport::new(client.clone())),
            config.http.transient_retry(),
            config.whois.rate_limit_retry(),
        );

        let registrars = RegistrarEndpoint::all()
            .into_iter()
            .map(|endpoint| {
                RegistrarProbe::new(endpoint, client.clone(), config.http.transient_retry())
            })
            .collect();

        Ok(Self {
            dns: DnsProbe::new(),
            whois,
            registrars,
            health: Mutex::new(HashMap::new()),
        })
    }

    fn record_health(&self, source: SignalSource, reachable: bool) {
        if let Ok(mut health) = self.health.lock() {
            let failures = health.entry(source).or_insert(0);
            if reachable {
                *failures = 0;
            } else {
                *failures += 1;
            }
        }
    }

    /// Consecutive failure count per source, for diagnostics.
    pub fn health_snapshot(&self) -> HashMap<SignalSource, u32> {
        self.health.lock().map(|h| h.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ProbeSet for SignalCollector {
    async fn dns_resolves(&self, domain: &str) -> bool {
        self.dns.resolves(domain).await
    }

    async fn collect(&self, domain: &str) -> Result<Vec<SignalReading>> {
        let mut readings = Vec::with_capacity(5);
        let mut reachable = 0usize;

        readings.push(self.dns.probe(domain).await);

        match self.whois.probe(domain).await {
            Ok(reading) => {
                reachable += 1;
                self.record_health(SignalSource::Whois, true);
                readings.push(reading);
            }
            Err(e) => {
                log::debug!("whois unreachable for {}: {}", domain, e);
                self.record_health(SignalSource::Whois, false);
                readings.push(SignalReading::new(
                    SignalSource::Whois,
                    SignalVerdict::Inconclusive,
                    &e.to_string(),
                ));
            }
        }

        let outcomes = join_all(self.registrars.iter().map(|r| r.probe(domain))).await;
        for (probe, outcome) in self.registrars.iter().zip(outcomes) {
            match outcome {
                Ok(reading) => {
                    reachable += 1;
                    self.record_health(probe.source(), true);
                    readings.push(reading);
                }
                Err(e) => {
                    log::debug!("{} unreachable for {}: {}", probe.source(), domain, e);
                    self.record_health(probe.source(), false);
                    readings.push(SignalReading::new(
                        probe.source(),
                        SignalVerdict::Inconclusive,
                        &e.to_string(),
                    ));
                }
            }
        }

        // DNS alone cannot carry a candidate; if every network-backed
        // source is down the candidate must be retried, not classified.
        if reachable == 0 {
            return Err(HuntError::AllSourcesDown(domain.to_string()));
        }

        Ok(readings)
    }

    async fn recheck_whois(&self, domain: &str) -> SignalReading {
        match self.whois.probe(domain).await {
            Ok(reading) => reading,
            Err(e) => {
                log::debug!("whois recheck unreachable for {}: {}", domain, e);
                SignalReading::new(SignalSource::Whois, SignalVerdict::Inconclusive, &e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_construction() {
        let config = Config::default();
        let collector = SignalCollector::new(&config).unwrap();
        assert_eq!(collector.registrars.len(), 3);
        assert!(collector.health_snapshot().is_empty());
    }

    #[test]
    fn test_health_counters_reset_on_success() {
        let config = Config::default();
        let collector = SignalCollector::new(&config).unwrap();

        collector.record_health(SignalSource::Whois, false);
        collector.record_health(SignalSource::Whois, false);
        assert_eq!(collector.health_snapshot()[&SignalSource::Whois], 2);

        collector.record_health(SignalSource::Whois, true);
        assert_eq!(collector.health_snapshot()[&SignalSource::Whois], 0);
    }
}
