//! Registrar availability probes.
//!
//! Three independent endpoints, each parsed by content. Premium and
//! brokered listings report Taken: a domain held for resale is not truly
//! available.

use std::time::Duration;

use crate::domain::{SignalReading, SignalSource, SignalVerdict};
use crate::error::{HuntError, Result};
use crate::probes::retry::RetryPolicy;

/// The registrar endpoints probed for every candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrarEndpoint {
    GoDaddy,
    Namecheap,
    Porkbun,
}

impl RegistrarEndpoint {
    pub fn all() -> [RegistrarEndpoint; 3] {
        [
            RegistrarEndpoint::GoDaddy,
            RegistrarEndpoint::Namecheap,
            RegistrarEndpoint::Porkbun,
        ]
    }

    pub fn source(&self) -> SignalSource {
        match self {
            RegistrarEndpoint::GoDaddy => SignalSource::GoDaddy,
            RegistrarEndpoint::Namecheap => SignalSource::Namecheap,
            RegistrarEndpoint::Porkbun => SignalSource::Porkbun,
        }
    }

    pub fn url(&self, domain: &str) -> String {
        match self {
            RegistrarEndpoint::GoDaddy => format!(
                "https://find.godaddy.com/domainsapi/v1/search/exact?q={}&key=dpp_search",
                domain
            ),
            RegistrarEndpoint::Namecheap => format!(
                "https://www.namecheap.com/domains/registration/results/?domain={}",
                domain
            ),
            RegistrarEndpoint::Porkbun => {
                format!("https://porkbun.com/products/domains/{}", domain)
            }
        }
    }

    /// Parse an endpoint's response body into a verdict. Unrecognized
    /// content is inconclusive, never an error.
    pub fn parse(&self, body: &str) -> SignalVerdict {
        match self {
            RegistrarEndpoint::GoDaddy => parse_godaddy(body),
            RegistrarEndpoint::Namecheap => parse_namecheap(body),
            RegistrarEndpoint::Porkbun => parse_porkbun(body),
        }
    }
}

fn parse_godaddy(body: &str) -> SignalVerdict {
    let json: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return SignalVerdict::Inconclusive,
    };
    let Some(exact) = json.get("ExactMatchDomain") else {
        return SignalVerdict::Inconclusive;
    };
    if exact
        .get("IsPremiumTier")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
    {
        return SignalVerdict::Taken;
    }
    match exact.get("IsAvailable").and_then(|v| v.as_bool()) {
        Some(true) => SignalVerdict::Available,
        Some(false) => SignalVerdict::Taken,
        None => SignalVerdict::Inconclusive,
    }
}

fn parse_namecheap(body: &str) -> SignalVerdict {
    let lower = body.to_lowercase();
    if lower.contains("premium") {
        return SignalVerdict::Taken;
    }
    if lower.contains("domain taken") || lower.contains("unavailable") {
        return SignalVerdict::Taken;
    }
    if lower.contains("add to cart") {
        return SignalVerdict::Available;
    }
    SignalVerdict::Inconclusive
}

fn parse_porkbun(body: &str) -> SignalVerdict {
    let lower = body.to_lowercase();
    if lower.contains("premium") {
        return SignalVerdict::Taken;
    }
    if lower.contains("unavailable") || lower.contains("already registered") {
        return SignalVerdict::Taken;
    }
    if lower.contains("add to cart") || lower.contains("register this domain") {
        return SignalVerdict::Available;
    }
    SignalVerdict::Inconclusive
}

/// One registrar endpoint plus its transport and retry policy.
pub struct RegistrarProbe {
    endpoint: RegistrarEndpoint,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl RegistrarProbe {
    pub fn new(endpoint: RegistrarEndpoint, client: reqwest::Client, retry: RetryPolicy) -> Self {
        Self {
            endpoint,
            client,
            retry,
        }
    }

    pub fn source(&self) -> SignalSource {
        self.endpoint.source()
    }

    /// Fetch and parse, retrying transport failures. Errors only when the
    /// endpoint stays unreachable across all attempts.
    pub async fn probe(&self, domain: &str) -> Result<SignalReading> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.fetch(domain).await {
                Ok(body) => {
                    let verdict = self.endpoint.parse(&body);
                    return Ok(SignalReading::new(self.endpoint.source(), verdict, &body));
                }
                Err(e) => {
                    if !self.retry.allows_retry(attempts) {
                        return Err(e);
                    }
                    log::debug!(
                        "{} fetch failed for {}: {}, retrying",
                        self.endpoint.source(),
                        domain,
                        e
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                }
            }
        }
    }

    async fn fetch(&self, domain: &str) -> Result<String> {
        let mut request = self
            .client
            .get(self.endpoint.url(domain))
            .header(reqwest::header::USER_AGENT, super::random_user_agent())
            .timeout(Duration::from_secs(10));
        if self.endpoint == RegistrarEndpoint::GoDaddy {
            request = request.header(reqwest::header::ACCEPT, "application/json");
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(HuntError::Probe(format!(
                "{} returned status {}",
                self.endpoint.source(),
                response.status()
            )));
        }
        Ok(response.text().await?)
    }
}
