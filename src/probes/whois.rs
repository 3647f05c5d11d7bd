//! WHOIS probe with content-based response classification.
//!
//! WHOIS front-ends fail by content, not by exception: a rate-limited
//! endpoint happily returns 200 with a short error page that looks exactly
//! like "no such domain". The classification rules below are ordered so
//! authoritative registration markers win, rate limiting is recognized
//! before shortness, and anything unrecognized degrades to inconclusive.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{SignalReading, SignalSource, SignalVerdict};
use crate::error::{HuntError, Result};
use crate::probes::retry::RetryPolicy;

/// Markers that only appear in a registered domain's record.
const TAKEN_MARKERS: &[&str] = &["registrar:", "creation date:", "name server:"];

/// Phrases a rate-limited WHOIS endpoint puts in its response body.
const RATE_LIMIT_PHRASES: &[&str] = &["limit exceeded", "too many requests"];

/// Explicit no-such-domain phrasings.
const NO_MATCH_PHRASES: &[&str] = &["no data found", "not found", "no match for"];

/// Bodies shorter than this are effectively empty. An empty record means
/// the domain is unregistered, provided the shortness is not itself rate
/// limiting.
pub const MIN_VALID_LEN: usize = 25;

/// A no-match phrase is only trusted inside a body long enough to be a
/// real WHOIS response rather than a truncated error page.
pub const NO_MATCH_MIN_LEN: usize = 100;

/// Classify a WHOIS response body. Rules are evaluated in order:
///
/// 1. authoritative markers => Taken
/// 2. rate-limit phrases => RateLimited
/// 3. near-empty body => Available
/// 4. explicit no-match phrasing in a long body => Available
/// 5. anything else => Inconclusive
pub fn classify_whois_body(body: &str) -> SignalVerdict {
    let lower = body.to_lowercase();

    if TAKEN_MARKERS.iter().any(|m| lower.contains(m)) {
        return SignalVerdict::Taken;
    }
    if RATE_LIMIT_PHRASES.iter().any(|p| lower.contains(p)) {
        return SignalVerdict::RateLimited;
    }
    if body.trim().len() < MIN_VALID_LEN {
        return SignalVerdict::Available;
    }
    if body.trim().len() > NO_MATCH_MIN_LEN && NO_MATCH_PHRASES.iter().any(|p| lower.contains(p)) {
        return SignalVerdict::Available;
    }
    SignalVerdict::Inconclusive
}

/// Transport seam for fetching a WHOIS response body. Tests inject
/// scripted bodies; production uses [`HttpWhoisTransport`].
#[async_trait]
pub trait WhoisTransport: Send + Sync {
    async fn fetch(&self, domain: &str) -> Result<String>;
}

/// Fetches WHOIS records through the who.is web front-end.
pub struct HttpWhoisTransport {
    client: reqwest::Client,
}

impl HttpWhoisTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WhoisTransport for HttpWhoisTransport {
    async fn fetch(&self, domain: &str) -> Result<String> {
        let url = format!("https://who.is/whois/{}", domain);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, super::random_user_agent())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(HuntError::Probe(format!(
                "whois returned status {}",
                response.status()
            )));
        }
        Ok(response.text().await?)
    }
}

/// WHOIS probe with dedicated rate-limit backoff.
///
/// Transient transport failures and rate-limit responses retry under
/// separate policies; both exhaust into an inconclusive or error outcome
/// rather than a false Available.
pub struct WhoisProbe {
    transport: Arc<dyn WhoisTransport>,
    transient: RetryPolicy,
    rate_limit: RetryPolicy,
}

impl WhoisProbe {
    pub fn new(
        transport: Arc<dyn WhoisTransport>,
        transient: RetryPolicy,
        rate_limit: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            transient,
            rate_limit,
        }
    }

    /// Fetch and classify, retrying rate-limited responses after the
    /// dedicated backoff. Errors only when the transport itself stays
    /// unreachable.
    pub async fn probe(&self, domain: &str) -> Result<SignalReading> {
        let mut transient_attempts = 0u32;
        let mut rate_limit_attempts = 0u32;

        loop {
            match self.transport.fetch(domain).await {
                Ok(body) => match classify_whois_body(&body) {
                    SignalVerdict::RateLimited => {
                        rate_limit_attempts += 1;
                        if !self.rate_limit.allows_retry(rate_limit_attempts) {
                            log::warn!("whois rate limited for {}, giving up", domain);
                            return Ok(SignalReading::new(
                                SignalSource::Whois,
                                SignalVerdict::Inconclusive,
                                &body,
                            ));
                        }
                        log::debug!(
                            "whois rate limited for {} (attempt {}), backing off {:?}",
                            domain,
                            rate_limit_attempts,
                            self.rate_limit.backoff
                        );
                        tokio::time::sleep(self.rate_limit.backoff).await;
                    }
                    verdict => {
                        return Ok(SignalReading::new(SignalSource::Whois, verdict, &body));
                    }
                },
                Err(e) => {
                    transient_attempts += 1;
                    if !self.transient.allows_retry(transient_attempts) {
                        return Err(e);
                    }
                    log::debug!("whois fetch failed for {}: {}, retrying", domain, e);
                    tokio::time::sleep(self.transient.backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted transport returning canned bodies in sequence.
    struct ScriptedTransport {
        responses: Mutex<Vec<Result<String>>>,
        fetches: Mutex<u32>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                fetches: Mutex::new(0),
            }
        }

        fn fetch_count(&self) -> u32 {
            *self.fetches.lock().unwrap()
        }
    }

    #[async_trait]
    impl WhoisTransport for ScriptedTransport {
        async fn fetch(&self, _domain: &str) -> Result<String> {
            *self.fetches.lock().unwrap() += 1;
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(HuntError::Probe("script exhausted".to_string()));
            }
            responses.remove(0)
        }
    }

    fn probe_with(responses: Vec<Result<String>>) -> (WhoisProbe, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new(responses));
        let probe = WhoisProbe::new(
            transport.clone(),
            RetryPolicy::immediate(2),
            RetryPolicy::immediate(3),
        );
        (probe, transport)
    }

    fn long_not_found() -> String {
        "No match for domain \"IHJ.IO\".\n\
         >>> Last update of WHOIS database: 2025-08-01T00:00:00Z <<<\n\
         NOTICE: The queried object does not exist in this registry database."
            .to_string()
    }

    #[test]
    fn test_classify_authoritative_markers_taken() {
        let body = "Domain Name: CNR.IO\nRegistrar: Example Corp\nCreation Date: 2015-01-01";
        assert_eq!(classify_whois_body(body), SignalVerdict::Taken);
        assert_eq!(
            classify_whois_body("name server: ns1.example.com"),
            SignalVerdict::Taken
        );
    }

    #[test]
    fn test_classify_markers_case_insensitive() {
        assert_eq!(
            classify_whois_body("REGISTRAR: BigCo Registrations"),
            SignalVerdict::Taken
        );
    }

    #[test]
    fn test_classify_rate_limit_phrases() {
        assert_eq!(
            classify_whois_body("Too Many Requests"),
            SignalVerdict::RateLimited
        );
        assert_eq!(
            classify_whois_body("WHOIS query limit exceeded, try again later. Please slow down."),
            SignalVerdict::RateLimited
        );
    }

    #[test]
    fn test_classify_rate_limit_wins_over_shortness() {
        // short AND rate-limited must not read as available
        let body = "limit exceeded";
        assert!(body.len() < MIN_VALID_LEN);
        assert_eq!(classify_whois_body(body), SignalVerdict::RateLimited);
    }

    #[test]
    fn test_classify_short_body_available() {
        assert_eq!(classify_whois_body(""), SignalVerdict::Available);
        assert_eq!(classify_whois_body("NOT FOUN"), SignalVerdict::Available);
    }

    #[test]
    fn test_classify_no_match_in_long_body_available() {
        assert_eq!(classify_whois_body(&long_not_found()), SignalVerdict::Available);
    }

    #[test]
    fn test_classify_no_match_in_medium_body_inconclusive() {
        // long enough to escape the empty rule, too short to trust no-match
        let body = format!("{}not found{}", "x".repeat(20), "x".repeat(20));
        assert!(body.len() > MIN_VALID_LEN && body.len() <= NO_MATCH_MIN_LEN);
        assert_eq!(classify_whois_body(&body), SignalVerdict::Inconclusive);
    }

    #[test]
    fn test_classify_unrecognized_inconclusive() {
        let body = "x".repeat(200);
        assert_eq!(classify_whois_body(&body), SignalVerdict::Inconclusive);
    }

    #[test]
    fn test_classify_taken_wins_over_everything() {
        let body = format!("Registrar: Example Corp\n{}", long_not_found());
        assert_eq!(classify_whois_body(&body), SignalVerdict::Taken);
    }

    #[tokio::test]
    async fn test_probe_rate_limited_then_not_found_reads_available() {
        // rate limited first, then a valid long no-match body after backoff
        let (probe, transport) = probe_with(vec![
            Ok("Too Many Requests".to_string()),
            Ok(long_not_found()),
        ]);

        let reading = probe.probe("ihj.io").await.unwrap();
        assert_eq!(reading.verdict, SignalVerdict::Available);
        assert_eq!(transport.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_probe_rate_limit_exhaustion_inconclusive() {
        let (probe, transport) = probe_with(vec![
            Ok("Too Many Requests".to_string()),
            Ok("limit exceeded".to_string()),
            Ok("Too Many Requests".to_string()),
        ]);

        let reading = probe.probe("abc.io").await.unwrap();
        assert_eq!(reading.verdict, SignalVerdict::Inconclusive);
        assert_eq!(transport.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_probe_transient_failure_retries_then_errors() {
        let (probe, transport) = probe_with(vec![
            Err(HuntError::Probe("connect timeout".to_string())),
            Err(HuntError::Probe("connect timeout".to_string())),
        ]);

        let outcome = probe.probe("abc.io").await;
        assert!(outcome.is_err());
        assert_eq!(transport.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_probe_transient_failure_then_success() {
        let (probe, _) = probe_with(vec![
            Err(HuntError::Probe("connection refused".to_string())),
            Ok("Registrar: Example Corp and some padding".to_string()),
        ]);

        let reading = probe.probe("abc.io").await.unwrap();
        assert_eq!(reading.verdict, SignalVerdict::Taken);
    }

    #[tokio::test]
    async fn test_probe_taken_short_circuits_without_retry() {
        let (probe, transport) = probe_with(vec![Ok(
            "Registrar: Example Corp, Creation Date: 2001-01-01".to_string(),
        )]);

        let reading = probe.probe("cnr.io").await.unwrap();
        assert_eq!(reading.verdict, SignalVerdict::Taken);
        assert_eq!(transport.fetch_count(), 1);
    }
}
