//! Webhook notification for finalized finds.
//!
//! Notification is best-effort: a failed or missing webhook never affects
//! classification or persistence.

use serde_json::json;

use crate::config::NotifyConfig;
use crate::domain::ClassificationResult;

pub struct Notifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
    min_notify_length: u32,
}

impl Notifier {
    pub fn new(client: reqwest::Client, config: &NotifyConfig) -> Self {
        Self {
            client,
            webhook_url: config.webhook_url.clone(),
            min_notify_length: config.min_notify_length,
        }
    }

    /// Whether this find is worth a notification: a webhook is configured
    /// and the label is short enough to be interesting.
    pub fn wants(&self, result: &ClassificationResult) -> bool {
        self.webhook_url.is_some() && result.candidate.length <= self.min_notify_length
    }

    /// POST the find to the webhook. Errors are logged and swallowed.
    pub async fn notify(&self, result: &ClassificationResult) {
        if !self.wants(result) {
            return;
        }
        let url = self.webhook_url.as_deref().unwrap_or_default();
        let payload = json!({
            "content": format!(
                "Found available domain: **{}** ({} chars)",
                result.candidate.name, result.candidate.length
            ),
        });

        match self.client.post(url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                log::debug!("notified webhook for {}", result.candidate.name);
            }
            Ok(response) => {
                log::warn!(
                    "webhook returned status {} for {}",
                    response.status(),
                    result.candidate.name
                );
            }
            Err(e) => {
                log::warn!("webhook notify failed for {}: {}", result.candidate.name, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Candidate, Verdict};

    fn result_for(label: &str) -> ClassificationResult {
        ClassificationResult::new(Candidate::new(label, "io"), Verdict::Available, vec![])
    }

    fn notifier(webhook: Option<&str>, min_len: u32) -> Notifier {
        Notifier::new(
            reqwest::Client::new(),
            &NotifyConfig {
                webhook_url: webhook.map(|s| s.to_string()),
                min_notify_length: min_len,
            },
        )
    }

    #[test]
    fn test_no_webhook_wants_nothing() {
        let n = notifier(None, 4);
        assert!(!n.wants(&result_for("abc")));
    }

    #[test]
    fn test_short_label_wanted() {
        let n = notifier(Some("https://example.com/hook"), 4);
        assert!(n.wants(&result_for("abc")));
        assert!(n.wants(&result_for("abcd")));
    }

    #[test]
    fn test_long_label_not_wanted() {
        let n = notifier(Some("https://example.com/hook"), 4);
        assert!(!n.wants(&result_for("abcde")));
    }

    #[tokio::test]
    async fn test_notify_failure_is_swallowed() {
        // unreachable host: notify must not panic or propagate
        let n = notifier(Some("http://127.0.0.1:1/hook"), 4);
        n.notify(&result_for("abc")).await;
    }
}
