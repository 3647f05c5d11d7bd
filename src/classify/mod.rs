//! Consensus classification with mandatory double verification.
//!
//! The decision rule is a count of agreeing independent sources, not a
//! weighted score. Any authoritative Taken reading wins immediately; an
//! Available verdict needs three non-DNS sources in agreement and still
//! has to survive a delayed WHOIS re-check before it is final.

use std::collections::HashSet;
use std::time::Duration;

use crate::domain::{
    Candidate, ClassificationResult, SignalReading, SignalVerdict, Verdict,
};
use crate::probes::ProbeSet;

/// Independent non-DNS sources that must agree before a verdict can be
/// tentatively Available.
pub const MIN_AVAILABLE_SOURCES: usize = 3;

/// What the pure consensus rule concluded, before re-verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consensus {
    Taken,

    /// Enough sources agree, pending the WHOIS re-check.
    Tentative,

    Uncertain,
}

/// Apply the consensus rule to one candidate's readings.
///
/// Precedence:
/// 1. any non-DNS Taken reading wins immediately;
/// 2. at least [`MIN_AVAILABLE_SOURCES`] distinct non-DNS sources reporting
///    Available, with zero Taken readings from any source, is Tentative —
///    a DNS Taken blocks this but can never finalize Taken on its own;
/// 3. everything else is Uncertain.
///
/// Pure function of the readings, so classifying the same set twice gives
/// the same answer.
pub fn consensus(readings: &[SignalReading]) -> Consensus {
    if readings
        .iter()
        .any(|r| r.verdict == SignalVerdict::Taken && !r.source.is_dns())
    {
        return Consensus::Taken;
    }

    let any_taken = readings.iter().any(|r| r.verdict == SignalVerdict::Taken);
    let available_sources: HashSet<_> = readings
        .iter()
        .filter(|r| r.verdict == SignalVerdict::Available && !r.source.is_dns())
        .map(|r| r.source)
        .collect();

    if !any_taken && available_sources.len() >= MIN_AVAILABLE_SOURCES {
        Consensus::Tentative
    } else {
        Consensus::Uncertain
    }
}

/// Folds readings into a final verdict, re-checking WHOIS once for every
/// tentative Available.
pub struct ConsensusClassifier {
    /// Pause before the re-check, so a rate-limited window can clear.
    recheck_pause: Duration,
}

impl ConsensusClassifier {
    pub fn new(recheck_pause: Duration) -> Self {
        Self { recheck_pause }
    }

    /// Classify one candidate. Exactly one WHOIS re-check runs per
    /// tentative verdict; its reading is appended to the evidence.
    pub async fn classify(
        &self,
        candidate: &Candidate,
        readings: Vec<SignalReading>,
        probes: &dyn ProbeSet,
    ) -> ClassificationResult {
        match consensus(&readings) {
            Consensus::Taken => {
                ClassificationResult::new(candidate.clone(), Verdict::Taken, readings)
            }
            Consensus::Uncertain => {
                ClassificationResult::new(candidate.clone(), Verdict::Uncertain, readings)
            }
            Consensus::Tentative => self.reverify(candidate, readings, probes).await,
        }
    }

    /// Re-run WHOIS alone. A Taken-qualifying response flips the verdict;
    /// anything else finalizes Available with `reverified` set.
    async fn reverify(
        &self,
        candidate: &Candidate,
        mut evidence: Vec<SignalReading>,
        probes: &dyn ProbeSet,
    ) -> ClassificationResult {
        tokio::time::sleep(self.recheck_pause).await;

        let recheck = probes.recheck_whois(&candidate.name).await;
        let flipped = recheck.verdict == SignalVerdict::Taken;
        evidence.push(recheck);

        if flipped {
            log::info!("{} flipped to taken on whois re-check", candidate.name);
            ClassificationResult::new(candidate.clone(), Verdict::Taken, evidence)
        } else {
            let mut result =
                ClassificationResult::new(candidate.clone(), Verdict::Available, evidence);
            result.reverified = true;
            result
        }
    }
}

impl Default for ConsensusClassifier {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}
