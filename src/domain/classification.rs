//! Final classification of a candidate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::candidate::Candidate;
use super::reading::SignalReading;

/// Final verdict for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Available,
    Taken,
    Uncertain,
}

/// The outcome of classifying one candidate.
///
/// Invariant: once any reading shows authoritative registration data the
/// verdict is Taken, and no amount of conflicting positive signals can
/// downgrade it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub candidate: Candidate,
    pub verdict: Verdict,

    /// The readings that produced the verdict, in probe order. A WHOIS
    /// re-check, when one ran, is appended last.
    pub evidence: Vec<SignalReading>,

    pub classified_at: DateTime<Utc>,

    /// Whether a second WHOIS pass confirmed an Available verdict.
    pub reverified: bool,
}

impl ClassificationResult {
    pub fn new(candidate: Candidate, verdict: Verdict, evidence: Vec<SignalReading>) -> Self {
        Self {
            candidate,
            verdict,
            evidence,
            classified_at: Utc::now(),
            reverified: false,
        }
    }
}
