//! Durable found/uncertain records.
//!
//! Both sinks are append-only ordered sequences keyed by domain name. A
//! domain lives in at most one of the two sets at any time; demotion moves
//! a record from found to uncertain, never duplicates it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classification::ClassificationResult;
use super::reading::SignalReading;

/// A domain classified Available, with its evidence snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundRecord {
    pub domain: String,
    pub found_at: DateTime<Utc>,
    pub evidence: Vec<SignalReading>,
}

impl FoundRecord {
    pub fn from_result(result: &ClassificationResult) -> Self {
        Self {
            domain: result.candidate.name.clone(),
            found_at: result.classified_at,
            evidence: result.evidence.clone(),
        }
    }
}

/// A domain the consensus could not settle, parked for manual review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertainRecord {
    pub domain: String,
    pub found_at: DateTime<Utc>,
    pub evidence: Vec<SignalReading>,
}

impl UncertainRecord {
    pub fn from_result(result: &ClassificationResult) -> Self {
        Self {
            domain: result.candidate.name.clone(),
            found_at: result.classified_at,
            evidence: result.evidence.clone(),
        }
    }

    /// Build the uncertain record for a found record that failed
    /// re-verification.
    pub fn demoted(record: &FoundRecord) -> Self {
        Self {
            domain: record.domain.clone(),
            found_at: Utc::now(),
            evidence: record.evidence.clone(),
        }
    }
}
