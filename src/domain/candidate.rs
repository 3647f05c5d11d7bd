//! Candidate domain names.

use serde::{Deserialize, Serialize};

use crate::error::{HuntError, Result};

/// A single domain name under consideration.
///
/// Candidates are derived from the search cursor and never persisted on
/// their own; reconstructing the cursor reconstructs the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Full domain name, e.g. "abc.io"
    pub name: String,

    /// Length of the label (the part before the dot)
    pub length: u32,

    /// TLD without the leading dot, e.g. "io"
    pub tld: String,
}

impl Candidate {
    /// Build a candidate from a label and TLD.
    pub fn new(label: &str, tld: &str) -> Self {
        Self {
            name: format!("{}.{}", label, tld),
            length: label.chars().count() as u32,
            tld: tld.to_string(),
        }
    }

    /// Parse a full domain name into a candidate.
    ///
    /// Splits on the last dot, so "abc.co.uk" yields label "abc.co".
    pub fn parse(domain: &str) -> Result<Self> {
        let (label, tld) = domain
            .rsplit_once('.')
            .ok_or_else(|| HuntError::InvalidDomain(domain.to_string()))?;
        if label.is_empty() || tld.is_empty() {
            return Err(HuntError::InvalidDomain(domain.to_string()));
        }
        Ok(Self::new(label, tld))
    }
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
