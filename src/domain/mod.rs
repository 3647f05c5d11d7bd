//! Core value types shared across the hunt pipeline.
//!
//! Candidates and signal readings are ephemeral: a candidate lives for one
//! classification pass, a reading for one probe attempt. Only classification
//! results survive, as snapshots inside found/uncertain records.

pub mod candidate;
pub mod classification;
pub mod reading;
pub mod records;

pub use candidate::Candidate;
pub use classification::{ClassificationResult, Verdict};
pub use reading::{SignalReading, SignalSource, SignalVerdict};
pub use records::{FoundRecord, UncertainRecord};
