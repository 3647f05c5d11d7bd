//! Candidate enumeration and the durable search cursor.
//!
//! The enumeration order is fixed and total: lengths from 3 upward, the
//! priority TLD list within a length, and all labels of that length in
//! lexicographic order within a TLD. The generator is a pure function of
//! [`SearchState`], so persisting and reloading the state is sufficient to
//! resume with no candidate skipped or repeated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Candidate;

/// Priority TLDs, shortest and most valuable first.
pub const PRIORITY_TLDS: &[&str] = &[
    "io", "ai", "me", "co", "to", "so", "sh", "gg", "fm", "am", "is", "it", "tv", "cc", "ws",
    "com", "net", "org", "app", "dev", "xyz", "pro", "biz", "top", "fun", "art", "bot",
];

/// Shortest label length the search starts at.
pub const MIN_LENGTH: u32 = 3;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const LETTERS_AND_DIGITS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Label alphabet for a given length: letters only at 3 chars, letters and
/// digits above.
pub fn alphabet_for(length: u32) -> &'static [u8] {
    if length <= MIN_LENGTH { LETTERS } else { LETTERS_AND_DIGITS }
}

/// Number of labels of the given length.
pub fn keyspace_size(length: u32) -> u128 {
    (alphabet_for(length).len() as u128).pow(length)
}

/// The label at `index` in lexicographic order over the length's alphabet.
fn label_at(length: u32, index: u64) -> String {
    let alphabet = alphabet_for(length);
    let base = alphabet.len() as u64;
    let mut digits = vec![0usize; length as usize];
    let mut rem = index;
    for slot in digits.iter_mut().rev() {
        *slot = (rem % base) as usize;
        rem /= base;
    }
    digits.into_iter().map(|d| alphabet[d] as char).collect()
}

/// Durable progress cursor. The sole source of truth for resumption: it is
/// checkpointed after every completed candidate and always points at the
/// next unvisited candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub current_length: u32,
    pub current_tld_index: usize,

    /// Position within the label enumeration for the current length + TLD.
    pub current_candidate_index: u64,

    /// Monotonic count of completed candidates.
    pub total_checked: u64,

    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            current_length: MIN_LENGTH,
            current_tld_index: 0,
            current_candidate_index: 0,
            total_checked: 0,
            last_update: None,
        }
    }
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Deterministic candidate enumeration over a fixed TLD priority list.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    tlds: Vec<String>,
}

impl CandidateGenerator {
    /// Create a generator over the given TLD priority list. An empty list
    /// falls back to the built-in priority TLDs.
    pub fn new(tlds: Vec<String>) -> Self {
        let tlds = if tlds.is_empty() {
            PRIORITY_TLDS.iter().map(|t| t.to_string()).collect()
        } else {
            tlds
        };
        Self { tlds }
    }

    /// The candidate at the cursor, plus the advanced cursor to persist once
    /// that candidate completes.
    pub fn next(&self, state: &SearchState) -> (Candidate, SearchState) {
        let mut current = state.clone();
        self.normalize(&mut current);

        let label = label_at(current.current_length, current.current_candidate_index);
        let candidate = Candidate::new(&label, &self.tlds[current.current_tld_index]);

        let mut advanced = current;
        advanced.current_candidate_index += 1;
        advanced.total_checked += 1;
        self.normalize(&mut advanced);

        (candidate, advanced)
    }

    /// Carry inner-loop exhaustion into the TLD index and TLD exhaustion
    /// into the length. Lengths grow without bound, so there is no terminal
    /// state.
    fn normalize(&self, state: &mut SearchState) {
        loop {
            if state.current_tld_index >= self.tlds.len() {
                state.current_tld_index = 0;
                state.current_candidate_index = 0;
                state.current_length += 1;
            } else if (state.current_candidate_index as u128) >= keyspace_size(state.current_length)
            {
                state.current_tld_index += 1;
                state.current_candidate_index = 0;
            } else {
                break;
            }
        }
    }

    pub fn tlds(&self) -> &[String] {
        &self.tlds
    }
}
