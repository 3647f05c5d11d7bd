//! The durable search cursor file.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;

use crate::error::Result;
use crate::generator::SearchState;

/// Reads and writes `hunter_state.json`. Writes go through a temp file
/// and rename so a crash mid-write never leaves a torn cursor.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the cursor, or start fresh when no state file exists yet.
    pub fn load(&self) -> Result<SearchState> {
        if !self.path.exists() {
            log::info!("no state file at {}, starting fresh", self.path.display());
            return Ok(SearchState::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let state: SearchState = serde_json::from_str(&content)?;
        log::info!(
            "resuming at length {} tld #{} index {} ({} checked)",
            state.current_length,
            state.current_tld_index,
            state.current_candidate_index,
            state.total_checked
        );
        Ok(state)
    }

    /// Persist the cursor synchronously, stamping `last_update`.
    pub fn save(&self, state: &SearchState) -> Result<()> {
        let mut stamped = state.clone();
        stamped.last_update = Some(Utc::now());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&stamped)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
