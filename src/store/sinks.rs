//! Found and uncertain result sinks.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{FoundRecord, UncertainRecord};
use crate::error::Result;

/// The two append-only result sets, backed by JSON array files that are
/// auto-created empty. A domain lives in at most one of the two sets;
/// demotion moves it from found to uncertain in a single operation.
pub struct ResultStore {
    found_path: PathBuf,
    uncertain_path: PathBuf,
    found: Vec<FoundRecord>,
    uncertain: Vec<UncertainRecord>,
}

impl ResultStore {
    pub fn open(found_path: PathBuf, uncertain_path: PathBuf) -> Result<Self> {
        let found = load_or_init(&found_path)?;
        let uncertain = load_or_init(&uncertain_path)?;
        Ok(Self {
            found_path,
            uncertain_path,
            found,
            uncertain,
        })
    }

    /// Append a found record and persist. A domain already recorded in
    /// either set is left where it is.
    pub fn record_found(&mut self, record: FoundRecord) -> Result<bool> {
        if self.contains(&record.domain) {
            log::debug!("{} already recorded, skipping", record.domain);
            return Ok(false);
        }
        self.found.push(record);
        write_sink(&self.found_path, &self.found)?;
        Ok(true)
    }

    /// Append an uncertain record and persist. A domain already recorded
    /// in either set is left where it is.
    pub fn record_uncertain(&mut self, record: UncertainRecord) -> Result<bool> {
        if self.contains(&record.domain) {
            log::debug!("{} already recorded, skipping", record.domain);
            return Ok(false);
        }
        self.uncertain.push(record);
        write_sink(&self.uncertain_path, &self.uncertain)?;
        Ok(true)
    }

    /// Move a previously found domain to the uncertain set. Returns false
    /// when the domain was never in the found set.
    pub fn demote(&mut self, domain: &str) -> Result<bool> {
        let Some(pos) = self.found.iter().position(|r| r.domain == domain) else {
            return Ok(false);
        };
        let record = self.found.remove(pos);
        self.uncertain.push(UncertainRecord::demoted(&record));
        // write the uncertain side first so a crash between the two writes
        // leaves the domain present somewhere rather than lost
        write_sink(&self.uncertain_path, &self.uncertain)?;
        write_sink(&self.found_path, &self.found)?;
        log::warn!("{} demoted to uncertain after failed re-verification", domain);
        Ok(true)
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.found.iter().any(|r| r.domain == domain)
            || self.uncertain.iter().any(|r| r.domain == domain)
    }

    pub fn found(&self) -> &[FoundRecord] {
        &self.found
    }

    pub fn uncertain(&self) -> &[UncertainRecord] {
        &self.uncertain
    }
}

fn load_or_init<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, "[]")?;
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_sink<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(records)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
