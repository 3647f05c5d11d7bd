//! Configuration loaded from YAML with per-section defaults.
//!
//! Search chain: explicit path, then `~/.config/huntr/huntr.yml`, then
//! `./huntr.yml`, then built-in defaults. `HUNTR_WEBHOOK` overrides the
//! configured webhook URL.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::generator::PRIORITY_TLDS;
use crate::probes::RetryPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,

    /// Directory holding the state file, result sinks, and logs.
    pub data_dir: PathBuf,

    pub search: SearchConfig,
    pub http: HttpConfig,
    pub whois: WhoisConfig,
    pub pacing: PacingConfig,
    pub guard: GuardConfig,
    pub notify: NotifyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            data_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("huntr"),
            search: SearchConfig::default(),
            http: HttpConfig::default(),
            whois: WhoisConfig::default(),
            pacing: PacingConfig::default(),
            guard: GuardConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// TLDs in priority order. Empty means the built-in list.
    pub tlds: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tlds: PRIORITY_TLDS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_ms: u64,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            retry_attempts: 2,
            retry_backoff_ms: 1_000,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Retry policy for transient transport failures on any probe.
    pub fn transient_retry(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_backoff_ms))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhoisConfig {
    pub rate_limit_attempts: u32,
    pub rate_limit_backoff_ms: u64,
}

impl Default for WhoisConfig {
    fn default() -> Self {
        Self {
            rate_limit_attempts: 3,
            rate_limit_backoff_ms: 10_000,
        }
    }
}

impl WhoisConfig {
    /// Dedicated policy for responses that are themselves rate-limit pages.
    pub fn rate_limit_retry(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.rate_limit_attempts,
            Duration::from_millis(self.rate_limit_backoff_ms),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Randomized baseline delay between candidates.
    pub base_delay_min_ms: u64,
    pub base_delay_max_ms: u64,

    /// Added after any Available verdict.
    pub found_cooldown_ms: u64,

    /// Added after the anomaly guard flags clustered finds.
    pub anomaly_cooldown_ms: u64,

    /// Pause before the WHOIS re-check of a tentative Available.
    pub recheck_pause_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            base_delay_min_ms: 200,
            base_delay_max_ms: 500,
            found_cooldown_ms: 3_000,
            anomaly_cooldown_ms: 10_000,
            recheck_pause_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Width of the anomaly clustering window.
    pub window_secs: u64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self { window_secs: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub webhook_url: Option<String>,

    /// Only labels this short or shorter trigger a notification.
    pub min_notify_length: u32,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            min_notify_length: 4,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_chain(config_path)?;

        if let Ok(url) = std::env::var("HUNTR_WEBHOOK") {
            if !url.is_empty() {
                config.notify.webhook_url = Some(url);
            }
        }

        Ok(config)
    }

    fn load_chain(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join("hunter_state.json")
    }

    pub fn found_path(&self) -> PathBuf {
        self.data_dir.join("found_domains.json")
    }

    pub fn uncertain_path(&self) -> PathBuf {
        self.data_dir.join("uncertain_domains.json")
    }
}
