//! Runtime settings
//!
//! Settings live in `settings.json` under the user's config directory and can
//! be overridden per-run from the environment or the command line.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

static DOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+(\.[a-z0-9-]+)*$").expect("static regex"));

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Hosting provider shown in chat messages.
    pub provider_name: String,
    pub domain: String,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Probability in `[0, 1]` that a simulated deployment fails.
    pub failure_rate: f64,
    pub status_poll_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider_name: "Netlify".to_string(),
            domain: "netlify.app".to_string(),
            min_delay_ms: 2000,
            max_delay_ms: 5000,
            failure_rate: 0.0,
            status_poll_ms: 1000,
        }
    }
}

impl Settings {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(crate::metadata::PKG_NAME)
            .join("settings.json")
    }

    /// Reads settings from `path`, falling back to defaults when the file does
    /// not exist yet.
    pub fn load(path: &Path) -> ServiceResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Writes via a temporary file and an atomic rename.
    pub fn save(&self, path: &Path) -> ServiceResult<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp = path.with_extension("tmp");
        let mut f = File::create(&temp)?;
        f.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;
        f.sync_all()?;
        fs::rename(temp, path)?;
        Ok(())
    }

    pub fn validate(&self) -> ServiceResult<()> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ServiceError::InvalidSettings(format!(
                "minDelayMs ({}) exceeds maxDelayMs ({})",
                self.min_delay_ms, self.max_delay_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(ServiceError::InvalidSettings(format!(
                "failureRate must be within [0, 1], got {}",
                self.failure_rate
            )));
        }
        if !DOMAIN_RE.is_match(&self.domain) {
            return Err(ServiceError::InvalidSettings(format!(
                "domain '{}' must be lower-case letters, digits, '-' and '.'",
                self.domain
            )));
        }
        if self.provider_name.trim().is_empty() {
            return Err(ServiceError::InvalidSettings(
                "providerName cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn status_poll(&self) -> Duration {
        Duration::from_millis(self.status_poll_ms)
    }
}
