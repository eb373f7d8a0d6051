//! Settings persistence.
//!
//! Settings live as JSON in `.apponthego/settings.json`. Every field is
//! optional so hand-edited files may set only what they need; unset fields
//! fall back to built-in defaults when read through the accessors.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::controller::DEFAULT_UPLOAD_DELAY;
use crate::core::generator::{DEFAULT_MODEL, DEFAULT_TIMEOUT};
use crate::core::share::DEFAULT_SHARE_HOST;

/// Settings saved between sessions.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PersistedSettings {
    /// Gemini model name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Host used in fabricated share links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_host: Option<String>,
    /// Simulated upload time in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_delay_ms: Option<u64>,
    /// HTTP timeout for the analysis request in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl PersistedSettings {
    /// Settings with every field set to its built-in default.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            model: Some(DEFAULT_MODEL.to_string()),
            share_host: Some(DEFAULT_SHARE_HOST.to_string()),
            upload_delay_ms: Some(
                u64::try_from(DEFAULT_UPLOAD_DELAY.as_millis()).unwrap_or(u64::MAX),
            ),
            request_timeout_secs: Some(DEFAULT_TIMEOUT.as_secs()),
        }
    }

    /// Returns `self` with every field that `overrides` sets replaced.
    #[must_use]
    pub fn overridden_by(self, overrides: Self) -> Self {
        Self {
            model: overrides.model.or(self.model),
            share_host: overrides.share_host.or(self.share_host),
            upload_delay_ms: overrides.upload_delay_ms.or(self.upload_delay_ms),
            request_timeout_secs: overrides.request_timeout_secs.or(self.request_timeout_secs),
        }
    }

    /// Effective model name.
    #[must_use]
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }

    /// Effective share host.
    #[must_use]
    pub fn share_host(&self) -> &str {
        self.share_host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(DEFAULT_SHARE_HOST)
    }

    /// Effective simulated upload time.
    #[must_use]
    pub fn upload_delay(&self) -> Duration {
        self.upload_delay_ms
            .map_or(DEFAULT_UPLOAD_DELAY, Duration::from_millis)
    }

    /// Effective request timeout. Zero is treated as unset.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs)
    }
}

/// Loads settings from `path`.
///
/// A missing file yields [`PersistedSettings::default`].
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_settings(path: &Path) -> Result<PersistedSettings> {
    if !path.exists() {
        return Ok(PersistedSettings::default());
    }

    let content = std::fs::read_to_string(path).context("Failed to read settings file")?;

    serde_json::from_str(&content).context("Failed to parse settings file")
}

/// Saves settings to `path` as pretty-printed JSON.
///
/// The parent directory must exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_settings(path: &Path, settings: &PersistedSettings) -> Result<()> {
    let json = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

    std::fs::write(path, json).context("Failed to write settings file")
}
