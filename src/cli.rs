//! CLI argument parsing using clap.

use std::path::PathBuf;

use clap::Parser;

use crate::core::GeminiConfig;
use crate::core::generator::DEFAULT_BASE_URL;
use crate::fs::PersistedSettings;

/// `App On The Go` - simulated mobile build distribution
///
/// Pick an `.apk`, `.ipa` or `.zip` bundle, get AI generated release notes,
/// a security blurb and marketing copy, plus a share link.
/// If no bundle is given, opens the upload screen.
#[derive(Parser, Debug, Default)]
#[command(name = "apponthego", version, about, long_about = None)]
pub struct Args {
    /// Bundle to upload right away (optional in the TUI, required with --headless)
    pub bundle: Option<PathBuf>,

    /// Run one upload without the TUI and print the result as JSON
    #[arg(long, requires = "bundle")]
    pub headless: bool,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model name
    #[arg(long)]
    pub model: Option<String>,

    /// Host used in generated share links
    #[arg(long)]
    pub share_host: Option<String>,

    /// Simulated upload time in milliseconds
    #[arg(long, value_name = "MS")]
    pub upload_delay_ms: Option<u64>,

    /// Gemini REST base URL (up to and including `/models`)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
}

impl Args {
    /// Returns the API key from `--api-key`, `GEMINI_API_KEY`, or `API_KEY`.
    #[must_use]
    pub fn resolved_api_key(&self) -> Option<String> {
        first_usable_key(self.api_key.clone(), std::env::var("API_KEY").ok())
    }

    /// Returns the settings given on the command line, for layering over
    /// persisted settings.
    #[must_use]
    pub fn setting_overrides(&self) -> PersistedSettings {
        PersistedSettings {
            model: self.model.clone(),
            share_host: self.share_host.clone(),
            upload_delay_ms: self.upload_delay_ms,
            request_timeout_secs: None,
        }
    }

    /// Builds the Gemini connection settings from these arguments and the
    /// effective `settings`.
    #[must_use]
    pub fn gemini_config(&self, settings: &PersistedSettings) -> GeminiConfig {
        GeminiConfig {
            api_key: self.resolved_api_key(),
            model: settings.model().to_string(),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: settings.request_timeout(),
        }
    }
}

/// Picks `primary` unless it is missing or blank, then `fallback` on the same terms.
fn first_usable_key(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    let usable = |key: &String| !key.trim().is_empty();
    primary.filter(usable).or_else(|| fallback.filter(usable))
}
