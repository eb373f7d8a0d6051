//! File system locations and settings persistence.

use std::path::{Path, PathBuf};

use anyhow::Context;

pub mod settings;

pub use settings::{PersistedSettings, load_settings, save_settings};

/// Name of the per-project state directory.
pub const APP_DIR: &str = ".apponthego";

/// Holds every path the application writes, derived from a base directory.
///
/// Tests pass a temporary directory; production uses the working directory.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use apponthego::fs::AppPaths;
///
/// let paths = AppPaths::new(Path::new("/tmp/project"));
/// assert_eq!(
///     paths.settings_file(),
///     Path::new("/tmp/project/.apponthego/settings.json")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct AppPaths {
    base: PathBuf,
}

impl AppPaths {
    /// Creates paths rooted at `base`.
    #[must_use]
    pub fn new(base: &Path) -> Self {
        Self {
            base: base.to_path_buf(),
        }
    }

    /// Creates paths rooted at the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn from_cwd() -> anyhow::Result<Self> {
        let base = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self { base })
    }

    /// Returns the base directory.
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Returns the `.apponthego` directory path.
    #[must_use]
    pub fn app_dir(&self) -> PathBuf {
        self.base.join(APP_DIR)
    }

    /// Returns the settings file path (`.apponthego/settings.json`).
    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.app_dir().join("settings.json")
    }

    /// Returns the log file path (`.apponthego/apponthego.log`).
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.app_dir().join("apponthego.log")
    }

    /// Ensures the `.apponthego` directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_app_dir(&self) -> anyhow::Result<()> {
        let dir = self.app_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }

    /// Returns true if no settings file has been written yet.
    #[must_use]
    pub fn is_first_run(&self) -> bool {
        !self.settings_file().exists()
    }

    /// Loads settings, returning defaults when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_settings(&self) -> anyhow::Result<PersistedSettings> {
        load_settings(&self.settings_file())
    }

    /// Loads settings, writing the built-in defaults on first run so the file
    /// can be edited afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the defaults cannot be written or an existing file
    /// cannot be read or parsed.
    pub fn load_or_init_settings(&self) -> anyhow::Result<PersistedSettings> {
        if self.is_first_run() {
            let defaults = PersistedSettings::defaults();
            self.save_settings(&defaults)?;
            return Ok(defaults);
        }
        self.load_settings()
    }

    /// Saves settings, creating `.apponthego` if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file cannot be written.
    pub fn save_settings(&self, settings: &PersistedSettings) -> anyhow::Result<()> {
        self.ensure_app_dir()?;
        save_settings(&self.settings_file(), settings)
    }
}
