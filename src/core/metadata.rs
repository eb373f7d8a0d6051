//! Bundle inspection and derived file metadata.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

/// Version string shown for every upload until real bundle parsing exists.
pub const PLACEHOLDER_VERSION: &str = "1.0.0";

/// Extensions the picker suggests. Advisory only: other files are still accepted.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["apk", "ipa", "zip"];

/// Returned by [`file_type`] when a name has no usable extension.
pub const UNKNOWN_TYPE: &str = "unknown";

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// A file chosen for upload.
///
/// Only the name and byte size are needed; the content is never read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    /// File name without any directory components.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}

impl BundleFile {
    /// Creates a bundle description directly.
    #[must_use]
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Reads the name and size of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist, is not a regular file,
    /// or has no file name component.
    pub fn inspect(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        if !meta.is_file() {
            anyhow::bail!("{} is not a file", path.display());
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no file name", path.display()))?;
        Ok(Self::new(name, meta.len()))
    }

    /// Returns true if the name carries one of the [`ACCEPTED_EXTENSIONS`].
    #[must_use]
    pub fn has_accepted_extension(&self) -> bool {
        is_accepted_bundle(&self.name)
    }
}

/// Snapshot of a selected file, as displayed on the result screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    pub version: String,
    pub size: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub upload_date: String,
}

impl FileMetadata {
    /// Derives metadata for `file`, stamped with `today`.
    #[must_use]
    pub fn derive(file: &BundleFile, today: NaiveDate) -> Self {
        Self {
            name: file.name.clone(),
            version: PLACEHOLDER_VERSION.to_string(),
            size: format_file_size(file.size),
            file_type: file_type(&file.name).to_string(),
            upload_date: format_upload_date(today),
        }
    }
}

/// Formats a byte count in the largest unit whose magnitude stays below 1024.
///
/// GB is the largest unit. Values are rounded to two decimals and trailing
/// zeros are dropped.
///
/// ```
/// use apponthego::core::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// assert_eq!(format_file_size(1_048_576), "1 MB");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)] // Display rounding only needs two decimals.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut divisor = 1u64;
    while unit + 1 < SIZE_UNITS.len() && bytes >= divisor * 1024 {
        divisor *= 1024;
        unit += 1;
    }

    let value = bytes as f64 / divisor as f64;
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", SIZE_UNITS[unit])
}

/// Returns the text after the last `.` in `name`, or [`UNKNOWN_TYPE`].
#[must_use]
pub fn file_type(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => UNKNOWN_TYPE,
    }
}

/// Returns true if `name` ends in one of the accepted bundle extensions.
#[must_use]
pub fn is_accepted_bundle(name: &str) -> bool {
    let ext = file_type(name);
    ACCEPTED_EXTENSIONS
        .iter()
        .any(|accepted| ext.eq_ignore_ascii_case(accepted))
}

/// Renders a calendar date as `M/D/YYYY`.
#[must_use]
pub fn format_upload_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    mod size {
        use super::*;

        #[test]
        fn zero_bytes() {
            assert_eq!(format_file_size(0), "0 Bytes");
        }

        #[test]
        fn small_values_stay_in_bytes() {
            assert_eq!(format_file_size(1), "1 Bytes");
            assert_eq!(format_file_size(1023), "1023 Bytes");
        }

        #[test]
        fn exact_kilobyte() {
            assert_eq!(format_file_size(1024), "1 KB");
        }

        #[test]
        fn fractional_kilobyte_drops_trailing_zero() {
            assert_eq!(format_file_size(1536), "1.5 KB");
        }

        #[test]
        fn rounds_to_two_decimals() {
            // 1300 / 1024 = 1.26953125
            assert_eq!(format_file_size(1300), "1.27 KB");
        }

        #[test]
        fn exact_megabyte() {
            assert_eq!(format_file_size(1_048_576), "1 MB");
        }

        #[test]
        fn typical_apk_size() {
            // 25 MB + 512 KB
            assert_eq!(format_file_size(26_738_688), "25.5 MB");
        }

        #[test]
        fn gigabytes() {
            assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
        }

        #[test]
        fn gigabyte_is_the_ceiling() {
            let two_tb = 2 * 1024u64.pow(4);
            assert_eq!(format_file_size(two_tb), "2048 GB");
        }
    }

    mod extension {
        use super::*;

        #[test]
        fn simple_extension() {
            assert_eq!(file_type("app.apk"), "apk");
        }

        #[test]
        fn last_dot_wins() {
            assert_eq!(file_type("bundle.tar.zip"), "zip");
        }

        #[test]
        fn no_dot_is_unknown() {
            assert_eq!(file_type("noext"), "unknown");
        }

        #[test]
        fn trailing_dot_is_unknown() {
            assert_eq!(file_type("archive."), "unknown");
        }

        #[test]
        fn case_is_preserved() {
            assert_eq!(file_type("Game.IPA"), "IPA");
        }

        #[test]
        fn accepted_bundle_ignores_case() {
            assert!(is_accepted_bundle("Game.IPA"));
            assert!(is_accepted_bundle("app.apk"));
            assert!(is_accepted_bundle("build.zip"));
            assert!(!is_accepted_bundle("notes.txt"));
            assert!(!is_accepted_bundle("apk"));
        }
    }

    #[test]
    fn derive_fills_every_field() -> Result<()> {
        let file = BundleFile::new("MyApp-2.0.apk", 1536);
        let today = NaiveDate::from_ymd_opt(2026, 3, 7).context("valid date")?;

        let meta = FileMetadata::derive(&file, today);

        assert_eq!(meta.name, "MyApp-2.0.apk");
        assert_eq!(meta.version, PLACEHOLDER_VERSION);
        assert_eq!(meta.size, "1.5 KB");
        assert_eq!(meta.file_type, "apk");
        assert_eq!(meta.upload_date, "3/7/2026");
        Ok(())
    }

    #[test]
    fn metadata_serializes_with_camel_case_keys() -> Result<()> {
        let today = NaiveDate::from_ymd_opt(2026, 12, 25).context("valid date")?;
        let meta = FileMetadata::derive(&BundleFile::new("a.ipa", 10), today);

        let json = serde_json::to_value(&meta)?;

        assert_eq!(json["type"], "ipa");
        assert_eq!(json["uploadDate"], "12/25/2026");
        assert_eq!(json["size"], "10 Bytes");
        Ok(())
    }

    #[test]
    fn inspect_reads_name_and_size() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("demo.apk");
        std::fs::write(&path, vec![0u8; 2048])?;

        let file = BundleFile::inspect(&path)?;

        assert_eq!(file.name, "demo.apk");
        assert_eq!(file.size, 2048);
        assert!(file.has_accepted_extension());
        Ok(())
    }

    #[test]
    fn inspect_rejects_missing_path() -> Result<()> {
        let dir = TempDir::new()?;
        assert!(BundleFile::inspect(&dir.path().join("missing.apk")).is_err());
        Ok(())
    }

    #[test]
    fn inspect_rejects_directory() -> Result<()> {
        let dir = TempDir::new()?;
        let err = BundleFile::inspect(dir.path()).unwrap_err();
        assert!(err.to_string().contains("is not a file"));
        Ok(())
    }
}
