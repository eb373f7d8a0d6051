//! Bundle picker search.
//!
//! Walks the working directory with the `ignore` crate and ranks files with
//! `nucleo-matcher` fuzzy scoring against the typed path. Files with an
//! accepted bundle extension are boosted; other files still appear.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use nucleo_matcher::pattern::{Atom, AtomKind, CaseMatching, Normalization};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use tracing::debug;

use crate::core::metadata::is_accepted_bundle;

/// Maximum number of matches to return.
pub const MAX_BUNDLE_MATCHES: usize = 8;

/// Score boost for `.apk`, `.ipa` and `.zip` files.
const BUNDLE_SCORE_BOOST: u32 = 50;

/// A single candidate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleMatch {
    /// Path relative to the search root.
    pub path: PathBuf,
    /// Fuzzy score, higher is better. Zero for an empty query.
    pub score: u32,
    /// Whether the file has an accepted bundle extension.
    pub is_bundle: bool,
}

/// Result of one search.
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Matches, best first.
    pub matches: Vec<BundleMatch>,
}

fn rank(a: &BundleMatch, b: &BundleMatch) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.is_bundle.cmp(&a.is_bundle))
        .then_with(|| a.path.cmp(&b.path))
}

/// Searches `root` for files matching `query`.
///
/// An empty query lists bundles first, then other files, alphabetically.
/// Hidden files, anything excluded by `.gitignore` and entries that cannot be
/// read are skipped. Returns at most [`MAX_BUNDLE_MATCHES`] results.
#[must_use]
pub fn search_bundles(query: &str, root: &Path) -> SearchResult {
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .follow_links(true)
        .add_custom_ignore_filename(".gitignore")
        .build();

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_some_and(|ft| ft.is_file())
                    && let Ok(relative) = entry.path().strip_prefix(root)
                {
                    files.push(relative.to_path_buf());
                }
            }
            Err(e) => debug!(error = %e, "skipping unreadable entry"),
        }
    }

    let query = query.trim();
    let mut matches: Vec<BundleMatch> = if query.is_empty() {
        files
            .into_iter()
            .map(|path| BundleMatch {
                is_bundle: is_accepted_bundle(&path.to_string_lossy()),
                path,
                score: 0,
            })
            .collect()
    } else {
        let mut matcher = Matcher::new(Config::DEFAULT);
        let atom = Atom::new(
            query,
            CaseMatching::Ignore,
            Normalization::Smart,
            AtomKind::Fuzzy,
            false,
        );
        let mut buf = Vec::new();

        files
            .into_iter()
            .filter_map(|path| {
                let haystack_str = path.to_string_lossy().into_owned();
                let haystack = Utf32Str::new(&haystack_str, &mut buf);
                let score = u32::from(atom.score(haystack, &mut matcher)?);
                let is_bundle = is_accepted_bundle(&haystack_str);
                let score = if is_bundle {
                    score.saturating_add(BUNDLE_SCORE_BOOST)
                } else {
                    score
                };
                Some(BundleMatch {
                    path,
                    score,
                    is_bundle,
                })
            })
            .collect()
    };

    matches.sort_by(rank);
    matches.truncate(MAX_BUNDLE_MATCHES);
    SearchResult { matches }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn create_files(dir: &Path, files: &[&str]) -> Result<()> {
        for file in files {
            let path = dir.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            File::create(&path)?;
        }
        Ok(())
    }

    fn paths(result: &SearchResult) -> Vec<&Path> {
        result.matches.iter().map(|m| m.path.as_path()).collect()
    }

    #[test]
    fn empty_query_lists_bundles_first() -> Result<()> {
        let temp_dir = TempDir::new()?;
        create_files(temp_dir.path(), &["a.txt", "z.apk", "m.ipa", "b.md"])?;

        let result = search_bundles("", temp_dir.path());

        assert_eq!(
            paths(&result),
            vec![
                Path::new("m.ipa"),
                Path::new("z.apk"),
                Path::new("a.txt"),
                Path::new("b.md")
            ]
        );
        Ok(())
    }

    #[test]
    fn directories_are_not_listed() -> Result<()> {
        let temp_dir = TempDir::new()?;
        create_files(temp_dir.path(), &["build/out/app.apk"])?;

        let result = search_bundles("", temp_dir.path());

        assert_eq!(paths(&result), vec![Path::new("build/out/app.apk")]);
        Ok(())
    }

    #[test]
    fn fuzzy_query_finds_nested_bundle() -> Result<()> {
        let temp_dir = TempDir::new()?;
        create_files(
            temp_dir.path(),
            &["android/release/MyApp-2.0.apk", "README.md", "src/main.rs"],
        )?;

        let result = search_bundles("myapp", temp_dir.path());

        assert_eq!(
            result.matches.first().map(|m| m.path.as_path()),
            Some(Path::new("android/release/MyApp-2.0.apk"))
        );
        assert!(result.matches[0].is_bundle);
        Ok(())
    }

    #[test]
    fn bundles_outrank_equally_named_files() -> Result<()> {
        let temp_dir = TempDir::new()?;
        create_files(temp_dir.path(), &["game.txt", "game.zip"])?;

        let result = search_bundles("game", temp_dir.path());

        assert_eq!(
            paths(&result),
            vec![Path::new("game.zip"), Path::new("game.txt")]
        );
        assert!(result.matches[0].score > result.matches[1].score);
        Ok(())
    }

    #[test]
    fn non_bundles_still_match() -> Result<()> {
        let temp_dir = TempDir::new()?;
        create_files(temp_dir.path(), &["notes.txt"])?;

        let result = search_bundles("notes", temp_dir.path());

        assert_eq!(paths(&result), vec![Path::new("notes.txt")]);
        assert!(!result.matches[0].is_bundle);
        Ok(())
    }

    #[test]
    fn respects_gitignore_and_hidden_files() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join(".gitignore"), "target/\n")?;
        create_files(
            temp_dir.path(),
            &["target/debug.apk", ".cache/old.apk", "keep.apk"],
        )?;

        let result = search_bundles("apk", temp_dir.path());

        assert_eq!(paths(&result), vec![Path::new("keep.apk")]);
        Ok(())
    }

    #[test]
    fn limits_results() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let files: Vec<String> = (0..20).map(|i| format!("build_{i}.apk")).collect();
        let refs: Vec<&str> = files.iter().map(String::as_str).collect();
        create_files(temp_dir.path(), &refs)?;

        let result = search_bundles("build", temp_dir.path());

        assert_eq!(result.matches.len(), MAX_BUNDLE_MATCHES);
        Ok(())
    }

    #[test]
    fn scores_sorted_descending() -> Result<()> {
        let temp_dir = TempDir::new()?;
        create_files(
            temp_dir.path(),
            &["app.apk", "application.zip", "my_app.txt", "other.ipa"],
        )?;

        let result = search_bundles("app", temp_dir.path());

        for pair in result.matches.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        Ok(())
    }

    #[test]
    fn no_matches() -> Result<()> {
        let temp_dir = TempDir::new()?;
        create_files(temp_dir.path(), &["apple.apk"])?;

        let result = search_bundles("zzzznotfound", temp_dir.path());

        assert!(result.matches.is_empty());
        Ok(())
    }
}
