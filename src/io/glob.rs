//! Corpus file discovery.
//!
//! A corpus root is turned into a recursive glob pattern (`<root>/**/*.<ext>`)
//! and expanded into a sorted list of regular files. Zero matches is a valid,
//! empty corpus.
//!
//! # Examples
//!
//! ```no_run
//! use corpus_unify::io::glob::enumerate_files;
//!
//! let reports = enumerate_files("cxr_reports", "txt")?;
//! println!("found {} reports", reports.len());
//! # use anyhow::Error; Ok::<(), Error>(())
//! ```

use anyhow::{Context, Result, bail};
use glob::{MatchOptions, Pattern, glob, glob_with};
use std::path::{Path, PathBuf};

/// Expand a glob pattern into a sorted vector of matching file paths.
///
/// Directories that happen to match are skipped. The result is sorted
/// lexicographically so repeated runs over the same tree see the same order.
///
/// # Errors
///
/// Returns an error if the pattern is invalid or a matched entry cannot be
/// inspected (for example, a permission error while traversing).
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut result = Vec::new();
    for entry in paths {
        let path =
            entry.with_context(|| format!("error reading glob entry for pattern: {pattern}"))?;
        if path.is_file() {
            result.push(path);
        }
    }

    result.sort();
    Ok(result)
}

/// Build the recursive pattern for `root` and `extension`.
///
/// The root is escaped, so directory names containing `*`, `?` or `[` are
/// matched literally. A leading dot on the extension is ignored.
///
/// # Errors
///
/// Returns an error if the root is not valid UTF-8 or the extension is empty or
/// contains a path separator.
pub fn corpus_pattern(root: impl AsRef<Path>, extension: &str) -> Result<String> {
    let root = root.as_ref();
    let root_str = root
        .to_str()
        .with_context(|| format!("corpus root is not valid UTF-8: {}", root.display()))?;
    let ext = extension.trim_start_matches('.');
    if ext.is_empty() || ext.contains(['/', '\\']) {
        bail!("invalid file extension filter: {extension:?}");
    }
    // "" means the working directory; "/" trims to "" and yields "/**/...".
    let base = if root_str.is_empty() {
        "."
    } else {
        root_str.trim_end_matches(['/', '\\'])
    };
    Ok(format!(
        "{}/**/*.{}",
        Pattern::escape(base),
        Pattern::escape(ext)
    ))
}

/// Recursively list every file under `root` whose name ends in `.<extension>`.
///
/// A root that does not exist yields an empty list, matching the behavior of a
/// recursive glob over a missing directory. Hidden files and anything under a
/// hidden directory are not matched. A subdirectory that cannot be listed is
/// logged at `warn` and skipped; the rest of the tree is still enumerated.
///
/// # Errors
///
/// See [`corpus_pattern`]; traversal errors are never returned.
pub fn enumerate_files(root: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let pattern = corpus_pattern(root, extension)?;
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let entries = glob_with(&pattern, options)
        .with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut files = Vec::new();
    let mut skipped = 0usize;
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(path = %e.path().display(), error = %e.error(), "skipping unreadable directory");
                skipped += 1;
            }
        }
    }
    files.sort();

    tracing::debug!(root = %root.display(), %pattern, count = files.len(), skipped, "corpus enumerated");
    Ok(files)
}
