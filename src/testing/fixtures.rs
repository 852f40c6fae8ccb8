//! Temporary corpora for tests.

use crate::config::PipelineConfig;
use anyhow::{Context, Result};
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding a report tree, a CSV export and an output slot.
///
/// Layout:
///
/// ```text
/// <tmp>/reports/...        corpus root
/// <tmp>/notes.csv          tabular input
/// <tmp>/out/corpus.parquet output
/// ```
///
/// The directory is deleted when the fixture is dropped.
pub struct CorpusFixture {
    dir: TempDir,
}

impl CorpusFixture {
    /// Create an empty fixture with the `reports/` root already present.
    ///
    /// # Errors
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create fixture tempdir")?;
        create_dir_all(dir.path().join("reports")).context("create reports root")?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn corpus_root(&self) -> PathBuf {
        self.dir.path().join("reports")
    }

    #[must_use]
    pub fn csv_path(&self) -> PathBuf {
        self.dir.path().join("notes.csv")
    }

    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join("out").join("corpus.parquet")
    }

    /// Write a report at `rel` under the corpus root, creating directories.
    ///
    /// # Errors
    /// Returns an error on I/O failure.
    pub fn add_report(&self, rel: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<PathBuf> {
        let path = self.corpus_root().join(rel);
        if let Some(parent) = path.parent() {
            create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Write the CSV input with proper quoting.
    ///
    /// # Errors
    /// Returns an error on I/O or CSV encoding failure.
    pub fn write_csv(&self, headers: &[&str], rows: &[&[&str]]) -> Result<PathBuf> {
        let path = self.csv_path();
        let mut wtr = csv::Writer::from_path(&path)
            .with_context(|| format!("create {}", path.display()))?;
        wtr.write_record(headers)?;
        for (i, row) in rows.iter().enumerate() {
            wtr.write_record(*row)
                .with_context(|| format!("write CSV row #{}", i + 1))?;
        }
        wtr.flush()?;
        Ok(path)
    }

    /// A config wired to this fixture: two workers, no progress bar.
    #[must_use]
    pub fn config(&self) -> PipelineConfig {
        PipelineConfig {
            corpus_root: self.corpus_root(),
            csv_path: self.csv_path(),
            output_path: self.output_path(),
            workers: Some(2),
            progress: false,
            ..PipelineConfig::default()
        }
    }
}

/// Radiology-style reports used across tests.
#[must_use]
pub fn sample_reports() -> Vec<(&'static str, &'static str)> {
    vec![
        ("p10/p10000032/s50414267.txt", "FINDINGS: No acute process."),
        ("p10/p10000032/s53189527.txt", "IMPRESSION: Stable  cardiomegaly."),
        ("p11/p11000011/s51029426.txt", "Lines and tubes in place.\nNo pneumothorax."),
    ]
}
