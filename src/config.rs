//! Pipeline configuration.
//!
//! Every knob of a run lives in [`PipelineConfig`]. Defaults reproduce the
//! reference layout (`cxr_reports/**/*.txt` plus the `TEXT` column of
//! `NOTEEVENTS.csv`, written to `mimic.parquet` with zstd level 3). A JSON file
//! can override any subset of fields; missing fields keep their defaults.

use crate::error::PipelineError;
use crate::ingest::IngestOptions;
use crate::io::csv::CsvOptions;
use crate::io::parquet::{ParquetCompression, ParquetOptions};
use crate::stats::WordSplit;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration for a unification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Root directory of the file corpus, searched recursively.
    pub corpus_root: PathBuf,

    /// Extension of corpus files, without the leading dot.
    pub file_extension: String,

    /// Delimited tabular input; may be gzip/zstd/bzip2/xz compressed.
    pub csv_path: PathBuf,

    /// Column of the tabular input holding the text.
    pub csv_column: String,

    /// Field delimiter of the tabular input (a single ASCII character).
    pub csv_delimiter: char,

    /// Output Parquet file, replaced on every run.
    pub output_path: PathBuf,

    /// Column name of the file corpus and of the unified output.
    pub output_column: String,

    /// Output column compression codec.
    pub compression: ParquetCompression,

    /// Codec level; `None` uses the codec default.
    pub compression_level: Option<i32>,

    /// Rows per Parquet row group.
    pub row_group_size: usize,

    /// Ingestion workers; `None` means one per logical CPU.
    pub workers: Option<usize>,

    /// Show a progress bar while reading corpus files.
    pub progress: bool,

    /// Word counting rule for statistics.
    pub word_split: WordSplit,

    /// Run the file and tabular pipelines concurrently.
    pub concurrent_corpora: bool,

    /// Where to save run metrics as JSON, if anywhere.
    pub metrics_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            corpus_root: PathBuf::from("cxr_reports"),
            file_extension: "txt".to_string(),
            csv_path: PathBuf::from("NOTEEVENTS.csv"),
            csv_column: "TEXT".to_string(),
            csv_delimiter: ',',
            output_path: PathBuf::from("mimic.parquet"),
            output_column: "text".to_string(),
            compression: ParquetCompression::Zstd,
            compression_level: Some(3),
            row_group_size: 64 * 1024,
            workers: None,
            progress: true,
            word_split: WordSplit::SingleSpace,
            concurrent_corpora: false,
            metrics_path: None,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    /// [`PipelineError::Config`] if the file is missing or not valid config JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| PipelineError::Config(format!("parse {}: {e}", path.display())))?;
        Ok(config)
    }

    /// Write this configuration as pretty JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(path, json + "\n").with_context(|| format!("write {}", path.display()))
    }

    /// Check the configuration before any work starts.
    ///
    /// # Errors
    /// [`PipelineError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let bad = |msg: &str| Err(PipelineError::Config(msg.to_string()));
        if self.corpus_root.as_os_str().is_empty() {
            return bad("corpus_root must not be empty");
        }
        if self.file_extension.trim_start_matches('.').is_empty() {
            return bad("file_extension must not be empty");
        }
        if self.file_extension.contains(['/', '\\']) {
            return bad("file_extension must not contain a path separator");
        }
        if self.csv_path.as_os_str().is_empty() {
            return bad("csv_path must not be empty");
        }
        if self.csv_column.is_empty() {
            return bad("csv_column must not be empty");
        }
        if !self.csv_delimiter.is_ascii() {
            return bad("csv_delimiter must be a single ASCII character");
        }
        if self.output_path.as_os_str().is_empty() {
            return bad("output_path must not be empty");
        }
        if self.output_column.is_empty() {
            return bad("output_column must not be empty");
        }
        if self.row_group_size == 0 {
            return bad("row_group_size must be at least 1");
        }
        if self.workers == Some(0) {
            return bad("workers must be at least 1");
        }
        self.compression.resolve(self.compression_level)?;
        Ok(())
    }

    #[must_use]
    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            column: self.output_column.clone(),
            workers: self.workers,
            progress: self.progress,
        }
    }

    /// Non-ASCII delimiters fall back to `,`; [`validate`](Self::validate) rejects them.
    #[must_use]
    pub fn csv_options(&self) -> CsvOptions {
        CsvOptions {
            delimiter: u8::try_from(self.csv_delimiter).unwrap_or(b','),
        }
    }

    #[must_use]
    pub fn parquet_options(&self) -> ParquetOptions {
        ParquetOptions {
            compression: self.compression,
            level: self.compression_level,
            row_group_size: self.row_group_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = PipelineConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.csv_column, "TEXT");
        assert_eq!(c.output_column, "text");
        assert_eq!(c.compression_level, Some(3));
    }

    #[test]
    fn partial_json_keeps_defaults() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{ "csv_column": "BODY", "workers": 2, "word_split": "whitespace" }"#)?;
        let c = PipelineConfig::from_file(&path)?;
        assert_eq!(c.csv_column, "BODY");
        assert_eq!(c.workers, Some(2));
        assert_eq!(c.word_split, WordSplit::Whitespace);
        assert_eq!(c.output_path, PathBuf::from("mimic.parquet"));
        Ok(())
    }

    #[test]
    fn unknown_fields_are_config_errors() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{ "csv_colum": "BODY" }"#)?;
        let err = PipelineConfig::from_file(&path).unwrap_err();
        assert_eq!(
            crate::error::error_kind(&err),
            Some(crate::error::ErrorKind::Config)
        );
        Ok(())
    }

    #[test]
    fn save_then_load_is_identity() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("config.json");
        let c = PipelineConfig {
            compression: ParquetCompression::Gzip,
            compression_level: Some(6),
            metrics_path: Some(PathBuf::from("metrics.json")),
            ..PipelineConfig::default()
        };
        c.save(&path)?;
        assert_eq!(PipelineConfig::from_file(&path)?, c);
        Ok(())
    }

    #[test]
    fn validation_rejects_bad_values() {
        let cases = [
            PipelineConfig { csv_column: String::new(), ..Default::default() },
            PipelineConfig { output_column: String::new(), ..Default::default() },
            PipelineConfig { workers: Some(0), ..Default::default() },
            PipelineConfig { row_group_size: 0, ..Default::default() },
            PipelineConfig { csv_delimiter: 'é', ..Default::default() },
            PipelineConfig { compression_level: Some(99), ..Default::default() },
            PipelineConfig {
                compression: ParquetCompression::Snappy,
                ..Default::default()
            },
        ];
        for c in cases {
            assert!(c.validate().is_err(), "expected invalid: {c:?}");
        }
    }
}
