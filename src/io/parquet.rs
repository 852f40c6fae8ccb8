//! Parquet persistence for unified corpora.
//!
//! This module provides:
//! - [`write_dataset`]: serialize a [`CorpusBatch`] into one compressed Parquet
//!   file, replacing any previous file atomically
//! - [`read_dataset`]: read an output file back into a [`CorpusBatch`]
//! - [`inspect_parquet`]: footer-only summary used by the `inspect` command
//!
//! The text column is written as Arrow `LargeUtf8`, in row groups of
//! [`ParquetOptions::row_group_size`] rows.
//!
//! # Failure behavior
//! Rows are written to a temporary file next to the destination. The
//! destination is replaced only after the footer is written and synced, so a
//! failed run leaves the previous output (if any) intact and no partial file
//! behind.

use crate::error::PipelineError;
use crate::record::CorpusBatch;
use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::basic::{BrotliLevel, Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;

/// Column compression codec for the output file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParquetCompression {
    Uncompressed,
    Snappy,
    Gzip,
    Lz4,
    #[default]
    Zstd,
    Brotli,
}

impl ParquetCompression {
    /// Map this codec and an optional level onto Parquet's compression setting.
    ///
    /// Levels: zstd 1..=22, gzip 0..=9, brotli 0..=11. Codecs without levels
    /// reject `Some(_)`. `None` selects the codec's default level.
    ///
    /// # Errors
    /// [`PipelineError::Config`] for an out-of-range or unsupported level.
    pub fn resolve(self, level: Option<i32>) -> Result<Compression, PipelineError> {
        let bad_level = |l: i32, e: &dyn fmt::Display| {
            PipelineError::Config(format!("invalid {self} compression level {l}: {e}"))
        };
        let unsigned = |l: i32| {
            u32::try_from(l).map_err(|e| bad_level(l, &e))
        };
        match (self, level) {
            (ParquetCompression::Zstd, None) => Ok(Compression::ZSTD(ZstdLevel::default())),
            (ParquetCompression::Zstd, Some(l)) => ZstdLevel::try_new(l)
                .map(Compression::ZSTD)
                .map_err(|e| bad_level(l, &e)),
            (ParquetCompression::Gzip, None) => Ok(Compression::GZIP(GzipLevel::default())),
            (ParquetCompression::Gzip, Some(l)) => GzipLevel::try_new(unsigned(l)?)
                .map(Compression::GZIP)
                .map_err(|e| bad_level(l, &e)),
            (ParquetCompression::Brotli, None) => Ok(Compression::BROTLI(BrotliLevel::default())),
            (ParquetCompression::Brotli, Some(l)) => BrotliLevel::try_new(unsigned(l)?)
                .map(Compression::BROTLI)
                .map_err(|e| bad_level(l, &e)),
            (ParquetCompression::Uncompressed, None) => Ok(Compression::UNCOMPRESSED),
            (ParquetCompression::Snappy, None) => Ok(Compression::SNAPPY),
            (ParquetCompression::Lz4, None) => Ok(Compression::LZ4_RAW),
            (codec, Some(l)) => Err(PipelineError::Config(format!(
                "{codec} compression does not take a level (got {l})"
            ))),
        }
    }
}

impl fmt::Display for ParquetCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParquetCompression::Uncompressed => "uncompressed",
            ParquetCompression::Snappy => "snappy",
            ParquetCompression::Gzip => "gzip",
            ParquetCompression::Lz4 => "lz4",
            ParquetCompression::Zstd => "zstd",
            ParquetCompression::Brotli => "brotli",
        };
        f.write_str(s)
    }
}

impl FromStr for ParquetCompression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uncompressed" | "none" => Ok(ParquetCompression::Uncompressed),
            "snappy" => Ok(ParquetCompression::Snappy),
            "gzip" => Ok(ParquetCompression::Gzip),
            "lz4" => Ok(ParquetCompression::Lz4),
            "zstd" => Ok(ParquetCompression::Zstd),
            "brotli" => Ok(ParquetCompression::Brotli),
            other => Err(format!("unknown compression codec {other:?}")),
        }
    }
}

/// Output file settings.
#[derive(Clone, Copy, Debug)]
pub struct ParquetOptions {
    pub compression: ParquetCompression,
    pub level: Option<i32>,
    /// Rows per row group (and per Arrow batch handed to the writer).
    pub row_group_size: usize,
}

impl Default for ParquetOptions {
    fn default() -> Self {
        Self {
            compression: ParquetCompression::Zstd,
            level: Some(3),
            row_group_size: 64 * 1024,
        }
    }
}

fn write_error(path: &Path, e: impl fmt::Display) -> PipelineError {
    PipelineError::Write {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// Temp file beside the destination, created with the mode `File::create` would use.
#[cfg(unix)]
fn output_tempfile(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    // 0o666 is masked by the process umask at open time.
    tempfile::Builder::new()
        .prefix(".corpus-unify")
        .permissions(Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn output_tempfile(dir: &Path) -> std::io::Result<NamedTempFile> {
    tempfile::Builder::new()
        .prefix(".corpus-unify")
        .tempfile_in(dir)
}

/// Write `dataset` to `path` as a single-column Parquet file.
///
/// Parent directories are created. An existing file at `path` is replaced
/// without confirmation, but only once the new file is complete.
///
/// # Returns
/// Number of rows written (`dataset.len()`).
///
/// # Errors
/// [`PipelineError::Config`] for an invalid compression level, and
/// [`PipelineError::Write`] for any I/O or encoding failure.
pub fn write_dataset(
    dataset: &CorpusBatch,
    path: impl AsRef<Path>,
    options: &ParquetOptions,
) -> Result<usize> {
    let path = path.as_ref();
    let compression = options.compression.resolve(options.level)?;

    let dir: PathBuf = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            create_dir_all(parent)
                .map_err(|e| write_error(path, e))
                .with_context(|| format!("mkdir -p {}", parent.display()))?;
            parent.to_path_buf()
        }
        _ => PathBuf::from("."),
    };
    let mut tmp = output_tempfile(&dir)
        .map_err(|e| write_error(path, e))
        .with_context(|| format!("create temporary file in {}", dir.display()))?;

    let rows_per_group = options.row_group_size.max(1);
    let props = WriterProperties::builder()
        .set_compression(compression)
        .set_max_row_group_size(rows_per_group)
        .build();
    {
        let mut writer = ArrowWriter::try_new(tmp.as_file_mut(), dataset.schema(), Some(props))
            .map_err(|e| write_error(path, e))
            .context("create ArrowWriter")?;

        let total = dataset.len();
        let mut start = 0usize;
        while start < total {
            let end = (start + rows_per_group).min(total);
            let batch: RecordBatch = dataset.to_record_batch(start, end)?;
            writer
                .write(&batch)
                .map_err(|e| write_error(path, e))
                .with_context(|| format!("write rows {start}..{end}"))?;
            start = end;
        }
        writer
            .close()
            .map_err(|e| write_error(path, e))
            .context("close ArrowWriter")?;
    }

    tmp.as_file()
        .sync_all()
        .map_err(|e| write_error(path, e))
        .context("sync output")?;
    // Dropping the temp file on any error above removes it.
    tmp.persist(path)
        .map_err(|e| write_error(path, e.error))
        .with_context(|| format!("replace {}", path.display()))?;

    tracing::debug!(path = %path.display(), rows = dataset.len(), %compression, "dataset written");
    Ok(dataset.len())
}

/// Read a single-column text Parquet file into a [`CorpusBatch`].
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded, and
/// [`PipelineError::Schema`] if it does not hold exactly one string column.
pub fn read_dataset(path: impl AsRef<Path>) -> Result<CorpusBatch> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;

    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("open ParquetRecordBatchReader")?;
    let schema = builder.schema().clone();
    let mut reader = builder
        .with_batch_size(64 * 1024)
        .build()
        .context("build ParquetRecordBatchReader")?;

    // Validates the schema even when the file has no rows.
    let mut out = CorpusBatch::from_record_batch(&RecordBatch::new_empty(schema))
        .with_context(|| format!("schema of {}", path.display()))?;
    while let Some(batch) = reader.next().transpose().context("read next batch")? {
        out.extend(CorpusBatch::from_record_batch(&batch)?);
    }
    Ok(out)
}

/// Footer-level facts about an output file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParquetSummary {
    pub path: PathBuf,
    pub columns: Vec<String>,
    pub rows: u64,
    pub row_groups: usize,
    /// Codec of the first column chunk, if any row group exists.
    pub compression: Option<String>,
}

/// Summarize a Parquet file from its footer without decoding any pages.
///
/// # Errors
/// Returns an error if the file cannot be opened or its metadata is invalid.
pub fn inspect_parquet(path: impl AsRef<Path>) -> Result<ParquetSummary> {
    let path = path.as_ref().to_path_buf();
    let f = File::open(&path).with_context(|| format!("open {}", path.display()))?;
    let reader = SerializedFileReader::new(f).context("open SerializedFileReader")?;
    let meta = reader.metadata();

    let columns = meta
        .file_metadata()
        .schema_descr()
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    let row_groups = meta.num_row_groups();
    let rows: u64 = (0..row_groups)
        .map(|i| meta.row_group(i).num_rows().cast_unsigned())
        .sum();
    let compression = (row_groups > 0 && meta.row_group(0).num_columns() > 0)
        .then(|| meta.row_group(0).column(0).compression().to_string());

    Ok(ParquetSummary {
        path,
        columns,
        rows,
        row_groups,
        compression,
    })
}
