//! # corpus-unify
//!
//! Build a single-column text dataset from two heterogeneous corpora:
//!
//! - a **directory tree of report files** (e.g. `cxr_reports/**/*.txt`), read in
//!   parallel with per-file failure isolation
//! - a **large delimited export** (e.g. `NOTEEVENTS.csv`), from which exactly one
//!   column is streamed
//!
//! The two are concatenated (file corpus first) under one column name and
//! written as a compressed Parquet file for downstream training pipelines.
//!
//! ## Quick Start
//!
//! ```no_run
//! use corpus_unify::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let config = PipelineConfig {
//!     corpus_root: "cxr_reports".into(),
//!     csv_path: "NOTEEVENTS.csv".into(),
//!     output_path: "mimic.parquet".into(),
//!     ..PipelineConfig::default()
//! };
//! let summary = Pipeline::new(config).run()?;
//! println!("{} rows written", summary.rows_written.unwrap_or(0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Building Blocks
//!
//! Each stage is usable on its own:
//!
//! ```no_run
//! use corpus_unify::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let paths = enumerate_files("cxr_reports", "txt")?;
//! let files = ingest(&paths, read_text_file, &IngestOptions::default())?;
//! let notes = extract_column("NOTEEVENTS.csv", "TEXT", &CsvOptions::default())?;
//!
//! println!("{}", CorpusStatistics::compute(&files.batch, WordSplit::SingleSpace));
//!
//! let unified = unify(files.batch, notes)?;
//! write_dataset(&unified, "mimic.parquet", &ParquetOptions::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure Model
//!
//! - Unreadable or non-UTF-8 corpus files are logged and skipped
//!   ([`FileReadFailure`]).
//! - Everything else is fatal and carries an [`ErrorKind`] via
//!   [`PipelineError`]: bad configuration, a missing CSV or column, a malformed
//!   CSV, a schema violation, or a failed write.
//! - The output is replaced atomically, so a failed write never leaves a
//!   truncated file behind.
//!
//! ## Feature Flags
//!
//! - `compression-gzip`, `compression-zstd`, `compression-bzip2`,
//!   `compression-xz` - transparent decompression of the tabular input
//!
//! ## Module Overview
//!
//! - [`config`] - run configuration and validation
//! - [`record`] - `TextRecord` and `CorpusBatch`
//! - [`io`] - enumeration, file reading, CSV projection, Parquet I/O
//! - [`ingest`] - worker pool and parallel ingestion
//! - [`stats`] - record and word counts
//! - [`unify`] - schema unification
//! - [`pipeline`] - the end-to-end driver
//! - [`metrics`] - stage timings and counters
//! - [`testing`] - fixtures and assertions for tests

pub mod config;
pub mod error;
pub mod ingest;
pub mod io;
pub mod metrics;
pub mod pipeline;
pub mod record;
pub mod stats;
pub mod testing;
pub mod unify;

pub use config::PipelineConfig;
pub use error::{ErrorKind, FileReadCause, FileReadFailure, PipelineError, exit_code};
pub use ingest::{IngestOptions, Ingested, WorkerPool, ingest, ingest_on};
pub use io::csv::{CsvOptions, extract_column};
pub use io::glob::{enumerate_files, expand_glob};
pub use io::parquet::{
    ParquetCompression, ParquetOptions, ParquetSummary, inspect_parquet, read_dataset,
    write_dataset,
};
pub use io::text::read_text_file;
pub use metrics::MetricsCollector;
pub use pipeline::{Pipeline, RunSummary};
pub use record::{CorpusBatch, TextRecord};
pub use stats::{CorpusStatistics, WordSplit};
pub use unify::unify;
