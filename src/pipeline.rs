//! The unification pipeline driver.
//!
//! Stages, in order:
//!
//! 1. enumerate corpus files, ingest them in parallel, compute statistics
//! 2. extract the text column of the tabular input, compute statistics
//! 3. unify both batches under the file corpus's column name
//! 4. write the unified dataset as Parquet
//!
//! Stages 1 and 2 share no data. By default they run one after the other; with
//! [`PipelineConfig::concurrent_corpora`] they run as two joined tasks. Either
//! way, file-corpus rows precede tabular rows in the output.

use crate::config::PipelineConfig;
use crate::ingest::{Ingested, ingest};
use crate::io::csv::extract_column;
use crate::io::glob::enumerate_files;
use crate::io::parquet::write_dataset;
use crate::io::text::read_text_file;
use crate::metrics::MetricsCollector;
use crate::record::CorpusBatch;
use crate::stats::CorpusStatistics;
use crate::unify::unify;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

/// What a run produced, for printing and tests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files_found: usize,
    pub files_failed: usize,
    pub file_stats: CorpusStatistics,
    pub tabular_stats: CorpusStatistics,
    pub combined_stats: CorpusStatistics,
    /// Rows written to `output_path`; `None` when nothing was written.
    pub rows_written: Option<usize>,
    pub output_path: Option<PathBuf>,
}

/// Output of the file-corpus stage.
struct FileCorpus {
    files_found: usize,
    ingested: Ingested,
    stats: CorpusStatistics,
}

/// Output of the tabular stage.
struct TabularCorpus {
    batch: CorpusBatch,
    stats: CorpusStatistics,
}

/// Configured pipeline. Cheap to build; all work happens in [`Pipeline::run`].
pub struct Pipeline {
    config: PipelineConfig,
    metrics: MetricsCollector,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            metrics: MetricsCollector::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Full run: build the unified dataset and write it to `output_path`.
    ///
    /// # Errors
    /// Any fatal stage error (configuration, tabular input, schema, write).
    /// Per-file read failures are not errors.
    pub fn run(&self) -> Result<RunSummary> {
        let (unified, mut summary) = self.build_dataset()?;

        let output = &self.config.output_path;
        println!("\nSaving to {}...", output.display());
        let rows = self
            .metrics
            .time_stage("write", || {
                write_dataset(&unified, output, &self.config.parquet_options())
            })
            .with_context(|| format!("write unified dataset to {}", output.display()))?;
        self.metrics.record("rows_written", rows);
        println!("Done!");

        summary.rows_written = Some(rows);
        summary.output_path = Some(output.clone());
        self.finish()?;
        Ok(summary)
    }

    /// Everything except the write: statistics only.
    ///
    /// # Errors
    /// Same as [`run`](Self::run), minus write failures.
    pub fn stats_only(&self) -> Result<RunSummary> {
        let (_, summary) = self.build_dataset()?;
        self.finish()?;
        Ok(summary)
    }

    /// Run stages 1-3 and return the unified batch.
    ///
    /// # Errors
    /// Configuration, tabular input and schema errors.
    pub fn build_dataset(&self) -> Result<(CorpusBatch, RunSummary)> {
        self.config.validate()?;
        self.metrics.start();

        let (files, tabular) = if self.config.concurrent_corpora {
            let (files, tabular) =
                rayon::join(|| self.file_corpus(), || self.tabular_corpus());
            let (files, tabular) = (files?, tabular?);
            print_file_stats(&files);
            print_tabular_stats(&tabular);
            (files, tabular)
        } else {
            let files = self.file_corpus()?;
            print_file_stats(&files);
            let tabular = self.tabular_corpus()?;
            print_tabular_stats(&tabular);
            (files, tabular)
        };

        println!("\nCombining datasets...");
        let file_stats = files.stats;
        let files_failed = files.ingested.failures.len();
        let unified = self
            .metrics
            .time_stage("unify", || unify(files.ingested.batch, tabular.batch))
            .context("unify corpora")?;
        let combined_stats = CorpusStatistics::compute(&unified, self.config.word_split);
        debug_assert_eq!(combined_stats, file_stats + tabular.stats);

        println!("\nCombined Statistics:");
        println!("Total number of rows: {}", combined_stats.record_count);
        println!("Total number of words: {}", combined_stats.word_count);
        self.metrics.record("unified_rows", combined_stats.record_count);
        self.metrics.record("unified_words", combined_stats.word_count);

        let summary = RunSummary {
            files_found: files.files_found,
            files_failed,
            file_stats,
            tabular_stats: tabular.stats,
            combined_stats,
            rows_written: None,
            output_path: None,
        };
        Ok((unified, summary))
    }

    fn file_corpus(&self) -> Result<FileCorpus> {
        let c = &self.config;
        tracing::info!(root = %c.corpus_root.display(), extension = %c.file_extension, "finding corpus files");
        let paths = self
            .metrics
            .time_stage("enumerate", || enumerate_files(&c.corpus_root, &c.file_extension))?;
        self.metrics.record("files_found", paths.len());

        let ingested = self
            .metrics
            .time_stage("ingest", || ingest(&paths, read_text_file, &c.ingest_options()))?;
        for failure in &ingested.failures {
            tracing::debug!(%failure, "excluded from corpus");
        }
        let stats = CorpusStatistics::compute(&ingested.batch, c.word_split);
        self.metrics.record("files_failed", ingested.failures.len());
        self.metrics.record("file_records", stats.record_count);
        self.metrics.record("file_words", stats.word_count);

        Ok(FileCorpus {
            files_found: paths.len(),
            ingested,
            stats,
        })
    }

    fn tabular_corpus(&self) -> Result<TabularCorpus> {
        let c = &self.config;
        tracing::info!(path = %c.csv_path.display(), column = %c.csv_column, "extracting tabular column");
        let batch = self
            .metrics
            .time_stage("extract", || {
                extract_column(&c.csv_path, &c.csv_column, &c.csv_options())
            })
            .with_context(|| format!("extract column {:?}", c.csv_column))?;
        let stats = CorpusStatistics::compute(&batch, c.word_split);
        self.metrics.record("tabular_rows", stats.record_count);
        self.metrics.record("tabular_words", stats.word_count);
        Ok(TabularCorpus { batch, stats })
    }

    fn finish(&self) -> Result<()> {
        self.metrics.end();
        if let Some(path) = &self.config.metrics_path {
            self.metrics
                .save_to_file(path)
                .with_context(|| format!("save metrics to {}", path.display()))?;
        }
        Ok(())
    }
}

fn print_file_stats(files: &FileCorpus) {
    println!("\nFile Corpus Statistics:");
    println!("Total number of files found: {}", files.files_found);
    println!("Total number of files processed: {}", files.stats.record_count);
    println!("Total number of words: {}", files.stats.word_count);
}

fn print_tabular_stats(tabular: &TabularCorpus) {
    println!("\nTabular Corpus Statistics:");
    println!("Total number of rows: {}", tabular.stats.record_count);
    println!("Total number of words: {}", tabular.stats.word_count);
}
