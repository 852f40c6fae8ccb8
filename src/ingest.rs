//! Parallel ingestion of corpus files.
//!
//! [`WorkerPool`] owns a dedicated Rayon pool of a fixed size. Work submitted
//! through [`WorkerPool::map_collect`] is fanned out across the workers and the
//! call blocks until every item has been processed; that call is the join
//! point. Each worker touches a distinct input, and results flow back through
//! the pool's own collection, so no shared mutable state is needed.
//!
//! [`ingest`] drives a file reader over a list of paths on such a pool. Read
//! failures are dropped from the batch and returned separately for reporting;
//! they never abort ingestion.

use crate::error::FileReadFailure;
use crate::record::{CorpusBatch, TextRecord};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::path::{Path, PathBuf};

/// Fixed-size worker pool used for file ingestion.
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    /// Build a pool with `workers` threads, or one per logical CPU when `None`.
    ///
    /// # Errors
    /// Returns an error if the OS refuses to spawn the worker threads.
    pub fn new(workers: Option<usize>) -> Result<Self> {
        let n = workers.unwrap_or_else(num_cpus::get).max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(n)
            .thread_name(|i| format!("ingest-{i}"))
            .build()
            .with_context(|| format!("build worker pool with {n} threads"))?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Apply `f` to every item on the pool and return the results in input order.
    ///
    /// Blocks the caller until all items are done.
    pub fn map_collect<I, O, F>(&self, items: &[I], f: F) -> Vec<O>
    where
        I: Sync,
        O: Send,
        F: Fn(&I) -> O + Sync + Send,
    {
        self.pool.install(|| items.par_iter().map(|item| f(item)).collect())
    }
}

/// Knobs for [`ingest`].
#[derive(Clone, Debug)]
pub struct IngestOptions {
    /// Column name of the produced batch.
    pub column: String,
    /// Worker count; `None` means one per logical CPU.
    pub workers: Option<usize>,
    /// Draw a progress bar on stderr.
    pub progress: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            column: "text".to_string(),
            workers: None,
            progress: false,
        }
    }
}

/// Result of an ingestion run.
#[derive(Debug)]
pub struct Ingested {
    /// Successfully read records, in input path order.
    pub batch: CorpusBatch,
    /// Files that could not be read, in input path order.
    pub failures: Vec<FileReadFailure>,
}

impl Ingested {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.batch.len() + self.failures.len()
    }
}

fn progress_bar(total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta} @ {per_sec}) {msg}")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message("reading corpus files");
    pb
}

/// Read every path with `reader` on a fresh [`WorkerPool`].
///
/// The returned batch keeps input order; `failures` collects every path the
/// reader rejected. `batch.len() + failures.len() == paths.len()` always holds.
///
/// # Errors
/// Only pool construction can fail; individual reads never do.
pub fn ingest<R>(paths: &[PathBuf], reader: R, options: &IngestOptions) -> Result<Ingested>
where
    R: Fn(&Path) -> Result<TextRecord, FileReadFailure> + Sync + Send,
{
    let pool = WorkerPool::new(options.workers)?;
    Ok(ingest_on(&pool, paths, reader, options))
}

/// Same as [`ingest`] but on a caller-provided pool.
pub fn ingest_on<R>(
    pool: &WorkerPool,
    paths: &[PathBuf],
    reader: R,
    options: &IngestOptions,
) -> Ingested
where
    R: Fn(&Path) -> Result<TextRecord, FileReadFailure> + Sync + Send,
{
    tracing::info!(files = paths.len(), workers = pool.workers(), "ingesting corpus files");
    let pb = progress_bar(paths.len(), options.progress);

    let results = pool.map_collect(paths, |path| {
        let r = reader(path.as_path());
        pb.inc(1);
        r
    });
    pb.finish_and_clear();

    let mut records = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for r in results {
        match r {
            Ok(rec) => records.push(rec),
            Err(f) => failures.push(f),
        }
    }
    if !failures.is_empty() {
        tracing::warn!(failed = failures.len(), total = paths.len(), "some corpus files were skipped");
    }

    Ingested {
        batch: CorpusBatch::new(options.column.clone(), records),
        failures,
    }
}
