//! corpus-unify CLI
//!
//! Merge a report tree and a CSV text column into one Parquet corpus.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use corpus_unify::{
    CorpusStatistics, ParquetCompression, Pipeline, PipelineConfig, WordSplit, exit_code,
    inspect_parquet, read_dataset,
};

#[derive(Parser)]
#[command(name = "corpus-unify")]
#[command(about = "Merge a report tree and a CSV text column into one Parquet corpus", long_about = None)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Per-field overrides applied on top of the configuration file.
#[derive(Args)]
struct Overrides {
    /// Root directory of the report corpus
    #[arg(long, global = true)]
    corpus_root: Option<PathBuf>,

    /// Extension of report files
    #[arg(long, global = true)]
    extension: Option<String>,

    /// Tabular input (CSV, optionally compressed)
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Text column of the tabular input
    #[arg(long, global = true)]
    column: Option<String>,

    /// CSV field delimiter
    #[arg(long, global = true)]
    delimiter: Option<char>,

    /// Output Parquet file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Column name of the unified output
    #[arg(long, global = true)]
    output_column: Option<String>,

    /// Output compression codec
    #[arg(long, global = true)]
    compression: Option<ParquetCompression>,

    /// Compression level for the codec
    #[arg(long, global = true, allow_negative_numbers = true)]
    level: Option<i32>,

    /// Rows per Parquet row group
    #[arg(long, global = true)]
    row_group_size: Option<usize>,

    /// Number of ingestion workers (default: logical CPUs)
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    /// Word counting rule: single-space or whitespace
    #[arg(long, global = true)]
    word_split: Option<WordSplit>,

    /// Run the file and tabular pipelines concurrently
    #[arg(long, global = true)]
    concurrent: bool,

    /// Disable the progress bar
    #[arg(long, global = true)]
    no_progress: bool,

    /// Save run metrics as JSON to this path
    #[arg(long, global = true)]
    metrics: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and write the unified corpus (default if no command specified)
    Run,

    /// Compute and print statistics without writing output
    Stats,

    /// Read an output file back and print its shape and statistics
    Inspect {
        /// Parquet file to inspect
        path: PathBuf,
    },

    /// Write the default configuration as JSON
    GenerateConfig {
        /// Where to write the configuration file
        #[arg(default_value = "corpus-unify.json")]
        path: PathBuf,
    },
}

impl Overrides {
    fn apply(self, config: &mut PipelineConfig) {
        if let Some(v) = self.corpus_root {
            config.corpus_root = v;
        }
        if let Some(v) = self.extension {
            config.file_extension = v;
        }
        if let Some(v) = self.csv {
            config.csv_path = v;
        }
        if let Some(v) = self.column {
            config.csv_column = v;
        }
        if let Some(v) = self.delimiter {
            config.csv_delimiter = v;
        }
        if let Some(v) = self.output {
            config.output_path = v;
        }
        if let Some(v) = self.output_column {
            config.output_column = v;
        }
        if let Some(v) = self.compression {
            config.compression = v;
            // A level tuned for the old codec rarely fits the new one.
            config.compression_level = None;
        }
        if let Some(v) = self.level {
            config.compression_level = Some(v);
        }
        if let Some(v) = self.row_group_size {
            config.row_group_size = v;
        }
        if let Some(v) = self.workers {
            config.workers = Some(v);
        }
        if let Some(v) = self.word_split {
            config.word_split = v;
        }
        if self.concurrent {
            config.concurrent_corpora = true;
        }
        if self.no_progress {
            config.progress = false;
        }
        if let Some(v) = self.metrics {
            config.metrics_path = Some(v);
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            let code = u8::try_from(exit_code(&err)).unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    cli.overrides.apply(&mut config);

    match cli.command {
        None | Some(Commands::Run) => run_command(config),
        Some(Commands::Stats) => stats_command(config),
        Some(Commands::Inspect { path }) => inspect_command(&path, config.word_split),
        Some(Commands::GenerateConfig { path }) => generate_config_command(&path),
    }
}

fn run_command(config: PipelineConfig) -> Result<()> {
    tracing::info!(?config, "starting corpus-unify");
    let pipeline = Pipeline::new(config);
    let summary = pipeline.run()?;
    if summary.files_failed > 0 {
        tracing::warn!(
            failed = summary.files_failed,
            found = summary.files_found,
            "some report files were skipped"
        );
    }
    pipeline.metrics().print();
    Ok(())
}

fn stats_command(config: PipelineConfig) -> Result<()> {
    let pipeline = Pipeline::new(config);
    pipeline.stats_only()?;
    pipeline.metrics().print();
    Ok(())
}

fn inspect_command(path: &Path, split: WordSplit) -> Result<()> {
    let summary = inspect_parquet(path)?;
    let dataset = read_dataset(path)?;
    let stats = CorpusStatistics::compute(&dataset, split);

    println!("File: {}", summary.path.display());
    println!("Columns: {}", summary.columns.join(", "));
    println!("Row groups: {}", summary.row_groups);
    println!(
        "Compression: {}",
        summary.compression.as_deref().unwrap_or("n/a")
    );
    println!("Total number of rows: {}", stats.record_count);
    println!("Total number of words: {}", stats.word_count);
    Ok(())
}

fn generate_config_command(path: &Path) -> Result<()> {
    PipelineConfig::default().save(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
