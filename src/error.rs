//! Error taxonomy for the unification pipeline.
//!
//! Two classes of failure exist:
//!
//! - **Per-record recoverable** failures ([`FileReadFailure`]) are produced by the
//!   file reader, logged, and dropped by the ingestion coordinator. They never
//!   abort a run.
//! - **Per-stage fatal** failures ([`PipelineError`]) abort the run. They travel
//!   inside [`anyhow::Error`] so call sites can keep adding context, and the
//!   binary recovers the [`ErrorKind`] with `downcast_ref` to pick an exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single corpus file could not be turned into a record.
#[derive(Debug, Error)]
pub enum FileReadCause {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
}

/// A file that was enumerated but could not be read or decoded.
#[derive(Debug, Error)]
#[error("failed to read {}: {cause}", .path.display())]
pub struct FileReadFailure {
    pub path: PathBuf,
    #[source]
    pub cause: FileReadCause,
}

impl FileReadFailure {
    pub fn new(path: impl Into<PathBuf>, cause: impl Into<FileReadCause>) -> Self {
        Self {
            path: path.into(),
            cause: cause.into(),
        }
    }
}

/// Operational category of a fatal error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or inconsistent configuration, detected before any work starts.
    Config,
    /// The tabular input is missing, unreadable, or lacks the target column.
    Input,
    /// A batch violated the single-column schema contract.
    Schema,
    /// The output file could not be produced.
    Write,
}

impl ErrorKind {
    /// Process exit status for this kind. `1` is left for untyped failures.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Config => 2,
            ErrorKind::Input => 3,
            ErrorKind::Schema => 4,
            ErrorKind::Write => 5,
        }
    }
}

/// Fatal pipeline failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot read tabular input {}: {reason}", .path.display())]
    TabularInput { path: PathBuf, reason: String },

    #[error("column {column:?} not found in {} (available: {})", .path.display(), .available.join(", "))]
    MissingColumn {
        path: PathBuf,
        column: String,
        available: Vec<String>,
    },

    #[error("schema violation: {0}")]
    Schema(String),

    #[error("cannot write {}: {reason}", .path.display())]
    Write { path: PathBuf, reason: String },
}

impl PipelineError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Config(_) => ErrorKind::Config,
            PipelineError::TabularInput { .. } | PipelineError::MissingColumn { .. } => {
                ErrorKind::Input
            }
            PipelineError::Schema(_) => ErrorKind::Schema,
            PipelineError::Write { .. } => ErrorKind::Write,
        }
    }
}

/// Find the [`ErrorKind`] of the first [`PipelineError`] in an error chain.
#[must_use]
pub fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    err.chain()
        .find_map(|e| e.downcast_ref::<PipelineError>())
        .map(PipelineError::kind)
}

/// Exit status for a fatal error; `1` when no typed kind is attached.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    error_kind(err).map_or(1, ErrorKind::exit_code)
}
