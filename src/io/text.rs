//! Whole-file text reading with per-file failure isolation.

use crate::error::FileReadFailure;
use crate::record::TextRecord;
use std::fs;
use std::path::Path;

/// Read a file as strict UTF-8 into a [`TextRecord`].
///
/// Invalid UTF-8 is a failure, not replaced. Failures are returned as values
/// and logged at `warn`; they are never propagated as errors of the run.
pub fn read_text_file(path: &Path) -> Result<TextRecord, FileReadFailure> {
    let outcome = fs::read(path)
        .map_err(|e| FileReadFailure::new(path, e))
        .and_then(|bytes| String::from_utf8(bytes).map_err(|e| FileReadFailure::new(path, e)));
    match outcome {
        Ok(text) => Ok(TextRecord::from(text)),
        Err(failure) => {
            tracing::warn!(path = %path.display(), cause = %failure.cause, "skipping unreadable file");
            Err(failure)
        }
    }
}
