//! Single-column projection from a large delimited file.
//!
//! The extractor streams the file record by record and keeps only the target
//! field, so the working set is one column wide no matter how many columns the
//! export carries. Quoted fields may span lines, as clinical note exports do.
//!
//! Unlike corpus files, every problem here is fatal: a missing file, a missing
//! column, a ragged row or invalid UTF-8 aborts extraction with a
//! [`PipelineError`].

use crate::error::PipelineError;
use crate::io::compression::auto_detect_reader;
use crate::record::{CorpusBatch, TextRecord};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::Path;

/// Parsing options for the tabular input.
#[derive(Clone, Copy, Debug)]
pub struct CsvOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Read every row of `column` from the CSV at `path`, in file order.
///
/// The first row must be a header. The resulting batch is named after the
/// source column and has exactly as many records as the file has data rows.
/// Empty cells, quoted or not, become empty-string records; there is no null.
/// Each one counts as one word under [`WordSplit::SingleSpace`](crate::stats::WordSplit).
///
/// **Compression**: gzip, zstd, bzip2 and xz inputs are decoded transparently
/// (see [`crate::io::compression`]).
///
/// # Errors
/// - [`PipelineError::TabularInput`] if the file cannot be opened or a row
///   cannot be parsed.
/// - [`PipelineError::MissingColumn`] if no header equals `column` exactly.
pub fn extract_column(
    path: impl AsRef<Path>,
    column: &str,
    options: &CsvOptions,
) -> Result<CorpusBatch> {
    let path = path.as_ref();
    let input_error = |reason: String| PipelineError::TabularInput {
        path: path.to_path_buf(),
        reason,
    };

    let f = File::open(path)
        .map_err(|e| input_error(e.to_string()))
        .with_context(|| format!("open {}", path.display()))?;
    let rdr = auto_detect_reader(f, path)
        .map_err(|e| input_error(format!("{e:#}")))
        .with_context(|| format!("setup decompression for {}", path.display()))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter)
        .from_reader(rdr);

    let headers = rdr
        .headers()
        .map_err(|e| input_error(e.to_string()))
        .with_context(|| format!("read header row of {}", path.display()))?
        .clone();
    let idx = column_index(&headers, column).ok_or_else(|| PipelineError::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_string(),
        available: headers.iter().map(str::to_string).collect(),
    })?;

    let mut out = Vec::<TextRecord>::new();
    let mut rec = StringRecord::new();
    let mut row = 0usize;
    loop {
        let more = rdr
            .read_record(&mut rec)
            .map_err(|e| input_error(e.to_string()))
            .with_context(|| format!("parse CSV record #{}", row + 1))?;
        if !more {
            break;
        }
        // Non-flexible readers reject ragged rows, so the index is in range.
        let field = rec.get(idx).unwrap_or_default();
        out.push(TextRecord::new(field));
        row += 1;
    }

    tracing::debug!(path = %path.display(), column, rows = out.len(), "column extracted");
    Ok(CorpusBatch::new(column, out))
}

fn column_index(headers: &StringRecord, column: &str) -> Option<usize> {
    headers.iter().position(|h| h == column)
}
