//! Text records and single-column corpus batches.
//!
//! A [`CorpusBatch`] is an ordered sequence of [`TextRecord`]s that all live under
//! one column name. The single-column invariant is structural: a batch cannot
//! hold more than one column, and conversion from an Arrow [`RecordBatch`]
//! refuses anything that is not exactly one string column.

use crate::error::PipelineError;
use anyhow::{Context, Result};
use arrow::array::{Array, LargeStringArray, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One unit of text. Provenance is not retained.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRecord {
    pub text: String,
}

impl TextRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl From<String> for TextRecord {
    fn from(text: String) -> Self {
        Self { text }
    }
}

impl From<&str> for TextRecord {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Ordered records sharing one column name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusBatch {
    column: String,
    records: Vec<TextRecord>,
}

impl CorpusBatch {
    pub fn new(column: impl Into<String>, records: Vec<TextRecord>) -> Self {
        Self {
            column: column.into(),
            records,
        }
    }

    /// Build a batch from plain strings.
    pub fn from_texts<I, S>(column: impl Into<String>, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(column, texts.into_iter().map(TextRecord::new).collect())
    }

    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    #[must_use]
    pub fn records(&self) -> &[TextRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.text.as_str())
    }

    /// Same records under a different column name.
    #[must_use]
    pub fn renamed(self, column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            records: self.records,
        }
    }

    pub fn into_records(self) -> Vec<TextRecord> {
        self.records
    }

    /// Arrow schema for this batch: one non-null `LargeUtf8` field.
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        Arc::new(Schema::new(vec![Field::new(
            &self.column,
            DataType::LargeUtf8,
            false,
        )]))
    }

    /// Convert rows `[start, end)` into an Arrow [`RecordBatch`].
    ///
    /// # Errors
    /// Returns an error if the range is out of bounds or Arrow rejects the batch.
    pub fn to_record_batch(&self, start: usize, end: usize) -> Result<RecordBatch> {
        let slice = self.records.get(start..end).with_context(|| {
            format!("row range {start}..{end} out of bounds for {} rows", self.len())
        })?;
        let array = LargeStringArray::from_iter_values(slice.iter().map(|r| r.text.as_str()));
        RecordBatch::try_new(self.schema(), vec![Arc::new(array)])
            .context("build RecordBatch from text column")
    }

    /// Convert an Arrow batch with exactly one string column into a `CorpusBatch`.
    ///
    /// Null values become empty strings.
    ///
    /// # Errors
    /// [`PipelineError::Schema`] if the batch has more or fewer than one column,
    /// or if that column is not `Utf8`/`LargeUtf8`.
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Self> {
        let schema = batch.schema();
        if schema.fields().len() != 1 {
            return Err(PipelineError::Schema(format!(
                "expected exactly one column, found {}",
                schema.fields().len()
            ))
            .into());
        }
        let field = schema.field(0);
        let column = batch.column(0);
        let records: Vec<TextRecord> = match field.data_type() {
            DataType::LargeUtf8 => {
                let arr = column
                    .as_any()
                    .downcast_ref::<LargeStringArray>()
                    .context("downcast LargeUtf8 column")?;
                collect_strings(arr.iter())
            }
            DataType::Utf8 => {
                let arr = column
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .context("downcast Utf8 column")?;
                collect_strings(arr.iter())
            }
            other => {
                return Err(PipelineError::Schema(format!(
                    "column {:?} has type {other}, expected a string column",
                    field.name()
                ))
                .into());
            }
        };
        Ok(Self::new(field.name().clone(), records))
    }

    /// Append another batch's records. Column names must already agree.
    pub(crate) fn extend(&mut self, other: CorpusBatch) {
        debug_assert_eq!(self.column, other.column);
        self.records.extend(other.records);
    }
}

fn collect_strings<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<TextRecord> {
    values
        .map(|v| TextRecord::new(v.unwrap_or_default()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;

    #[test]
    fn record_batch_slice_keeps_order_and_name() -> Result<()> {
        let batch = CorpusBatch::from_texts("text", ["a", "b", "c"]);
        let rb = batch.to_record_batch(1, 3)?;
        assert_eq!(rb.num_rows(), 2);
        assert_eq!(rb.schema().field(0).name(), "text");

        let back = CorpusBatch::from_record_batch(&rb)?;
        assert_eq!(back.texts().collect::<Vec<_>>(), vec!["b", "c"]);
        Ok(())
    }

    #[test]
    fn out_of_range_slice_is_an_error() {
        let batch = CorpusBatch::from_texts("text", ["a"]);
        assert!(batch.to_record_batch(0, 2).is_err());
    }

    #[test]
    fn two_column_batch_is_rejected() -> Result<()> {
        let schema = Arc::new(Schema::new(vec![
            Field::new("text", DataType::Utf8, false),
            Field::new("id", DataType::Int64, false),
        ]));
        let rb = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["x"])),
                Arc::new(Int64Array::from(vec![1])),
            ],
        )?;
        let err = CorpusBatch::from_record_batch(&rb).unwrap_err();
        assert_eq!(
            crate::error::error_kind(&err),
            Some(crate::error::ErrorKind::Schema)
        );
        Ok(())
    }

    #[test]
    fn non_string_column_is_rejected() -> Result<()> {
        let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::Int64, false)]));
        let rb = RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![7]))])?;
        assert!(CorpusBatch::from_record_batch(&rb).is_err());
        Ok(())
    }

    #[test]
    fn renamed_keeps_records() {
        let b = CorpusBatch::from_texts("TEXT", ["x y"]).renamed("text");
        assert_eq!(b.column(), "text");
        assert_eq!(b.records()[0].text, "x y");
    }
}
