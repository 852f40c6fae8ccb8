//! Schema unification and vertical concatenation of two corpora.

use crate::error::PipelineError;
use crate::record::CorpusBatch;
use anyhow::Result;

/// Concatenate `primary` and `secondary` under `primary`'s column name.
///
/// All of `primary`'s records come first, in order, followed by all of
/// `secondary`'s records, in order. `secondary` is renamed regardless of its
/// original column name. Nothing is deduplicated, shuffled or sorted.
///
/// # Errors
/// [`PipelineError::Schema`] if either batch has an empty column name, which
/// would produce an unnamed output column.
pub fn unify(primary: CorpusBatch, secondary: CorpusBatch) -> Result<CorpusBatch> {
    for (role, batch) in [("primary", &primary), ("secondary", &secondary)] {
        if batch.column().is_empty() {
            return Err(PipelineError::Schema(format!("{role} corpus has an unnamed column")).into());
        }
    }
    let column = primary.column().to_string();
    if secondary.column() != column {
        tracing::debug!(from = secondary.column(), to = %column, "renaming secondary column");
    }

    let mut out = primary;
    out.extend(secondary.renamed(column));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_rows_come_first_under_primary_name() -> Result<()> {
        let a = CorpusBatch::from_texts("text", ["a b", "c d e"]);
        let b = CorpusBatch::from_texts("TEXT", ["x y", "z"]);
        let u = unify(a, b)?;
        assert_eq!(u.column(), "text");
        assert_eq!(u.texts().collect::<Vec<_>>(), vec!["a b", "c d e", "x y", "z"]);
        Ok(())
    }

    #[test]
    fn empty_sides_are_fine() -> Result<()> {
        let u = unify(
            CorpusBatch::new("text", vec![]),
            CorpusBatch::from_texts("body", ["only"]),
        )?;
        assert_eq!(u.len(), 1);
        assert_eq!(u.column(), "text");
        Ok(())
    }

    #[test]
    fn unnamed_column_is_rejected() {
        let err = unify(
            CorpusBatch::new("", vec![]),
            CorpusBatch::from_texts("TEXT", ["z"]),
        )
        .unwrap_err();
        assert_eq!(
            crate::error::error_kind(&err),
            Some(crate::error::ErrorKind::Schema)
        );
    }
}
