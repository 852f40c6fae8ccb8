//! Assertion functions for corpus batches.

use crate::record::CorpusBatch;

/// Assert that a batch holds exactly `expected`, in order.
///
/// # Panics
///
/// Panics if the lengths differ or any record differs.
///
/// # Example
///
/// ```
/// use corpus_unify::record::CorpusBatch;
/// use corpus_unify::testing::assert_texts_equal;
///
/// let b = CorpusBatch::from_texts("text", ["a", "b"]);
/// assert_texts_equal(&b, &["a", "b"]);
/// ```
pub fn assert_texts_equal(batch: &CorpusBatch, expected: &[&str]) {
    let actual: Vec<&str> = batch.texts().collect();
    assert_eq!(
        actual.len(),
        expected.len(),
        "Batch length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(
            a, e,
            "Batch mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}"
        );
    }
}

/// Assert that `batch` holds the same texts as `expected`, ignoring order.
///
/// # Panics
///
/// Panics if the multisets of texts differ.
pub fn assert_texts_unordered_equal(batch: &CorpusBatch, expected: &[&str]) {
    let mut actual: Vec<&str> = batch.texts().collect();
    let mut expected = expected.to_vec();
    actual.sort_unstable();
    expected.sort_unstable();
    assert_eq!(
        actual, expected,
        "Batch contents differ (order ignored)"
    );
}

/// Assert that `unified` is `head`'s records followed by `tail`'s records.
///
/// Column names are not compared; only record order and content.
///
/// # Panics
///
/// Panics if the length or any position differs.
pub fn assert_concatenation(unified: &CorpusBatch, head: &CorpusBatch, tail: &CorpusBatch) {
    assert_eq!(
        unified.len(),
        head.len() + tail.len(),
        "Unified length {} != {} + {}",
        unified.len(),
        head.len(),
        tail.len()
    );
    let (front, back) = unified.records().split_at(head.len());
    assert_eq!(front, head.records(), "Head records differ");
    assert_eq!(back, tail.records(), "Tail records differ");
}
