//! Corpus statistics: record count and word count.
//!
//! Word counting defaults to [`WordSplit::SingleSpace`], which splits on the
//! `' '` character only. Consecutive spaces, tabs and newlines therefore inflate
//! the count relative to a linguistic word count, and an empty record counts as
//! one word. This keeps figures comparable with previously published corpus
//! statistics. [`WordSplit::Whitespace`] gives the conventional count.

use crate::record::CorpusBatch;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// How a record's text is split into words.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WordSplit {
    /// Split on the single-space character (`str::split(' ')`).
    #[default]
    SingleSpace,
    /// Split on runs of Unicode whitespace (`str::split_whitespace`).
    Whitespace,
}

impl WordSplit {
    /// Number of words in `text` under this rule.
    #[must_use]
    pub fn count(self, text: &str) -> u64 {
        let n = match self {
            WordSplit::SingleSpace => text.split(' ').count(),
            WordSplit::Whitespace => text.split_whitespace().count(),
        };
        n as u64
    }
}

impl FromStr for WordSplit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single-space" => Ok(WordSplit::SingleSpace),
            "whitespace" => Ok(WordSplit::Whitespace),
            other => Err(format!(
                "unknown word split {other:?} (expected single-space or whitespace)"
            )),
        }
    }
}

/// Derived statistics for one corpus. Never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStatistics {
    pub record_count: u64,
    pub word_count: u64,
}

impl CorpusStatistics {
    /// Compute statistics over a batch, on the calling thread.
    #[must_use]
    pub fn compute(batch: &CorpusBatch, split: WordSplit) -> Self {
        let word_count = batch
            .records()
            .iter()
            .map(|r| split.count(&r.text))
            .sum();
        Self {
            record_count: batch.len() as u64,
            word_count,
        }
    }
}

impl Add for CorpusStatistics {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            record_count: self.record_count + rhs.record_count,
            word_count: self.word_count + rhs.word_count,
        }
    }
}

impl Sum for CorpusStatistics {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl fmt::Display for CorpusStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} records, {} words", self.record_count, self.word_count)
    }
}
