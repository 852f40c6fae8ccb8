//! Testing utilities for corpus pipelines.
//!
//! - **Fixtures**: [`CorpusFixture`] lays out a report tree and a CSV export in a
//!   temporary directory and hands back a matching [`PipelineConfig`](crate::config::PipelineConfig)
//! - **Assertions**: compare batch contents with readable failure messages
//!
//! # Quick Start
//!
//! ```no_run
//! use corpus_unify::pipeline::Pipeline;
//! use corpus_unify::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let fx = CorpusFixture::new()?;
//! fx.add_report("p10/s1.txt", "a b")?;
//! fx.write_csv(&["ROW_ID", "TEXT"], &[&["1", "x y"]])?;
//!
//! let summary = Pipeline::new(fx.config()).run()?;
//! assert_eq!(summary.combined_stats.record_count, 2);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
