//! Format adapters: corpus files, tabular input, and Parquet output.

pub mod compression;
pub mod csv;
pub mod glob;
pub mod parquet;
pub mod text;
