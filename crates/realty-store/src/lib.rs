//! Storage layer: the immutable dataset snapshot loaded at startup.

mod dataset;
mod error;
mod rows;

pub use dataset::{Dataset, read_csv, read_parquet};
pub use error::StoreError;
pub use rows::{JsonRow, sample_rows};
