//! tally-ingest: the raw-loader boundary. Reads the wide, category-split
//! transaction export and produces `RawRecord`s for the pipeline.

pub mod wide_csv;

pub use wide_csv::{load_wide_csv, parse_wide_csv};
