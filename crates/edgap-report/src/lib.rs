//! Aggregation of per-unit outcomes into the exported result table, and
//! delimited-text output for both artifacts.

pub mod aggregate;
pub mod export;

pub use aggregate::aggregate;
pub use export::{write_clean_dataset, write_result_table};
