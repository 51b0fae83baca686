//! Data pipeline: fetch, parse, filter, aggregate.
//!
//! ```text
//! remote CSV --loader--> SalaryDataset --filter--> FilteredView --stats--> Aggregates
//! ```
//!
//! The dataset is fetched and parsed once per process and shared behind an
//! `Arc`; everything downstream works on index slices into it.

pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
