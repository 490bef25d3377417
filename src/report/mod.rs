//! Word-count artifacts and summaries.

pub mod generator;

pub use generator::*;
