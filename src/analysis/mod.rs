//! Performance analysis.
//!
//! Per-agent aggregation of period figures and the rating decision table.

pub mod aggregator;
pub mod rating;

pub use aggregator::*;
