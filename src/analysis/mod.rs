//! Analysis modules.
//!
//! Frequency counting plus the four statistics groups computed for every
//! filtered dataset.

pub mod aggregator;
pub mod stats;

pub use aggregator::*;
pub use stats::*;
