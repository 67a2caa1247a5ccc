//! Error types for the loading and aggregation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, filtering or summarising trip data.
#[derive(Error, Debug)]
pub enum BikeshareError {
    /// The source file for a city could not be opened or read.
    #[error("data for '{city}' is unavailable at {}: {source}", path.display())]
    DataUnavailable {
        city: String,
        path: PathBuf,
        source: csv::Error,
    },

    /// A row of a source file could not be turned into a trip.
    #[error("malformed record at row {row} of {}: {reason}", path.display())]
    MalformedRecord {
        path: PathBuf,
        row: usize,
        reason: String,
    },

    /// A city, month or day outside the supported sets.
    #[error("invalid {field} filter '{value}'")]
    InvalidFilter { field: &'static str, value: String },

    /// Interactive input that did not match any allowed choice.
    #[error("'{value}' is not one of: {}", allowed.join(", "))]
    InvalidInput { value: String, allowed: Vec<String> },

    /// A statistic that needs at least one trip was asked of an empty set.
    #[error("no trips match the selected filters")]
    EmptyDataset,

    /// Summed trip durations do not fit in a 64-bit second count.
    #[error("total duration of {trips} trips exceeds {} seconds", u64::MAX)]
    DurationOverflow { trips: usize },

    /// IO error on the interactive streams.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the pipeline.
pub type Result<T> = std::result::Result<T, BikeshareError>;
