//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid scales, degenerate statistics, regressions without enough points, failed scan
//! workers, malformed grids and configuration, and generic errors.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid scale: {0}")]
    InvalidScale(String),

    #[error("degenerate statistic: {0}")]
    DegenerateStatistic(String),

    #[error("insufficient scales for regression: {valid} usable point(s), need at least 2")]
    InsufficientScales { valid: usize },

    #[error("scan worker for scale index {scale_index} failed: {reason}")]
    WorkerFailure { scale_index: usize, reason: String },

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("value {value} at index {index} is outside [0, {max_value})")]
    ValueOutOfRange {
        value: u32,
        index: usize,
        max_value: u32,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
