//! Errors that abort a loader call.
//!
//! Per-instrument download problems never show up here: they are recovered
//! inside the pipeline and reported as [`crate::fetch::FetchFailure`] values.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    /// A start specification that is neither a date nor a lookback count.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration rejected at construction time.
    #[error("invalid configuration: {0}")]
    Config(String),
}
