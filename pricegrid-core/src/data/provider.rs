//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over market-data sources (Yahoo Finance,
//! CSV import, synthetic walks) so the pipeline can swap implementations and
//! tests can substitute deterministic stubs.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw OHLCV row from a data provider, before any shaping.
///
/// Fields are optional because providers report partial rows (Yahoo emits
/// `null` for halted sessions). The timestamp keeps whatever time-of-day the
/// provider returned; the fetcher truncates it to a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub timestamp: NaiveDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

impl RawBar {
    /// True when the provider reported no values at all for this timestamp.
    pub fn is_empty(&self) -> bool {
        self.open.is_none()
            && self.high.is_none()
            && self.low.is_none()
            && self.close.is_none()
            && self.volume.is_none()
    }
}

/// What a provider should do with timestamps that carry no values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingIndexPolicy {
    /// Drop rows where every field is missing.
    #[default]
    Drop,
    /// Keep them as empty rows.
    Keep,
}

/// A single-symbol download request.
///
/// The range is `[start, end)`: `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub symbol: String,
    pub interval: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub missing_index: MissingIndexPolicy,
}

impl FetchRequest {
    /// Apply the missing-index policy to a provider's rows.
    pub fn apply_missing_policy(&self, bars: Vec<RawBar>) -> Vec<RawBar> {
        match self.missing_index {
            MissingIndexPolicy::Drop => bars.into_iter().filter(|b| !b.is_empty()).collect(),
            MissingIndexPolicy::Keep => bars,
        }
    }

    /// Whether a timestamp lies inside the requested range.
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let date = timestamp.date();
        date >= self.start && date < self.end
    }
}

/// Structured error types for data operations.
///
/// These are designed to be displayable in both log lines and CLI summaries.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("no closing prices for '{symbol}' in the requested range")]
    EmptySeries { symbol: String },

    #[error("csv import error: {0}")]
    CsvError(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for market-data providers (Yahoo Finance, CSV import, etc).
///
/// Implementations handle the specifics of fetching data from a particular
/// source. Shaping (close extraction, date truncation) happens above this
/// trait, in the instrument fetcher.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch OHLCV rows for one symbol.
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<RawBar>, DataError>;
}

/// Progress callback for multi-symbol loads.
pub trait FetchProgress: Send {
    /// Called when starting to fetch a symbol.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol fetch completes.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: Result<(), &DataError>);

    /// Called when the whole load is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that discards every event.
pub struct SilentProgress;

impl FetchProgress for SilentProgress {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        _symbol: &str,
        _index: usize,
        _total: usize,
        _result: Result<(), &DataError>,
    ) {
    }

    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl FetchProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {symbol}...", index + 1, total);
    }

    fn on_complete(
        &self,
        symbol: &str,
        _index: usize,
        _total: usize,
        result: Result<(), &DataError>,
    ) {
        match result {
            Ok(()) => println!("  OK: {symbol}"),
            Err(e) => println!("  FAIL: {symbol}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nLoad complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}
