//! Single-instrument fetch: download, keep the close, key by calendar date.
//!
//! Failures never escape as errors that could stop a load. Each one becomes a
//! [`FetchFailure`] carrying the symbol, the stage that failed and the
//! provider error, which the pipeline logs and collects.

use crate::data::align::ClosingSeries;
use crate::data::provider::{DataError, DataProvider, FetchRequest, MissingIndexPolicy, RawBar};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

/// Where a fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    /// The provider call itself.
    Download,
    /// Shaping the rows into a closing series.
    ExtractClose,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStage::Download => f.write_str("download"),
            FetchStage::ExtractClose => f.write_str("extract close"),
        }
    }
}

/// A recovered per-instrument failure.
#[derive(Debug)]
pub struct FetchFailure {
    pub symbol: String,
    pub stage: FetchStage,
    pub error: DataError,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (at {})", self.symbol, self.error, self.stage)
    }
}

/// Fetches closing series for one symbol at a time up to a fixed end date.
pub struct InstrumentFetcher<'a> {
    provider: &'a dyn DataProvider,
    end: NaiveDate,
}

impl<'a> InstrumentFetcher<'a> {
    pub fn new(provider: &'a dyn DataProvider, end: NaiveDate) -> Self {
        Self { provider, end }
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Fetch `symbol` over `[start, end)` and shape it into a closing series.
    /// An empty range fails with [`DataError::EmptySeries`] without calling
    /// the provider.
    pub fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        interval: &str,
    ) -> Result<ClosingSeries, FetchFailure> {
        if start >= self.end {
            return Err(FetchFailure {
                symbol: symbol.to_string(),
                stage: FetchStage::Download,
                error: DataError::EmptySeries {
                    symbol: symbol.to_string(),
                },
            });
        }

        let request = FetchRequest {
            symbol: symbol.to_string(),
            interval: interval.to_string(),
            start,
            end: self.end,
            missing_index: MissingIndexPolicy::Drop,
        };

        let bars = self.provider.fetch(&request).map_err(|error| FetchFailure {
            symbol: symbol.to_string(),
            stage: FetchStage::Download,
            error,
        })?;

        closing_series(symbol, &bars).map_err(|error| FetchFailure {
            symbol: symbol.to_string(),
            stage: FetchStage::ExtractClose,
            error,
        })
    }
}

/// Keep only the close of each row, truncated to its calendar date. When
/// several rows fall on one date the last one wins.
pub fn closing_series(symbol: &str, bars: &[RawBar]) -> Result<ClosingSeries, DataError> {
    let points: BTreeMap<NaiveDate, f64> = bars
        .iter()
        .filter_map(|bar| {
            bar.close
                .filter(|c| c.is_finite())
                .map(|c| (bar.timestamp.date(), c))
        })
        .collect();

    if points.is_empty() {
        return Err(DataError::EmptySeries {
            symbol: symbol.to_string(),
        });
    }

    Ok(ClosingSeries {
        symbol: symbol.to_string(),
        points,
    })
}
