//! Load orchestration: resolve the start date, fetch the universe, align,
//! then optionally add the reference series and the rate-index feature.
//!
//! The pipeline is strictly sequential. Each symbol is fetched and merged
//! before the next one starts. A failed fetch is logged, recorded in
//! [`LoadedData::failures`], and otherwise skipped, so once the start date has
//! resolved a load always returns a (possibly empty) table. A start on or after
//! the end date is an empty range: every symbol fails with an empty series.

use crate::config::LoaderConfig;
use crate::data::align::{ClosingSeries, JoinKind, SeriesTable};
use crate::data::provider::{DataProvider, FetchProgress, SilentProgress};
use crate::data::universe::Universe;
use crate::dates::{self, StartSpec};
use crate::error::LoaderError;
use crate::fetch::{FetchFailure, InstrumentFetcher};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// Result of one load.
#[derive(Debug)]
pub struct LoadedData {
    /// Resolved start date.
    pub start: NaiveDate,
    /// Configured end date.
    pub end: NaiveDate,
    pub table: SeriesTable,
    /// Every symbol that could not be fetched, in fetch order.
    pub failures: Vec<FetchFailure>,
}

impl LoadedData {
    /// First and last date present in the table.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.table.first_date()?, self.table.last_date()?))
    }

    pub fn failed_symbols(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.symbol.as_str()).collect()
    }
}

/// Builds the aligned price matrix for a fixed universe and end date.
pub struct PriceLoader {
    config: LoaderConfig,
    universe: Universe,
    provider: Box<dyn DataProvider>,
}

impl PriceLoader {
    /// Validate the configuration and fix the universe.
    pub fn new(config: LoaderConfig, provider: Box<dyn DataProvider>) -> Result<Self, LoaderError> {
        let config = config.trimmed();
        let universe = config.validate()?;
        Ok(Self {
            config,
            universe,
            provider,
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn end_date(&self) -> NaiveDate {
        self.config.end_date
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn resolve_start(&self, start: StartSpec) -> Result<NaiveDate, LoaderError> {
        dates::resolve(start, self.config.end_date)
    }

    /// Load the matrix starting at `start`. With `include_indices` the rate
    /// index and market index are inner-joined and the rate index gets its
    /// percentage-change column.
    pub fn get_data(
        &self,
        start: StartSpec,
        include_indices: bool,
    ) -> Result<LoadedData, LoaderError> {
        self.get_data_with_progress(start, include_indices, &SilentProgress)
    }

    pub fn get_data_with_progress(
        &self,
        start: StartSpec,
        include_indices: bool,
        progress: &dyn FetchProgress,
    ) -> Result<LoadedData, LoaderError> {
        let end = self.config.end_date;
        let start_date = self.resolve_start(start)?;

        let mut run = Run {
            fetcher: InstrumentFetcher::new(self.provider.as_ref(), end),
            interval: &self.config.interval,
            start: start_date,
            progress,
            index: 0,
            total: self.universe.len() + if include_indices { 2 } else { 0 },
            failures: Vec::new(),
        };

        info!(
            start = %start_date,
            %end,
            symbols = self.universe.len(),
            provider = self.provider.name(),
            "loading universe"
        );

        let mut table = SeriesTable::new();
        for symbol in self.universe.iter() {
            table.merge(run.fetch(symbol), JoinKind::Outer);
        }

        if include_indices {
            self.merge_references(&mut run, &mut table);
        }

        let succeeded = run.total - run.failures.len();
        progress.on_batch_complete(succeeded, run.failures.len(), run.total);
        info!(
            rows = table.len(),
            columns = table.columns().len(),
            failed = run.failures.len(),
            first = ?table.first_date(),
            last = ?table.last_date(),
            "load complete"
        );

        Ok(LoadedData {
            start: start_date,
            end,
            table,
            failures: run.failures,
        })
    }

    fn merge_references(&self, run: &mut Run<'_>, table: &mut SeriesTable) {
        let rate = self.config.rate_index.as_str();
        if let Some(series) = run.fetch(rate) {
            inner_merge(table, series);
            match table.derive_pct_change(rate, self.config.pct_change_window) {
                Ok(name) => debug!(column = %name, "derived rate-index feature"),
                Err(e) => warn!(symbol = rate, error = %e, "could not derive rate-index feature"),
            }
        }

        if let Some(series) = run.fetch(&self.config.market_index) {
            inner_merge(table, series);
        }
    }
}

// Reference series shrink the date set; log by how much.
fn inner_merge(table: &mut SeriesTable, series: ClosingSeries) {
    let symbol = series.symbol.clone();
    let before = table.len();
    table.merge(Some(series), JoinKind::Inner);
    let dropped = before.saturating_sub(table.len());
    if dropped > 0 {
        debug!(symbol = %symbol, dropped, remaining = table.len(), "inner join removed dates");
    }
}

/// Per-call state: the fetcher, progress counters and collected failures.
struct Run<'a> {
    fetcher: InstrumentFetcher<'a>,
    interval: &'a str,
    start: NaiveDate,
    progress: &'a dyn FetchProgress,
    index: usize,
    total: usize,
    failures: Vec<FetchFailure>,
}

impl Run<'_> {
    fn fetch(&mut self, symbol: &str) -> Option<ClosingSeries> {
        self.progress.on_start(symbol, self.index, self.total);
        let result = self.fetcher.fetch(symbol, self.start, self.interval);
        let outcome = match result {
            Ok(series) => {
                self.progress.on_complete(symbol, self.index, self.total, Ok(()));
                debug!(symbol, rows = series.len(), "fetched");
                Some(series)
            }
            Err(failure) => {
                self.progress
                    .on_complete(symbol, self.index, self.total, Err(&failure.error));
                warn!(
                    symbol,
                    stage = %failure.stage,
                    error = %failure.error,
                    "fetch failed, skipping symbol"
                );
                self.failures.push(failure);
                None
            }
        };
        self.index += 1;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::{DataError, FetchRequest, RawBar};
    use std::collections::HashMap;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    struct MapProvider(HashMap<String, Vec<(NaiveDate, f64)>>);

    impl DataProvider for MapProvider {
        fn name(&self) -> &str {
            "map"
        }

        fn fetch(&self, request: &FetchRequest) -> Result<Vec<RawBar>, DataError> {
            let points = self.0.get(&request.symbol).ok_or_else(|| DataError::SymbolNotFound {
                symbol: request.symbol.clone(),
            })?;
            Ok(points
                .iter()
                .filter(|(date, _)| *date >= request.start && *date < request.end)
                .map(|(date, close)| RawBar {
                    timestamp: date.and_time(chrono::NaiveTime::MIN),
                    open: None,
                    high: None,
                    low: None,
                    close: Some(*close),
                    volume: None,
                })
                .collect())
        }
    }

    fn config(symbols: &[&str]) -> LoaderConfig {
        LoaderConfig {
            end_date: d(31),
            include: symbols.iter().map(|s| s.to_string()).collect(),
            exclude: Vec::new(),
            ..LoaderConfig::default()
        }
    }

    #[test]
    fn start_after_end_gives_empty_table() {
        let provider = MapProvider(HashMap::from([("AAA".to_string(), vec![(d(2), 1.0)])]));
        let loader = PriceLoader::new(config(&["AAA"]), Box::new(provider)).unwrap();
        let loaded = loader
            .get_data(StartSpec::AbsoluteDate(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()), true)
            .unwrap();

        assert!(loaded.table.is_empty());
        assert_eq!(loaded.start, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(loaded.failed_symbols(), vec!["AAA", "^TYX", "^OEX"]);
        assert!(loaded
            .failures
            .iter()
            .all(|f| matches!(f.error, DataError::EmptySeries { .. })));
    }

    #[test]
    fn unresolvable_lookback_is_invalid_argument() {
        let loader = PriceLoader::new(
            config(&["AAA"]),
            Box::new(MapProvider(HashMap::new())),
        )
        .unwrap();
        let err = loader.get_data(StartSpec::LookbackCount(u32::MAX), false).unwrap_err();
        assert!(matches!(err, LoaderError::InvalidArgument(_)));
    }

    #[test]
    fn reference_symbols_are_trimmed() {
        let provider = MapProvider(HashMap::from([
            ("AAA".to_string(), (1..=28).map(|day| (d(day), 1.0)).collect()),
            ("^TYX".to_string(), (1..=28).map(|day| (d(day), 4.0 + day as f64)).collect()),
            ("^OEX".to_string(), (1..=28).map(|day| (d(day), 2500.0)).collect()),
        ]));
        let cfg = LoaderConfig {
            rate_index: " ^TYX".into(),
            market_index: "^OEX \t".into(),
            ..config(&["AAA"])
        };
        let loader = PriceLoader::new(cfg, Box::new(provider)).unwrap();
        assert_eq!(loader.config().rate_index, "^TYX");

        let loaded = loader.get_data(StartSpec::AbsoluteDate(d(1)), true).unwrap();
        assert!(loaded.failures.is_empty());
        assert_eq!(
            loaded.table.columns(),
            ["AAA", "^TYX", "^TYX_pct_change_20", "^OEX"].map(String::from)
        );
    }

    #[test]
    fn every_fetch_failing_gives_empty_table() {
        let loader = PriceLoader::new(
            config(&["AAA", "BBB"]),
            Box::new(MapProvider(HashMap::new())),
        )
        .unwrap();
        let loaded = loader.get_data(StartSpec::AbsoluteDate(d(1)), true).unwrap();
        assert!(loaded.table.is_empty());
        assert_eq!(loaded.failed_symbols(), vec!["AAA", "BBB", "^TYX", "^OEX"]);
        assert_eq!(loaded.date_span(), None);
    }

    #[test]
    fn lookback_resolves_against_end_date() {
        let loader = PriceLoader::new(
            config(&["AAA"]),
            Box::new(MapProvider(HashMap::new())),
        )
        .unwrap();
        // 2024-01-31 is a Wednesday.
        assert_eq!(loader.resolve_start(StartSpec::LookbackCount(3)).unwrap(), d(26));
    }
}
