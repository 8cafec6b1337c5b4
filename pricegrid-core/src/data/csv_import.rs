//! CSV import provider.
//!
//! Reads `<dir>/<SYMBOL>.csv` files with a `date,open,high,low,close,volume`
//! header. The date column accepts `YYYY-MM-DD` or a full timestamp; empty
//! cells are treated as missing values.

use super::provider::{DataError, DataProvider, FetchRequest, RawBar};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<u64>,
}

/// Offline provider backed by a directory of per-symbol CSV files.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    fn read_file(path: &Path, symbol: &str) -> Result<Vec<RawBar>, DataError> {
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| DataError::CsvError(format!("open {}: {e}", path.display())))?;

        let mut bars = Vec::new();
        for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(|e| DataError::CsvError(format!("{symbol} row {line}: {e}")))?;
            let timestamp = parse_timestamp(row.date.trim()).ok_or_else(|| {
                DataError::CsvError(format!("{symbol} row {line}: bad date '{}'", row.date))
            })?;
            bars.push(RawBar {
                timestamp,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }
        Ok(bars)
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<Vec<RawBar>, DataError> {
        let bars = Self::read_file(&self.path_for(&request.symbol), &request.symbol)?;
        let in_range = bars
            .into_iter()
            .filter(|b| request.contains(b.timestamp))
            .collect();
        Ok(request.apply_missing_policy(in_range))
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_time(chrono::NaiveTime::MIN));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}
