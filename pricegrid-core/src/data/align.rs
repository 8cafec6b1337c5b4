//! Multi-symbol date alignment.
//!
//! Closing series are merged one at a time into a wide [`SeriesTable`] keyed by
//! calendar date. A missing (date, symbol) pair stays absent: no forward-fill,
//! no zero-fill, no NaN placeholders.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from table operations that take a column name or a parameter.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("window must be at least 1")]
    ZeroWindow,

    #[error("dataframe conversion: {0}")]
    Frame(String),
}

/// One instrument's closing prices, keyed by calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosingSeries {
    pub symbol: String,
    pub points: BTreeMap<NaiveDate, f64>,
}

impl ClosingSeries {
    pub fn new(symbol: impl Into<String>, points: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        Self {
            symbol: symbol.into(),
            points: points.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// How a new series is joined onto the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Union of dates. Used for the equity universe.
    Outer,
    /// Intersection of dates. Used for reference series.
    Inner,
}

/// Wide date × symbol table of closing prices.
///
/// Rows are unique and ascending by date. Columns keep merge order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesTable {
    columns: Vec<String>,
    rows: BTreeMap<NaiveDate, BTreeMap<String, f64>>,
}

impl SeriesTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding exactly one series.
    pub fn from_series(series: ClosingSeries) -> Self {
        let mut table = Self::new();
        table.put_column(series, JoinKind::Outer);
        table
    }

    /// True when no column has been merged yet.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of dates (rows).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next_back().copied()
    }

    pub fn get(&self, date: NaiveDate, column: &str) -> Option<f64> {
        self.rows.get(&date).and_then(|row| row.get(column)).copied()
    }

    /// Values of one column in row order; `None` where absent.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        if !self.has_column(name) {
            return None;
        }
        Some(self.rows.values().map(|row| row.get(name).copied()).collect())
    }

    /// Iterate rows as (date, symbol → value).
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, &BTreeMap<String, f64>)> + '_ {
        self.rows.iter().map(|(d, row)| (*d, row))
    }

    /// Merge one series into the table.
    ///
    /// `None` (a failed fetch) leaves the table untouched. An empty table
    /// adopts the series as-is whatever the join kind. A column that already
    /// exists is replaced.
    pub fn merge(&mut self, series: Option<ClosingSeries>, join: JoinKind) {
        let Some(series) = series else {
            return;
        };
        if self.is_empty() {
            *self = Self::from_series(series);
            return;
        }
        if self.has_column(&series.symbol) {
            self.drop_values(&series.symbol);
        }
        self.put_column(series, join);
    }

    /// Set a column on the existing rows. Rows without an entry in `values`
    /// get no value; no rows are added.
    pub(crate) fn set_column_on_rows(&mut self, name: String, values: BTreeMap<NaiveDate, f64>) {
        if !self.has_column(&name) {
            self.columns.push(name.clone());
        }
        for (date, row) in self.rows.iter_mut() {
            match values.get(date) {
                Some(v) => {
                    row.insert(name.clone(), *v);
                }
                None => {
                    row.remove(&name);
                }
            }
        }
    }

    fn put_column(&mut self, series: ClosingSeries, join: JoinKind) {
        let ClosingSeries { symbol, points } = series;
        match join {
            JoinKind::Outer => {
                for (date, value) in points {
                    self.rows.entry(date).or_default().insert(symbol.clone(), value);
                }
            }
            JoinKind::Inner => {
                self.rows.retain(|date, _| points.contains_key(date));
                for (date, row) in self.rows.iter_mut() {
                    if let Some(value) = points.get(date) {
                        row.insert(symbol.clone(), *value);
                    }
                }
            }
        }
        self.columns.push(symbol);
    }

    // Remove a column's values and its name; rows left with nothing go too.
    fn drop_values(&mut self, name: &str) {
        self.columns.retain(|c| c != name);
        for row in self.rows.values_mut() {
            row.remove(name);
        }
        self.rows.retain(|_, row| !row.is_empty());
    }

    /// Deterministic BLAKE3 digest over dates, column names and values.
    ///
    /// Two tables with the same content always hash the same, so repeated
    /// loads against a deterministic provider can be compared cheaply.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();

        for column in &self.columns {
            hasher.update(column.as_bytes());
            hasher.update(&[0]);
        }
        for (date, row) in &self.rows {
            hasher.update(date.to_string().as_bytes());
            for column in &self.columns {
                match row.get(column) {
                    Some(v) => {
                        hasher.update(&[1]);
                        hasher.update(&v.to_le_bytes());
                    }
                    None => {
                        hasher.update(&[0]);
                    }
                }
            }
        }

        hasher.finalize().to_hex().to_string()
    }
}
