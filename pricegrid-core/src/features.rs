//! Derived feature columns.
//!
//! Percentage change over a trailing window of rows:
//! pct[i] = (v[i] - v[i-window]) / v[i-window]
//!
//! The window counts table rows, not calendar days, so any dates an inner join
//! has already removed are skipped over. Rows `i < window` have no value, and
//! neither do rows where either end of the window is absent or the result is
//! not finite (a zero base).

use crate::data::align::{SeriesTable, TableError};
use std::collections::BTreeMap;

/// Name of the column produced by [`SeriesTable::derive_pct_change`].
pub fn pct_change_column(column: &str, window: usize) -> String {
    format!("{column}_pct_change_{window}")
}

/// Rolling percentage change over a slice of optional values.
pub fn pct_change(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if window == 0 {
        return result;
    }

    for i in window..values.len() {
        if let (Some(prev), Some(curr)) = (values[i - window], values[i]) {
            let change = (curr - prev) / prev;
            if change.is_finite() {
                result[i] = Some(change);
            }
        }
    }

    result
}

impl SeriesTable {
    /// Add `"{column}_pct_change_{window}"` to the table and return its name.
    pub fn derive_pct_change(&mut self, column: &str, window: usize) -> Result<String, TableError> {
        if window == 0 {
            return Err(TableError::ZeroWindow);
        }
        let values = self
            .column(column)
            .ok_or_else(|| TableError::UnknownColumn(column.to_string()))?;

        let derived: BTreeMap<_, _> = self
            .dates()
            .zip(pct_change(&values, window))
            .filter_map(|(date, v)| v.map(|v| (date, v)))
            .collect();

        let name = pct_change_column(column, window);
        self.set_column_on_rows(name.clone(), derived);
        Ok(name)
    }
}
