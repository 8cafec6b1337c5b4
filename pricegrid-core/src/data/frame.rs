//! Polars export for downstream modeling code.

use super::align::{SeriesTable, TableError};
use chrono::NaiveDate;
use polars::prelude::*;

impl SeriesTable {
    /// Convert to a `DataFrame`: a `date` column (Date dtype) followed by one
    /// nullable f64 column per table column, in merge order.
    pub fn to_dataframe(&self) -> Result<DataFrame, TableError> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
            .ok_or_else(|| TableError::Frame("epoch date".into()))?;
        let dates: Vec<i32> = self
            .dates()
            .map(|d| (d - epoch).num_days() as i32)
            .collect();

        let mut columns = Vec::with_capacity(self.columns().len() + 1);
        columns.push(
            Column::new("date".into(), dates)
                .cast(&DataType::Date)
                .map_err(|e| TableError::Frame(format!("date cast: {e}")))?,
        );
        for name in self.columns() {
            let values = self
                .column(name)
                .ok_or_else(|| TableError::UnknownColumn(name.clone()))?;
            columns.push(Column::new(name.as_str().into(), values));
        }

        DataFrame::new(columns).map_err(|e| TableError::Frame(format!("dataframe creation: {e}")))
    }
}
