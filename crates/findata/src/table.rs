//! Metric tables returned by [`FinData`](crate::FinData).

use std::fmt;

use chrono::NaiveDate;
use findata_core::{Cik, DataError, FiscalRange, PeriodKey, QuarterRecord, Result, Symbol};
use findata_reconcile::{END_COLUMN, PERIOD_COLUMN, QuarterTable, START_COLUMN};
use polars::prelude::*;

/// A reconciled quarterly series for one metric of one filer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricTable {
    symbol: Symbol,
    cik: Cik,
    range: FiscalRange,
    table: QuarterTable,
}

impl MetricTable {
    /// Wraps an assembled table with the filer and window it was built for.
    #[must_use]
    pub const fn new(symbol: Symbol, cik: Cik, range: FiscalRange, table: QuarterTable) -> Self {
        Self {
            symbol,
            cik,
            range,
            table,
        }
    }

    /// Ticker or identifier the caller asked for.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Filer the facts were fetched for.
    #[must_use]
    pub const fn cik(&self) -> Cik {
        self.cik
    }

    /// Requested fiscal window.
    #[must_use]
    pub const fn range(&self) -> &FiscalRange {
        &self.range
    }

    /// Metric label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.table.label()
    }

    /// Column labels.
    #[must_use]
    pub fn header(&self) -> [&str; 4] {
        self.table.header()
    }

    /// Rows sorted by period.
    #[must_use]
    pub fn rows(&self) -> &[QuarterRecord] {
        self.table.rows()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if no quarter was recovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Value for one period, if present.
    #[must_use]
    pub fn value(&self, key: PeriodKey) -> Option<i64> {
        self.rows()
            .binary_search_by_key(&key, |row| row.key)
            .ok()
            .map(|index| self.rows()[index].value)
    }

    /// Quarters of the requested window with no row.
    ///
    /// Open ends of the window stop at the first or last row.
    #[must_use]
    pub fn missing_periods(&self) -> Vec<PeriodKey> {
        self.table.missing_periods(&self.range)
    }

    /// The underlying engine table.
    #[must_use]
    pub fn into_inner(self) -> QuarterTable {
        self.table
    }

    /// Converts the table to a DataFrame with the header's column names.
    ///
    /// Dates are `Date` columns with nulls where a date is unknown.
    ///
    /// # Errors
    ///
    /// [`DataError::Other`] if polars rejects the columns.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let rows = self.rows();
        let periods: Vec<String> = rows.iter().map(|row| row.key.to_string()).collect();
        let values: Vec<i64> = rows.iter().map(|row| row.value).collect();
        let starts: Vec<Option<i32>> = rows.iter().map(|row| row.start().map(epoch_days)).collect();
        let ends: Vec<Option<i32>> = rows.iter().map(|row| row.end().map(epoch_days)).collect();

        let start_col = Column::new(START_COLUMN.into(), starts)
            .cast(&DataType::Date)
            .map_err(|e| DataError::Other(e.to_string()))?;
        let end_col = Column::new(END_COLUMN.into(), ends)
            .cast(&DataType::Date)
            .map_err(|e| DataError::Other(e.to_string()))?;

        DataFrame::new(vec![
            Column::new(PERIOD_COLUMN.into(), periods),
            Column::new(self.label().into(), values),
            start_col,
            end_col,
        ])
        .map_err(|e| DataError::Other(e.to_string()))
    }
}

impl fmt::Display for MetricTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.table, f)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn epoch_days(date: NaiveDate) -> i32 {
    (date - chrono::DateTime::UNIX_EPOCH.date_naive()).num_days() as i32
}
