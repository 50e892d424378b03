//! Bounds filtering and table assembly.
//!
//! Runs the orchestrator, reconciles the merged quarters against annual
//! totals, dates them, trims them to the requested window, and makes one
//! more frame-only pass when the window is still short of quarters.

use std::collections::BTreeSet;
use std::fmt;

use findata_core::{Cik, FiscalRange, PeriodKey, QuarterRecord, Result};
use tracing::{debug, instrument, warn};

use crate::classify::Pass;
use crate::dates::infer_dates;
use crate::dedupe;
use crate::orchestrator::Orchestrator;
use crate::yearly::fill_missing_quarters;

/// Header of the period column.
pub const PERIOD_COLUMN: &str = "Time-Period";
/// Header of the quarter start column.
pub const START_COLUMN: &str = "Start of Quarter";
/// Header of the quarter end column.
pub const END_COLUMN: &str = "End of Quarter";

/// Reconciled quarterly series for one metric.
///
/// Rows are unique by key and sorted ascending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuarterTable {
    label: String,
    rows: Vec<QuarterRecord>,
}

impl QuarterTable {
    /// Builds a table, collapsing duplicate keys (first wins) and sorting.
    #[must_use]
    pub fn new(label: impl Into<String>, rows: impl IntoIterator<Item = QuarterRecord>) -> Self {
        Self {
            label: label.into(),
            rows: dedupe::first_wins(rows).into_values().collect(),
        }
    }

    /// Metric label shown in the value column header.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Column labels: period, metric, quarter start, quarter end.
    #[must_use]
    pub fn header(&self) -> [&str; 4] {
        [PERIOD_COLUMN, &self.label, START_COLUMN, END_COLUMN]
    }

    /// Data rows, without the header.
    #[must_use]
    pub fn rows(&self) -> &[QuarterRecord] {
        &self.rows
    }

    /// Consumes the table and returns its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<QuarterRecord> {
        self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no quarter was recovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Quarters of `range` that have no row, in order.
    ///
    /// A bounded end of the range is scanned up to; an open end (the year 0
    /// start or the `i32::MAX` end of [`FiscalRange::default`]) stops at the
    /// first or last row instead. An open side with no rows at all reports
    /// nothing.
    #[must_use]
    pub fn missing_periods(&self, range: &FiscalRange) -> Vec<PeriodKey> {
        let open = FiscalRange::default();
        let lower = if range.start() == open.start() {
            self.rows.first().map(|row| row.key)
        } else {
            PeriodKey::new(range.start().year, range.start().quarter).ok()
        };
        let upper = if range.end() == open.end() {
            self.rows.last().map(|row| row.key)
        } else {
            PeriodKey::new(range.end().year, range.end().quarter).ok()
        };
        let (Some(lower), Some(upper)) = (lower, upper) else {
            return Vec::new();
        };
        let present: BTreeSet<PeriodKey> = self.rows.iter().map(|row| row.key).collect();

        let mut missing = Vec::new();
        let mut cursor = Some(lower);
        while let Some(key) = cursor.filter(|key| *key <= upper) {
            if range.contains(key) && !present.contains(&key) {
                missing.push(key);
            }
            cursor = key.succ();
        }
        missing
    }
}

impl fmt::Display for QuarterTable {
    /// Tab-separated, header first. Unknown dates are left blank.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header().join("\t"))?;
        for row in &self.rows {
            let start = row.start().map(|d| d.to_string()).unwrap_or_default();
            let end = row.end().map(|d| d.to_string()).unwrap_or_default();
            writeln!(f, "{}\t{}\t{}\t{}", row.key, row.value, start, end)?;
        }
        Ok(())
    }
}

/// Produces the reconciled table for one metric of one filer.
///
/// # Errors
///
/// Fails only when the primary pass fails, that is when every tag failed to
/// fetch. A short second pass is logged and the primary result kept.
#[instrument(skip(orchestrator, tags), fields(filer = %filer, range = %range))]
pub async fn assemble(
    orchestrator: &Orchestrator,
    filer: Cik,
    label: &str,
    tags: &[&str],
    range: &FiscalRange,
) -> Result<QuarterTable> {
    let primary = orchestrator.run(filer, tags, range, Pass::Primary).await?;

    let mut quarters: Vec<QuarterRecord> =
        dedupe::first_wins(primary.quarters).into_values().collect();
    fill_missing_quarters(&primary.annual, &mut quarters);
    infer_dates(&mut quarters);

    let found: BTreeSet<PeriodKey> = quarters
        .iter()
        .map(|record| record.key)
        .filter(|key| range.contains(*key))
        .collect();
    let expected = range.expected_quarters();

    if (found.len() as u64) < expected {
        debug!(
            found = found.len(),
            expected, "Window short of quarters, trying frame-tagged facts"
        );
        match orchestrator
            .run(filer, tags, range, Pass::FrameOnly { found: &found })
            .await
        {
            Ok(frames) => {
                quarters = dedupe::first_wins(quarters.into_iter().chain(frames.quarters))
                    .into_values()
                    .collect();
                infer_dates(&mut quarters);
            }
            Err(e) => {
                warn!(error = %e, "Frame pass failed, keeping primary result");
            }
        }
    }

    quarters.retain(|record| range.contains(record.key));
    debug!(rows = quarters.len(), "Assembled quarterly table");
    Ok(QuarterTable::new(label, quarters))
}
