//! Annual-total reconciliation.
//!
//! Filers rarely file a quarterly report for the quarter that closes their
//! fiscal year. When the annual total and the other three quarters are known,
//! the missing quarter is the difference.

use std::collections::BTreeMap;

use findata_core::{PeriodKey, QuarterRecord, YearlyTotal};
use tracing::debug;

/// Validated annual totals keyed by fiscal year.
pub type AnnualTotals = BTreeMap<i32, i64>;

/// Merges `later` into `base`; on a shared fiscal year the later total wins.
pub fn merge_later_wins(base: &mut AnnualTotals, later: AnnualTotals) {
    base.extend(later);
}

/// Synthesises the single missing quarter of each fully-known year.
///
/// `quarters` must hold at most one record per key. A year qualifies when
/// exactly three of its quarters are present and the remaining total, divided
/// by four (truncating toward zero), is non-zero. The remainder may be
/// negative. Returns the number of quarters added; `quarters` is left sorted
/// by key.
pub fn fill_missing_quarters(totals: &AnnualTotals, quarters: &mut Vec<QuarterRecord>) -> usize {
    let mut tracked: BTreeMap<i32, YearlyTotal> = totals
        .iter()
        .map(|(&year, &total)| (year, YearlyTotal::new(year, total)))
        .collect();

    for record in quarters.iter() {
        if let Some(total) = tracked.get_mut(&record.key.year()) {
            total.absorb(record.key.quarter(), record.value);
        }
    }

    let mut added = 0;
    for total in tracked.values() {
        let Some(quarter) = total.missing_quarter() else {
            continue;
        };
        if total.remaining() / 4 == 0 {
            continue;
        }
        let Ok(key) = PeriodKey::new(total.fiscal_year, quarter) else {
            continue;
        };
        debug!(period = %key, value = total.remaining(), "Inferred quarter from annual total");
        quarters.push(QuarterRecord::inferred(key, total.remaining()));
        added += 1;
    }

    quarters.sort_by_key(|record| record.key);
    added
}
