//! Period key deduplication.
//!
//! Within one concept tag the repository emits restated and amended values
//! after the originals, so the last occurrence of a key wins. Across concept
//! tags the higher-priority tag wins, so the first occurrence is kept.

use std::collections::BTreeMap;

use findata_core::{PeriodKey, QuarterRecord};

/// Keeps the last record seen for each key.
#[must_use]
pub fn last_wins(
    records: impl IntoIterator<Item = QuarterRecord>,
) -> BTreeMap<PeriodKey, QuarterRecord> {
    records
        .into_iter()
        .map(|record| (record.key, record))
        .collect()
}

/// Keeps the first record seen for each key.
#[must_use]
pub fn first_wins(
    records: impl IntoIterator<Item = QuarterRecord>,
) -> BTreeMap<PeriodKey, QuarterRecord> {
    let mut unique = BTreeMap::new();
    for record in records {
        unique.entry(record.key).or_insert(record);
    }
    unique
}
