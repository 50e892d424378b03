//! Gap scanning and frame backfill.
//!
//! Looks for date ranges no quarter covers and tries to cover them with
//! frame-aligned or quarter-shaped facts that were not reported as explicit
//! quarters.

use std::collections::{BTreeSet, VecDeque};

use chrono::Duration;
use findata_core::{PeriodKey, QuarterRecord, TimeGap};
use tracing::debug;

use crate::dedupe;

/// Uncovered date ranges in a key-sorted, dated quarterly series.
///
/// Consecutive quarters more than one day apart leave a gap. A trailing probe
/// gap the length of the latest observed quarter follows the last record, so
/// a quarter newer than any explicit one can still be found.
#[must_use]
pub fn find_gaps(quarters: &[QuarterRecord]) -> Vec<TimeGap> {
    let mut gaps: Vec<TimeGap> = quarters
        .windows(2)
        .filter_map(|pair| {
            let (end, start) = (pair[0].end()?, pair[1].start()?);
            if (start - end).num_days() <= 1 {
                return None;
            }
            TimeGap::new(end.succ_opt()?, start.pred_opt()?)
        })
        .collect();

    if let Some(probe) = trailing_probe(quarters) {
        gaps.push(probe);
    }
    gaps
}

fn trailing_probe(quarters: &[QuarterRecord]) -> Option<TimeGap> {
    let last_end = quarters.last()?.end()?;
    let length = quarters.iter().rev().find_map(QuarterRecord::duration)?;
    if length <= Duration::zero() {
        return None;
    }
    let start = last_end.succ_opt()?;
    TimeGap::new(start, start.checked_add_signed(length)?)
}

/// Fills gaps in `quarters` from `candidates`.
///
/// Candidates are deduplicated (later wins) and tried in key order. A
/// candidate is taken when its key is not yet present and its dates intersect
/// a gap; whatever part of the gap it leaves uncovered is scanned again.
/// Returns the number of quarters added; `quarters` is left sorted by key.
pub fn backfill(quarters: &mut Vec<QuarterRecord>, candidates: &[QuarterRecord]) -> usize {
    quarters.sort_by_key(|record| record.key);
    let candidates = dedupe::last_wins(candidates.iter().copied());
    if candidates.is_empty() {
        return 0;
    }

    let mut known: BTreeSet<PeriodKey> = quarters.iter().map(|record| record.key).collect();
    let mut pending: VecDeque<TimeGap> = find_gaps(quarters).into();
    let mut recovered = Vec::new();

    while let Some(gap) = pending.pop_front() {
        let hit = candidates.values().find_map(|candidate| {
            let (start, end) = (candidate.start()?, candidate.end()?);
            (!known.contains(&candidate.key) && gap.intersects(start, end))
                .then_some((candidate, start, end))
        });
        let Some((candidate, start, end)) = hit else {
            continue;
        };

        debug!(gap = %gap, period = %candidate.key, "Backfilled gap");
        known.insert(candidate.key);
        recovered.push(*candidate);
        pending.extend(gap.remove(start, end));
    }

    let added = recovered.len();
    quarters.extend(recovered);
    quarters.sort_by_key(|record| record.key);
    added
}
