//! Fact classification.
//!
//! Sorts raw facts into annual totals, explicit quarters and backfill
//! candidates using form type and period length. Anything that fits none of
//! those shapes is dropped without error.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use findata_core::{PeriodKey, QuarterRecord, RawFact};
use tracing::debug;

/// Period lengths (end minus start, in days) accepted as a fiscal year.
pub const ANNUAL_DAYS: RangeInclusive<i64> = 331..=379;

/// Period lengths (end minus start, in days) accepted as a fiscal quarter.
pub const QUARTER_DAYS: RangeInclusive<i64> = 61..=99;

/// Which facts a pass is looking for.
#[derive(Clone, Copy, Debug)]
pub enum Pass<'a> {
    /// Explicit quarters from quarterly filings, with gap backfill.
    Primary,
    /// Frame-tagged quarters only, skipping keys that are already resolved.
    FrameOnly {
        /// Keys resolved by the primary pass.
        found: &'a BTreeSet<PeriodKey>,
    },
}

/// Output of classifying one concept tag's facts.
#[derive(Debug, Default)]
pub struct Classified {
    /// Validated annual totals by fiscal year. Later facts replace earlier ones.
    pub annual: BTreeMap<i32, i64>,
    /// Quarter candidates in ingestion order, duplicates included.
    pub quarters: Vec<QuarterRecord>,
    /// Quarter-shaped facts usable to fill date gaps, in ingestion order.
    pub backfill: Vec<QuarterRecord>,
    /// Facts that fit no shape.
    pub rejected: usize,
}

/// Classifies facts whose fiscal year lies within `years`.
#[must_use]
pub fn classify(facts: &[RawFact], years: &RangeInclusive<i32>, pass: Pass<'_>) -> Classified {
    let mut out = Classified::default();

    for fact in facts {
        let mut used = false;

        if let Some((year, total)) = annual_total(fact, years) {
            out.annual.insert(year, total);
            used = true;
        }

        match pass {
            Pass::Primary => {
                if let Some(record) = explicit_quarter(fact, years) {
                    out.quarters.push(record);
                    used = true;
                }
                if let Some(record) = backfill_candidate(fact, years) {
                    out.backfill.push(record);
                    used = true;
                }
            }
            Pass::FrameOnly { found } => {
                // Frame facts without a declared fiscal year are not trusted here.
                if let Some(record) = fact
                    .fiscal_year
                    .and_then(|_| frame_quarter(fact, years))
                    .filter(|record| !found.contains(&record.key))
                {
                    out.quarters.push(record);
                    used = true;
                }
            }
        }

        if !used {
            out.rejected += 1;
        }
    }

    debug!(
        annual = out.annual.len(),
        quarters = out.quarters.len(),
        backfill = out.backfill.len(),
        rejected = out.rejected,
        "Classified facts"
    );
    out
}

/// An original annual filing spanning a fiscal year.
#[must_use]
pub fn annual_total(fact: &RawFact, years: &RangeInclusive<i32>) -> Option<(i32, i64)> {
    let (year, _period) = (fact.fiscal_year?, fact.fiscal_period?);
    let is_annual = fact.form.is_original_annual()
        && years.contains(&year)
        && fact.duration_days().is_some_and(|d| ANNUAL_DAYS.contains(&d));
    is_annual.then_some((year, fact.value))
}

/// A quarter reported in a quarterly filing, keyed by its fiscal markers.
#[must_use]
pub fn explicit_quarter(fact: &RawFact, years: &RangeInclusive<i32>) -> Option<QuarterRecord> {
    if !fact.form.is_quarterly() {
        return None;
    }
    let key = fact.fiscal_key()?;
    if !years.contains(&key.year()) || !is_quarter_shaped(fact) {
        return None;
    }
    Some(QuarterRecord::explicit(key, fact.value, fact.start?, fact.end))
}

/// A fact the repository aligned to a calendar quarter, keyed by that frame.
#[must_use]
pub fn frame_quarter(fact: &RawFact, years: &RangeInclusive<i32>) -> Option<QuarterRecord> {
    let key = fact.frame_key()?;
    if !years.contains(&key.year()) {
        return None;
    }
    Some(QuarterRecord::frame(key, fact.value, fact.start?, fact.end))
}

/// Any quarter-shaped fact, whatever its form type.
///
/// Keyed by its frame when it has one, otherwise by the calendar quarter of
/// its end date.
#[must_use]
pub fn backfill_candidate(fact: &RawFact, years: &RangeInclusive<i32>) -> Option<QuarterRecord> {
    if !is_quarter_shaped(fact) {
        return None;
    }
    if fact.frame.is_some() {
        return frame_quarter(fact, years);
    }
    let key = PeriodKey::calendar(fact.end);
    if !years.contains(&key.year()) {
        return None;
    }
    Some(QuarterRecord::frame(key, fact.value, fact.start?, fact.end))
}

/// Quarter-length and not starting after its declared quarter could.
fn is_quarter_shaped(fact: &RawFact) -> bool {
    fact.duration_days()
        .is_some_and(|d| QUARTER_DAYS.contains(&d))
        && !fact.is_front_running()
}
