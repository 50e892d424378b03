//! Core data types for fact reconciliation.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`Cik`] - SEC Central Index Key identifying a filer
//! - [`RawFact`] - One fact as reported by the repository
//! - [`PeriodKey`] - Fiscal year and quarter identifying a table row
//! - [`QuarterRecord`] / [`Provenance`] - One reconciled quarter and where it came from
//! - [`YearlyTotal`] - Annual total being consumed by its known quarters
//! - [`TimeGap`] - Date interval not yet covered by any quarter

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DataError, Result};
use crate::period::{FiscalPeriod, FormType};

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// SEC Central Index Key.
///
/// Displayed zero-padded to 10 digits, the form the EDGAR API expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cik(u64);

impl Cik {
    /// Creates a CIK from its numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010}", self.0)
    }
}

impl FromStr for Cik {
    type Err = DataError;

    /// Parses a CIK with or without leading zeros. Anything but 1-10 digits is rejected.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.len() > 10 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DataError::InvalidParameter(format!("not a CIK: {s:?}")));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|e| DataError::InvalidParameter(format!("not a CIK: {s:?} ({e})")))
    }
}

/// Fiscal year and quarter identifying one row of a quarterly table.
///
/// Renders as `"2020Q3"`. Ordering is by year, then quarter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PeriodKey {
    year: i32,
    quarter: u8,
}

impl PeriodKey {
    /// Creates a key, rejecting quarters outside 1-4.
    pub fn new(year: i32, quarter: u8) -> Result<Self> {
        if !(1..=4).contains(&quarter) {
            return Err(DataError::InvalidParameter(format!(
                "quarter must be between 1 and 4, got {quarter}"
            )));
        }
        Ok(Self { year, quarter })
    }

    /// Key for a fiscal year and a quarterly fiscal period marker.
    #[must_use]
    pub fn from_fiscal(year: i32, period: FiscalPeriod) -> Option<Self> {
        period.quarter().map(|quarter| Self { year, quarter })
    }

    /// Key embedded in a frame tag such as `"CY2019Q3"`.
    ///
    /// Annual frames (`"CY2019"`) and instant frames (`"CY2019Q3I"`) carry no
    /// quarter duration and return `None`.
    #[must_use]
    pub fn from_frame(frame: &str) -> Option<Self> {
        frame.get(2..)?.parse().ok()
    }

    /// Calendar year-quarter that contains `date`.
    #[must_use]
    pub fn calendar(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            // month0 is 0..=11, so the quarter is always 1..=4
            quarter: (date.month0() / 3 + 1) as u8,
        }
    }

    /// Fiscal year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Fiscal quarter (1-4).
    #[must_use]
    pub const fn quarter(&self) -> u8 {
        self.quarter
    }

    /// The following quarter, or `None` past the last representable year.
    #[must_use]
    pub fn succ(&self) -> Option<Self> {
        if self.quarter == 4 {
            Some(Self {
                year: self.year.checked_add(1)?,
                quarter: 1,
            })
        } else {
            Some(Self {
                year: self.year,
                quarter: self.quarter + 1,
            })
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

impl FromStr for PeriodKey {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DataError::Parse(format!("invalid period key {s:?}"));
        let (year, quarter) = s.split_once('Q').ok_or_else(invalid)?;
        if year.len() != 4 || quarter.len() != 1 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let quarter = quarter.parse::<u8>().map_err(|_| invalid())?;
        Self::new(year, quarter).map_err(|_| invalid())
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = DataError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// A single fact as reported by the repository.
///
/// Markers the repository sometimes omits are optional; the classifier decides
/// what a fact without them is still good for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFact {
    /// Concept tag the fact was reported under (e.g. "Revenues").
    pub concept: String,
    /// Form type of the filing.
    pub form: FormType,
    /// Declared fiscal year.
    pub fiscal_year: Option<i32>,
    /// Declared fiscal period.
    pub fiscal_period: Option<FiscalPeriod>,
    /// Start of the reported period (absent for instant facts).
    pub start: Option<NaiveDate>,
    /// End of the reported period.
    pub end: NaiveDate,
    /// Reported value in the reporting unit.
    pub value: i64,
    /// Calendar frame the repository aligned this fact to (e.g. "CY2019Q3").
    pub frame: Option<String>,
}

impl RawFact {
    /// Creates a fact with no fiscal markers and no frame.
    #[must_use]
    pub fn new(
        concept: impl Into<String>,
        form: impl Into<FormType>,
        start: Option<NaiveDate>,
        end: NaiveDate,
        value: i64,
    ) -> Self {
        Self {
            concept: concept.into(),
            form: form.into(),
            fiscal_year: None,
            fiscal_period: None,
            start,
            end,
            value,
            frame: None,
        }
    }

    /// Sets the declared fiscal year and period.
    #[must_use]
    pub const fn with_fiscal(mut self, year: i32, period: FiscalPeriod) -> Self {
        self.fiscal_year = Some(year);
        self.fiscal_period = Some(period);
        self
    }

    /// Sets the calendar frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.frame = Some(frame.into());
        self
    }

    /// Length of the reported period in days, if it has a start.
    #[must_use]
    pub fn duration_days(&self) -> Option<i64> {
        self.start
            .map(|start| self.end.signed_duration_since(start).num_days())
    }

    /// Key of the quarterly frame, if the fact carries one.
    #[must_use]
    pub fn frame_key(&self) -> Option<PeriodKey> {
        self.frame
            .as_deref()
            .filter(|frame| frame.contains('Q'))
            .and_then(PeriodKey::from_frame)
    }

    /// Key from the declared fiscal markers, if they name a quarter.
    #[must_use]
    pub fn fiscal_key(&self) -> Option<PeriodKey> {
        PeriodKey::from_fiscal(self.fiscal_year?, self.fiscal_period?)
    }

    /// Returns true if the fact starts after its declared quarter could have begun.
    ///
    /// A fiscal Q2 of 2020 may start no later than 2020-04-01. Facts without the
    /// markers needed for the check are never front-running.
    #[must_use]
    pub fn is_front_running(&self) -> bool {
        let (Some(start), Some(year), Some(month)) = (
            self.start,
            self.fiscal_year,
            self.fiscal_period.and_then(|p| p.latest_start_month()),
        ) else {
            return false;
        };
        NaiveDate::from_ymd_opt(year, month, 1).is_some_and(|latest| start > latest)
    }
}

/// Where a quarter's value and dates came from.
///
/// Each variant only carries the dates it can guarantee.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    /// Reported directly in a quarterly filing.
    Explicit {
        /// Start of the quarter.
        start: NaiveDate,
        /// End of the quarter.
        end: NaiveDate,
    },
    /// Recovered from a frame-aligned or quarter-shaped fact.
    Frame {
        /// Start of the quarter.
        start: NaiveDate,
        /// End of the quarter.
        end: NaiveDate,
    },
    /// Value derived from an annual total; dates unknown.
    InferredValue,
    /// Value derived from an annual total, dates taken from neighbouring quarters.
    InferredDate {
        /// Start of the quarter, if a preceding quarter exists.
        start: Option<NaiveDate>,
        /// End of the quarter, if a following quarter exists.
        end: Option<NaiveDate>,
    },
}

/// One quarter of a reconciled metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterRecord {
    /// Fiscal year and quarter.
    pub key: PeriodKey,
    /// Value in the reporting unit. May be negative.
    pub value: i64,
    /// Origin of the value and dates.
    pub provenance: Provenance,
}

impl QuarterRecord {
    /// A quarter reported directly in a quarterly filing.
    #[must_use]
    pub const fn explicit(key: PeriodKey, value: i64, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            key,
            value,
            provenance: Provenance::Explicit { start, end },
        }
    }

    /// A quarter recovered from a frame-aligned fact.
    #[must_use]
    pub const fn frame(key: PeriodKey, value: i64, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            key,
            value,
            provenance: Provenance::Frame { start, end },
        }
    }

    /// A quarter whose value was derived from an annual total.
    #[must_use]
    pub const fn inferred(key: PeriodKey, value: i64) -> Self {
        Self {
            key,
            value,
            provenance: Provenance::InferredValue,
        }
    }

    /// Start of the quarter, if known.
    #[must_use]
    pub const fn start(&self) -> Option<NaiveDate> {
        match self.provenance {
            Provenance::Explicit { start, .. } | Provenance::Frame { start, .. } => Some(start),
            Provenance::InferredDate { start, .. } => start,
            Provenance::InferredValue => None,
        }
    }

    /// End of the quarter, if known.
    #[must_use]
    pub const fn end(&self) -> Option<NaiveDate> {
        match self.provenance {
            Provenance::Explicit { end, .. } | Provenance::Frame { end, .. } => Some(end),
            Provenance::InferredDate { end, .. } => end,
            Provenance::InferredValue => None,
        }
    }

    /// Length of the quarter, if both ends are known.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        Some(self.end()? - self.start()?)
    }

    /// Fills whichever dates are still unknown. Known dates are never replaced.
    pub fn fill_dates(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        let (known_start, known_end) = match self.provenance {
            Provenance::Explicit { .. } | Provenance::Frame { .. } => return,
            Provenance::InferredValue => (None, None),
            Provenance::InferredDate { start, end } => (start, end),
        };
        let start = known_start.or(start);
        let end = known_end.or(end);
        if start.is_some() || end.is_some() {
            self.provenance = Provenance::InferredDate { start, end };
        }
    }
}

/// Annual total being consumed by the quarters of its fiscal year.
///
/// Every known quarter subtracts its value and its index from the running
/// remainder and weight. Once three distinct quarters have been absorbed the
/// weight is the index of the missing one and the remainder is its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyTotal {
    /// Fiscal year the total belongs to.
    pub fiscal_year: i32,
    remaining: i64,
    remaining_weight: u8,
    seen: u8,
}

impl YearlyTotal {
    /// Starts tracking a validated annual total.
    #[must_use]
    pub const fn new(fiscal_year: i32, total: i64) -> Self {
        Self {
            fiscal_year,
            remaining: total,
            // 1 + 2 + 3 + 4
            remaining_weight: 10,
            seen: 0,
        }
    }

    /// Subtracts a known quarter. A quarter already absorbed is ignored.
    pub fn absorb(&mut self, quarter: u8, value: i64) {
        if !(1..=4).contains(&quarter) {
            return;
        }
        let bit = 1 << (quarter - 1);
        if self.seen & bit != 0 {
            return;
        }
        self.seen |= bit;
        self.remaining_weight -= quarter;
        self.remaining = self.remaining.saturating_sub(value);
    }

    /// Value not yet accounted for by absorbed quarters.
    #[must_use]
    pub const fn remaining(&self) -> i64 {
        self.remaining
    }

    /// Index of the single missing quarter, once exactly three are known.
    #[must_use]
    pub const fn missing_quarter(&self) -> Option<u8> {
        if self.seen.count_ones() == 3 && self.remaining_weight > 0 && self.remaining_weight < 5 {
            Some(self.remaining_weight)
        } else {
            None
        }
    }
}

/// Inclusive date interval not covered by any quarter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeGap {
    /// First uncovered day.
    pub start: NaiveDate,
    /// Last uncovered day.
    pub end: NaiveDate,
}

impl TimeGap {
    /// Creates a gap, or `None` if the interval is empty.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Returns true if `[start, end]` shares at least one day with the gap.
    #[must_use]
    pub fn intersects(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end && end >= self.start
    }

    /// What remains of the gap once `[start, end]` is covered.
    ///
    /// Zero, one or two sub-intervals.
    #[must_use]
    pub fn remove(&self, start: NaiveDate, end: NaiveDate) -> Vec<Self> {
        if !self.intersects(start, end) {
            return vec![*self];
        }
        let before = start.pred_opt().and_then(|day| Self::new(self.start, day));
        let after = end.succ_opt().and_then(|day| Self::new(day, self.end));
        before.into_iter().chain(after).collect()
    }
}

impl fmt::Display for TimeGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_symbol_creation() {
        let symbol = Symbol::new(" aapl ");
        assert_eq!(symbol.as_str(), "AAPL");
    }

    #[test]
    fn test_cik_padding() {
        let cik: Cik = "320193".parse().unwrap();
        assert_eq!(cik.to_string(), "0000320193");
        assert_eq!(cik, "0000320193".parse().unwrap());
        assert!("AAPL".parse::<Cik>().is_err());
        assert!("12345678901".parse::<Cik>().is_err());
    }

    #[test]
    fn test_period_key_parse_and_order() {
        let key: PeriodKey = "2019Q3".parse().unwrap();
        assert_eq!((key.year(), key.quarter()), (2019, 3));
        assert_eq!(key.to_string(), "2019Q3");
        assert!("2019Q5".parse::<PeriodKey>().is_err());
        assert!("19Q1".parse::<PeriodKey>().is_err());
        assert!("2019Q3I".parse::<PeriodKey>().is_err());
        assert!("2019Q4".parse::<PeriodKey>().unwrap() < "2020Q1".parse().unwrap());
    }

    #[test]
    fn test_period_key_from_frame() {
        assert_eq!(
            PeriodKey::from_frame("CY2019Q3"),
            Some(PeriodKey::new(2019, 3).unwrap())
        );
        assert_eq!(PeriodKey::from_frame("CY2019"), None);
        assert_eq!(PeriodKey::from_frame("CY2019Q3I"), None);
    }

    #[test]
    fn test_period_key_calendar() {
        assert_eq!(PeriodKey::calendar(date(2020, 3, 31)).to_string(), "2020Q1");
        assert_eq!(PeriodKey::calendar(date(2020, 12, 26)).to_string(), "2020Q4");
    }

    #[test]
    fn test_front_running() {
        let on_time = RawFact::new("Revenues", "10-Q", Some(date(2020, 1, 1)), date(2020, 3, 31), 1)
            .with_fiscal(2020, FiscalPeriod::Q1);
        assert!(!on_time.is_front_running());

        let early = RawFact::new("Revenues", "10-Q", Some(date(2019, 9, 29)), date(2019, 12, 28), 1)
            .with_fiscal(2020, FiscalPeriod::Q1);
        assert!(!early.is_front_running());

        let late = RawFact::new("Revenues", "10-Q", Some(date(2020, 5, 1)), date(2020, 7, 31), 1)
            .with_fiscal(2020, FiscalPeriod::Q1);
        assert!(late.is_front_running());

        let past_first_day =
            RawFact::new("Revenues", "10-Q", Some(date(2020, 4, 2)), date(2020, 6, 30), 1)
                .with_fiscal(2020, FiscalPeriod::Q2);
        assert!(past_first_day.is_front_running());

        let unmarked = RawFact::new("Revenues", "8-K", Some(date(2020, 5, 1)), date(2020, 7, 31), 1);
        assert!(!unmarked.is_front_running());
    }

    #[test]
    fn test_yearly_total_missing_quarter() {
        let mut total = YearlyTotal::new(2020, 100);
        total.absorb(1, 20);
        total.absorb(2, 30);
        assert_eq!(total.missing_quarter(), None);
        total.absorb(3, 25);
        assert_eq!(total.missing_quarter(), Some(4));
        assert_eq!(total.remaining(), 25);

        // A repeated quarter does not count twice.
        total.absorb(3, 25);
        assert_eq!(total.remaining(), 25);
    }

    #[test]
    fn test_yearly_total_two_late_quarters() {
        let mut total = YearlyTotal::new(2020, 100);
        total.absorb(3, 25);
        total.absorb(4, 25);
        // Weight is 3 here, but two quarters are missing.
        assert_eq!(total.missing_quarter(), None);
    }

    #[test]
    fn test_fill_dates_keeps_known() {
        let key = PeriodKey::new(2020, 2).unwrap();
        let mut record = QuarterRecord::inferred(key, 10);
        record.fill_dates(Some(date(2020, 4, 1)), None);
        assert_eq!(record.start(), Some(date(2020, 4, 1)));
        assert_eq!(record.end(), None);
        record.fill_dates(Some(date(2021, 1, 1)), Some(date(2020, 6, 30)));
        assert_eq!(record.start(), Some(date(2020, 4, 1)));
        assert_eq!(record.end(), Some(date(2020, 6, 30)));

        let mut explicit = QuarterRecord::explicit(key, 10, date(2020, 4, 1), date(2020, 6, 30));
        explicit.fill_dates(Some(date(2021, 1, 1)), None);
        assert_eq!(explicit.start(), Some(date(2020, 4, 1)));
    }

    #[test]
    fn test_time_gap_remove() {
        let gap = TimeGap::new(date(2020, 1, 1), date(2020, 12, 31)).unwrap();
        let pieces = gap.remove(date(2020, 4, 1), date(2020, 6, 30));
        assert_eq!(
            pieces,
            vec![
                TimeGap::new(date(2020, 1, 1), date(2020, 3, 31)).unwrap(),
                TimeGap::new(date(2020, 7, 1), date(2020, 12, 31)).unwrap(),
            ]
        );
        assert!(gap.remove(date(2019, 1, 1), date(2021, 1, 1)).is_empty());
        assert_eq!(gap.remove(date(2021, 1, 1), date(2021, 3, 1)), vec![gap]);
    }
}
