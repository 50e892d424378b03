//! Fiscal period, form type and fiscal range definitions.
//!
//! This module defines [`FiscalPeriod`] for the filer-declared period marker,
//! [`FormType`] for the filing a fact came from, and [`FiscalRange`] for the
//! inclusive window a caller asks for.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DataError, Result};
use crate::types::PeriodKey;

/// Filer-declared fiscal period marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FiscalPeriod {
    /// First fiscal quarter.
    Q1,
    /// Second fiscal quarter.
    Q2,
    /// Third fiscal quarter.
    Q3,
    /// Fourth fiscal quarter.
    Q4,
    /// Full fiscal year.
    FY,
}

impl FiscalPeriod {
    /// Parses a repository marker (`"Q1"`..`"Q4"`, `"FY"`).
    ///
    /// Other markers the repository uses (half years, calendar years) return `None`.
    #[must_use]
    pub fn parse(marker: &str) -> Option<Self> {
        match marker {
            "Q1" => Some(Self::Q1),
            "Q2" => Some(Self::Q2),
            "Q3" => Some(Self::Q3),
            "Q4" => Some(Self::Q4),
            "FY" => Some(Self::FY),
            _ => None,
        }
    }

    /// Builds the marker for a quarter index (1-4).
    #[must_use]
    pub const fn from_quarter(quarter: u8) -> Option<Self> {
        match quarter {
            1 => Some(Self::Q1),
            2 => Some(Self::Q2),
            3 => Some(Self::Q3),
            4 => Some(Self::Q4),
            _ => None,
        }
    }

    /// Returns the quarter index (1-4), or `None` for a full year.
    #[must_use]
    pub const fn quarter(&self) -> Option<u8> {
        match self {
            Self::Q1 => Some(1),
            Self::Q2 => Some(2),
            Self::Q3 => Some(3),
            Self::Q4 => Some(4),
            Self::FY => None,
        }
    }

    /// Calendar month a fact tagged with this quarter may start in at the latest.
    #[must_use]
    pub const fn latest_start_month(&self) -> Option<u32> {
        match self {
            Self::Q1 => Some(1),
            Self::Q2 => Some(4),
            Self::Q3 => Some(7),
            Self::Q4 => Some(10),
            Self::FY => None,
        }
    }
}

impl fmt::Display for FiscalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
            Self::FY => "FY",
        };
        f.write_str(s)
    }
}

/// Form type of the filing a fact was reported in.
///
/// Matching is by exact equality. `"10-"` or `"Q"` are not quarterly forms.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormType {
    /// Original annual report.
    TenK,
    /// Amended annual report.
    TenKA,
    /// Original quarterly report.
    TenQ,
    /// Amended quarterly report.
    TenQA,
    /// Any other form (8-K, 20-F, S-1, ...).
    Other(String),
}

impl FormType {
    /// Parses a form type string.
    #[must_use]
    pub fn parse(form: &str) -> Self {
        match form {
            "10-K" => Self::TenK,
            "10-K/A" => Self::TenKA,
            "10-Q" => Self::TenQ,
            "10-Q/A" => Self::TenQA,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns true for an original (non-amended) annual filing.
    #[must_use]
    pub const fn is_original_annual(&self) -> bool {
        matches!(self, Self::TenK)
    }

    /// Returns true for a quarterly filing or its amendment.
    #[must_use]
    pub const fn is_quarterly(&self) -> bool {
        matches!(self, Self::TenQ | Self::TenQA)
    }

    /// Returns the form type as the repository spells it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::TenK => "10-K",
            Self::TenKA => "10-K/A",
            Self::TenQ => "10-Q",
            Self::TenQA => "10-Q/A",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FormType {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// A fiscal year and quarter used as one end of a [`FiscalRange`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuarterBound {
    /// Fiscal year.
    pub year: i32,
    /// Fiscal quarter (1-4).
    pub quarter: u8,
}

impl QuarterBound {
    /// Creates a bound, rejecting quarters outside 1-4.
    pub fn new(year: i32, quarter: u8) -> Result<Self> {
        if !(1..=4).contains(&quarter) {
            return Err(DataError::InvalidParameter(format!(
                "quarter must be between 1 and 4, got {quarter}"
            )));
        }
        Ok(Self { year, quarter })
    }
}

impl fmt::Display for QuarterBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

/// Inclusive fiscal window, from `start` through `end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FiscalRange {
    start: QuarterBound,
    end: QuarterBound,
}

impl Default for FiscalRange {
    /// Year 0 Q1 through the end of time.
    fn default() -> Self {
        Self {
            start: QuarterBound {
                year: 0,
                quarter: 1,
            },
            end: QuarterBound {
                year: i32::MAX,
                quarter: 4,
            },
        }
    }
}

impl FiscalRange {
    /// Creates a range, rejecting an end that precedes the start.
    pub fn new(start: QuarterBound, end: QuarterBound) -> Result<Self> {
        if end < start {
            return Err(DataError::InvalidParameter(format!(
                "range end {end} precedes start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Creates a range from raw year/quarter pairs.
    pub fn from_quarters(
        start_year: i32,
        start_quarter: u8,
        end_year: i32,
        end_quarter: u8,
    ) -> Result<Self> {
        Self::new(
            QuarterBound::new(start_year, start_quarter)?,
            QuarterBound::new(end_year, end_quarter)?,
        )
    }

    /// First quarter of the range.
    #[must_use]
    pub const fn start(&self) -> QuarterBound {
        self.start
    }

    /// Last quarter of the range.
    #[must_use]
    pub const fn end(&self) -> QuarterBound {
        self.end
    }

    /// Returns true if the period key lies inside the range.
    #[must_use]
    pub fn contains(&self, key: PeriodKey) -> bool {
        let year = key.year();
        let quarter = key.quarter();
        (self.start.year..=self.end.year).contains(&year)
            && (self.start.year < year || self.start.quarter <= quarter)
            && (year < self.end.year || quarter <= self.end.quarter)
    }

    /// Fiscal years whose facts are worth classifying.
    ///
    /// One year of slack on each side lets a boundary quarter be inferred from
    /// its neighbours.
    #[must_use]
    pub const fn fetch_years(&self) -> (i32, i32) {
        (
            self.start.year.saturating_sub(1),
            self.end.year.saturating_add(1),
        )
    }

    /// Number of quarters the range should contain.
    #[must_use]
    pub fn expected_quarters(&self) -> u64 {
        let start_year = i64::from(self.start.year);
        let end_year = i64::from(self.end.year);
        let start_quarter = i64::from(self.start.quarter);
        let end_quarter = i64::from(self.end.quarter);
        let count = if start_year == end_year {
            end_quarter - start_quarter + 1
        } else {
            ((end_year - start_year - 1) * 4).max(0) + (5 - start_quarter) + end_quarter
        };
        u64::try_from(count).unwrap_or(0)
    }
}

impl fmt::Display for FiscalRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

impl FromStr for FiscalPeriod {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| DataError::Parse(format!("unknown fiscal period {s:?}")))
    }
}
