//! Scripted fact source and fact builders shared by the engine's tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use findata_core::{Cik, DataError, FactSource, FiscalPeriod, RawFact, Result};

#[derive(Debug, Clone)]
enum Script {
    Facts(Vec<RawFact>),
    NotApplicable,
    Broken,
}

/// Fact source answering from a fixed script. Unscripted tags are not applicable.
#[derive(Debug, Default)]
pub(crate) struct ScriptedSource {
    scripts: HashMap<String, Script>,
    delays: HashMap<String, Duration>,
    breaks_after: HashMap<String, usize>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn facts(mut self, tag: &str, facts: Vec<RawFact>) -> Self {
        self.scripts.insert(tag.to_string(), Script::Facts(facts));
        self
    }

    pub(crate) fn not_applicable(mut self, tag: &str) -> Self {
        self.scripts.insert(tag.to_string(), Script::NotApplicable);
        self
    }

    pub(crate) fn broken(mut self, tag: &str) -> Self {
        self.scripts.insert(tag.to_string(), Script::Broken);
        self
    }

    /// Answers `tag` from its script for the first `calls` fetches, then fails.
    pub(crate) fn broken_after(mut self, tag: &str, calls: usize) -> Self {
        self.breaks_after.insert(tag.to_string(), calls);
        self
    }

    pub(crate) fn delay(mut self, tag: &str, delay: Duration) -> Self {
        self.delays.insert(tag.to_string(), delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl FactSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_facts(&self, concept: &str, filer: Cik) -> Result<Vec<RawFact>> {
        let earlier = match self.calls.lock() {
            Ok(mut calls) => {
                let earlier = calls.iter().filter(|call| *call == concept).count();
                calls.push(concept.to_string());
                earlier
            }
            Err(_) => 0,
        };
        if let Some(delay) = self.delays.get(concept) {
            tokio::time::sleep(*delay).await;
        }
        if self.breaks_after.get(concept).is_some_and(|limit| earlier >= *limit) {
            return Err(DataError::Network("connection reset".to_string()));
        }
        match self.scripts.get(concept) {
            Some(Script::Facts(facts)) => Ok(facts.clone()),
            Some(Script::Broken) => Err(DataError::Network("connection reset".to_string())),
            Some(Script::NotApplicable) | None => Err(DataError::NotApplicable {
                concept: concept.to_string(),
                filer: filer.to_string(),
            }),
        }
    }
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// First and last day of a calendar quarter.
pub(crate) fn quarter_dates(year: i32, quarter: u8) -> (NaiveDate, NaiveDate) {
    let month = u32::from(quarter) * 3 - 2;
    let start = date(year, month, 1);
    let end = if quarter == 4 {
        date(year, 12, 31)
    } else {
        date(year, month + 3, 1).pred_opt().unwrap()
    };
    (start, end)
}

/// A 10-Q fact for a calendar-aligned fiscal quarter.
pub(crate) fn quarterly_fact(concept: &str, year: i32, quarter: u8, value: i64) -> RawFact {
    let (start, end) = quarter_dates(year, quarter);
    RawFact::new(concept, "10-Q", Some(start), end, value)
        .with_fiscal(year, FiscalPeriod::from_quarter(quarter).unwrap())
}

/// A 10-K fact for a calendar-aligned fiscal year.
pub(crate) fn annual_fact(concept: &str, year: i32, value: i64) -> RawFact {
    RawFact::new(concept, "10-K", Some(date(year, 1, 1)), date(year, 12, 31), value)
        .with_fiscal(year, FiscalPeriod::FY)
}

/// A quarter-length fact from a 10-K, aligned to a calendar frame.
pub(crate) fn frame_fact(concept: &str, year: i32, quarter: u8, value: i64) -> RawFact {
    let (start, end) = quarter_dates(year, quarter);
    RawFact::new(concept, "10-K", Some(start), end, value)
        .with_fiscal(year, FiscalPeriod::FY)
        .with_frame(format!("CY{year}Q{quarter}"))
}
