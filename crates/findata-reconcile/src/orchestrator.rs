//! Concept tag fallback.
//!
//! Filers report the same metric under different concept tags, sometimes
//! switching tags between years. The orchestrator runs the per-tag pipeline
//! for every candidate tag and concatenates what each one produced.

use std::fmt;
use std::sync::Arc;

use findata_core::{Cik, DataError, FactSource, FiscalRange, QuarterRecord, RawFact, Result};
use futures::{StreamExt, stream};
use tracing::{debug, instrument, warn};

use crate::backfill;
use crate::classify::{Pass, classify};
use crate::dedupe;
use crate::yearly::{AnnualTotals, merge_later_wins};

/// Default number of concept tags fetched at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// What one pass over all candidate tags produced.
#[derive(Debug, Default)]
pub struct PassOutput {
    /// Quarters of every successful tag, concatenated in tag priority order.
    /// Keys may repeat across tags.
    pub quarters: Vec<QuarterRecord>,
    /// Annual totals of every successful tag; later tags win on a shared year.
    pub annual: AnnualTotals,
    /// Number of tags fetched successfully.
    pub succeeded: usize,
    /// Number of tags whose fetch failed.
    pub failed: usize,
}

/// Runs the per-tag pipeline across an ordered list of concept tags.
///
/// Fetches run concurrently, bounded by [`Orchestrator::with_concurrency`],
/// but results are always merged in tag order.
#[derive(Clone)]
pub struct Orchestrator {
    source: Arc<dyn FactSource>,
    concurrency: usize,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("source", &self.source.name())
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl Orchestrator {
    /// Create an orchestrator over a fact source.
    #[must_use]
    pub fn new(source: Arc<dyn FactSource>) -> Self {
        Self {
            source,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set how many tags may be fetched at once (at least one).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// The underlying fact source.
    #[must_use]
    pub fn source(&self) -> &Arc<dyn FactSource> {
        &self.source
    }

    /// Run one pass over `tags` for `filer`.
    ///
    /// A tag whose fetch fails, whether because the filer never used it or
    /// because of a transport error, is skipped.
    ///
    /// # Errors
    ///
    /// [`DataError::InvalidParameter`] if `tags` is empty, and
    /// [`DataError::DataNotAvailable`] if every tag failed.
    #[instrument(skip(self, tags, pass), fields(filer = %filer, range = %range))]
    pub async fn run(
        &self,
        filer: Cik,
        tags: &[&str],
        range: &FiscalRange,
        pass: Pass<'_>,
    ) -> Result<PassOutput> {
        if tags.is_empty() {
            return Err(DataError::InvalidParameter(
                "No concept tags to query".to_string(),
            ));
        }

        let fetched: Vec<(&str, Result<Vec<RawFact>>)> = stream::iter(tags.iter().copied())
            .map(|tag| async move {
                debug!(concept = tag, "Fetching facts");
                (tag, self.source.fetch_facts(tag, filer).await)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let (low, high) = range.fetch_years();
        let years = low..=high;
        let mut output = PassOutput::default();

        for (tag, result) in fetched {
            let facts = match result {
                Ok(facts) => facts,
                Err(e) if e.is_not_applicable() => {
                    debug!(concept = tag, "Concept not used by filer, trying next");
                    output.failed += 1;
                    continue;
                }
                Err(e) => {
                    warn!(concept = tag, error = %e, "Concept fetch failed, trying next");
                    output.failed += 1;
                    continue;
                }
            };

            let classified = classify(&facts, &years, pass);
            let mut quarters: Vec<QuarterRecord> =
                dedupe::last_wins(classified.quarters).into_values().collect();
            if matches!(pass, Pass::Primary) {
                backfill::backfill(&mut quarters, &classified.backfill);
            }

            debug!(
                concept = tag,
                quarters = quarters.len(),
                annual = classified.annual.len(),
                "Concept reconciled"
            );
            output.quarters.extend(quarters);
            merge_later_wins(&mut output.annual, classified.annual);
            output.succeeded += 1;
        }

        if output.succeeded == 0 {
            return Err(DataError::DataNotAvailable {
                symbol: filer.to_string(),
                start: range.start().to_string(),
                end: range.end().to_string(),
            });
        }

        Ok(output)
    }
}
