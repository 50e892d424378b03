//! High-level client tying a fact source and a ticker resolver to the engine.

use std::fmt;
use std::sync::Arc;

use findata_core::{
    Cik, DataError, FactSource, FiscalRange, IdentifierResolver, Metric, Result, Symbol,
};
use findata_reconcile::{Orchestrator, assemble};
use tracing::{debug, instrument};

use crate::table::MetricTable;

/// Client returning reconciled quarterly tables by ticker.
///
/// # Example
///
/// ```rust,ignore
/// use findata::{FinData, FiscalRange, Metric};
///
/// let client = FinData::with_edgar("MyApp/1.0 (contact@example.com)").await?;
///
/// // Everything on file.
/// let income = client.get_metric("MSFT", Metric::NetIncome, FiscalRange::default()).await?;
///
/// // A CIK works too.
/// let revenue = client
///     .get_revenue("320193", FiscalRange::from_quarters(2019, 1, 2020, 4)?)
///     .await?;
/// ```
#[derive(Clone)]
pub struct FinData {
    orchestrator: Orchestrator,
    resolver: Arc<dyn IdentifierResolver>,
}

impl fmt::Debug for FinData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinData")
            .field("orchestrator", &self.orchestrator)
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl FinData {
    /// Create a client over a fact source and a ticker resolver.
    #[must_use]
    pub fn new(source: Arc<dyn FactSource>, resolver: Arc<dyn IdentifierResolver>) -> Self {
        debug!(source = source.name(), "Creating client");
        Self {
            orchestrator: Orchestrator::new(source),
            resolver,
        }
    }

    /// Create a client backed by SEC EDGAR.
    ///
    /// Downloads the SEC ticker file once; the directory is not refreshed.
    ///
    /// # Errors
    ///
    /// Fails if `user_agent` is empty or the ticker file cannot be loaded.
    #[cfg(feature = "edgar")]
    pub async fn with_edgar(user_agent: &str) -> Result<Self> {
        let provider = findata_edgar::EdgarProvider::new(user_agent)?;
        let directory = findata_edgar::TickerDirectory::fetch(&provider).await?;
        Ok(Self::new(Arc::new(provider), Arc::new(directory)))
    }

    /// Set how many concept tags may be fetched at once.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.orchestrator = self.orchestrator.with_concurrency(concurrency);
        self
    }

    /// Resolves a ticker, or reads a CIK when the input is all digits.
    ///
    /// # Errors
    ///
    /// [`DataError::InvalidParameter`] for empty input and whatever the
    /// resolver reports for an unknown ticker.
    pub async fn resolve(&self, ticker_or_id: &str) -> Result<(Symbol, Cik)> {
        let symbol = Symbol::new(ticker_or_id);
        if symbol.as_str().is_empty() {
            return Err(DataError::InvalidParameter(
                "Empty ticker or identifier".to_string(),
            ));
        }
        if symbol.as_str().bytes().all(|b| b.is_ascii_digit()) {
            let cik = symbol.as_str().parse()?;
            return Ok((symbol, cik));
        }
        let cik = self.resolver.resolve(&symbol).await?;
        debug!(symbol = %symbol, cik = %cik, "Resolved ticker");
        Ok((symbol, cik))
    }

    /// Reconciled quarterly table of one catalogue metric.
    ///
    /// Pass [`FiscalRange::default()`] for everything on file.
    ///
    /// # Errors
    ///
    /// Fails if the ticker cannot be resolved or none of the metric's concept
    /// tags could be fetched. Missing quarters are not an error; see
    /// [`MetricTable::missing_periods`].
    pub async fn get_metric(
        &self,
        ticker_or_id: &str,
        metric: Metric,
        range: FiscalRange,
    ) -> Result<MetricTable> {
        self.get_concepts(ticker_or_id, metric.label(), metric.concept_tags(), range)
            .await
    }

    /// Reconciled quarterly table over an arbitrary, priority-ordered list of
    /// us-gaap concept tags.
    ///
    /// # Errors
    ///
    /// As [`FinData::get_metric`], plus [`DataError::InvalidParameter`] for
    /// an empty tag list.
    #[instrument(skip(self, tags, range), fields(range = %range))]
    pub async fn get_concepts(
        &self,
        ticker_or_id: &str,
        label: &str,
        tags: &[&str],
        range: FiscalRange,
    ) -> Result<MetricTable> {
        let (symbol, cik) = self.resolve(ticker_or_id).await?;
        let table = assemble(&self.orchestrator, cik, label, tags, &range)
            .await
            .map_err(|e| match e {
                DataError::DataNotAvailable { start, end, .. } => DataError::DataNotAvailable {
                    symbol: symbol.to_string(),
                    start,
                    end,
                },
                other => other,
            })?;
        Ok(MetricTable::new(symbol, cik, range, table))
    }

    /// Quarterly revenue.
    ///
    /// # Errors
    ///
    /// See [`FinData::get_metric`].
    pub async fn get_revenue(&self, ticker_or_id: &str, range: FiscalRange) -> Result<MetricTable> {
        self.get_metric(ticker_or_id, Metric::Revenue, range).await
    }

    /// Quarterly cost of revenue.
    ///
    /// # Errors
    ///
    /// See [`FinData::get_metric`].
    pub async fn get_cost_of_revenue(
        &self,
        ticker_or_id: &str,
        range: FiscalRange,
    ) -> Result<MetricTable> {
        self.get_metric(ticker_or_id, Metric::CostOfRevenue, range).await
    }

    /// Quarterly gross profit.
    ///
    /// # Errors
    ///
    /// See [`FinData::get_metric`].
    pub async fn get_gross_profit(
        &self,
        ticker_or_id: &str,
        range: FiscalRange,
    ) -> Result<MetricTable> {
        self.get_metric(ticker_or_id, Metric::GrossProfit, range).await
    }

    /// Quarterly operating expenses.
    ///
    /// # Errors
    ///
    /// See [`FinData::get_metric`].
    pub async fn get_operating_expenses(
        &self,
        ticker_or_id: &str,
        range: FiscalRange,
    ) -> Result<MetricTable> {
        self.get_metric(ticker_or_id, Metric::OperatingExpenses, range)
            .await
    }

    /// Quarterly operating income.
    ///
    /// # Errors
    ///
    /// See [`FinData::get_metric`].
    pub async fn get_operating_income(
        &self,
        ticker_or_id: &str,
        range: FiscalRange,
    ) -> Result<MetricTable> {
        self.get_metric(ticker_or_id, Metric::OperatingIncome, range)
            .await
    }

    /// Quarterly net income.
    ///
    /// # Errors
    ///
    /// See [`FinData::get_metric`].
    pub async fn get_net_income(&self, ticker_or_id: &str, range: FiscalRange) -> Result<MetricTable> {
        self.get_metric(ticker_or_id, Metric::NetIncome, range).await
    }
}
