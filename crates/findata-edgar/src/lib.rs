#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/findata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR fact source.
//!
//! This crate provides:
//!
//! - [`EdgarProvider`] - per-concept facts from the EDGAR XBRL API
//! - [`TickerDirectory`] - ticker to CIK lookup from the SEC ticker file
//!
//! # Example
//!
//! ```no_run
//! use findata_core::{Cik, FactSource};
//! use findata_edgar::EdgarProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = EdgarProvider::new("MyApp/1.0 (contact@example.com)")?;
//!
//!     let facts = provider.fetch_facts("Revenues", Cik::new(320193)).await?;
//!     for fact in facts {
//!         println!("{} {:?} {}", fact.end, fact.frame, fact.value);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod tickers;

pub use tickers::TickerDirectory;

use async_trait::async_trait;
use chrono::NaiveDate;
use findata_core::{Cik, DataError, FactSource, FiscalPeriod, RawFact, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument};

/// SEC EDGAR API base URL
const EDGAR_BASE_URL: &str = "https://data.sec.gov";

/// Taxonomy every concept tag is looked up in
const TAXONOMY: &str = "us-gaap";

/// The only unit facts are read in
const UNIT: &str = "USD";

/// Default rate limit: 10 requests per second (SEC requirement)
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// Rate limiter to ensure we don't exceed SEC's rate limits
#[derive(Debug)]
struct RateLimiter {
    last_request: Option<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    const fn new(min_interval: Duration) -> Self {
        Self {
            last_request: None,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// SEC EDGAR fact source.
///
/// Fetches facts from the `companyconcept` endpoint, one concept tag per
/// request. Requests are spaced per SEC requirements (max 10 requests/second)
/// across every clone sharing the same limiter.
#[derive(Debug, Clone)]
pub struct EdgarProvider {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    user_agent: String,
}

impl EdgarProvider {
    /// Create a new EDGAR provider with the specified user agent.
    ///
    /// The SEC requires identifying user agent headers. Format should be:
    /// "AppName/Version (contact@email.com)"
    ///
    /// # Errors
    ///
    /// [`DataError::InvalidParameter`] for an empty user agent, and
    /// [`DataError::Network`] if the HTTP client cannot be built.
    ///
    /// # Example
    /// ```
    /// use findata_edgar::EdgarProvider;
    ///
    /// let provider = EdgarProvider::new("MyApp/1.0 (contact@example.com)").unwrap();
    /// ```
    pub fn new(user_agent: &str) -> Result<Self> {
        if user_agent.trim().is_empty() {
            return Err(DataError::InvalidParameter(
                "EDGAR requires an identifying user agent".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DataError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, user_agent))
    }

    /// Create a new EDGAR provider with a custom HTTP client.
    ///
    /// The client is expected to send `user_agent` itself.
    ///
    /// # Example
    /// ```
    /// use findata_edgar::EdgarProvider;
    /// use std::time::Duration;
    ///
    /// let client = reqwest::Client::builder()
    ///     .timeout(Duration::from_secs(60))
    ///     .user_agent("MyApp/1.0 (contact@example.com)")
    ///     .build()
    ///     .unwrap();
    ///
    /// let provider = EdgarProvider::with_client(client, "MyApp/1.0 (contact@example.com)");
    /// ```
    #[must_use]
    pub fn with_client(client: reqwest::Client, user_agent: &str) -> Self {
        Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(DEFAULT_RATE_LIMIT))),
            user_agent: user_agent.to_string(),
        }
    }

    /// Set the minimum interval between two requests.
    #[must_use]
    pub fn with_rate_limit(mut self, min_interval: Duration) -> Self {
        self.rate_limiter = Arc::new(Mutex::new(RateLimiter::new(min_interval)));
        self
    }

    /// The user agent this provider identifies itself with.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// URL of one concept tag's facts for one filer.
    fn concept_url(concept: &str, filer: Cik) -> String {
        format!("{EDGAR_BASE_URL}/api/xbrl/companyconcept/CIK{filer}/{TAXONOMY}/{concept}.json")
    }

    /// Rate-limited GET returning the response body.
    ///
    /// Non-success statuses are handed to `on_status` to pick the error.
    async fn get_text(
        &self,
        url: &str,
        on_status: impl FnOnce(StatusCode, Option<Duration>) -> DataError + Send,
    ) -> Result<String> {
        self.rate_limiter.lock().await.wait().await;

        debug!(url, "Requesting");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(on_status(status, retry_after));
        }

        response
            .text()
            .await
            .map_err(|e| DataError::Network(format!("Failed to read response body: {e}")))
    }
}

#[async_trait]
impl FactSource for EdgarProvider {
    fn name(&self) -> &str {
        "SEC EDGAR"
    }

    #[instrument(skip(self), fields(filer = %filer))]
    async fn fetch_facts(&self, concept: &str, filer: Cik) -> Result<Vec<RawFact>> {
        if concept.is_empty() {
            return Err(DataError::InvalidParameter("Empty concept tag".to_string()));
        }

        let url = Self::concept_url(concept, filer);
        let body = self
            .get_text(&url, |status, retry_after| {
                status_error(status, concept, filer, retry_after)
            })
            .await?;

        let facts = parse_concept_facts(concept, &body)?;
        debug!(concept, facts = facts.len(), "Parsed concept facts");
        Ok(facts)
    }
}

/// Maps a non-success status of a concept request to an error.
///
/// EDGAR answers 404 for a concept the filer never reported and 403 for some
/// unknown filer/concept pairs; both mean the concept does not apply.
#[must_use]
pub fn status_error(
    status: StatusCode,
    concept: &str,
    filer: Cik,
    retry_after: Option<Duration>,
) -> DataError {
    match status {
        StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => DataError::NotApplicable {
            concept: concept.to_string(),
            filer: filer.to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => DataError::RateLimited {
            provider: "SEC EDGAR".to_string(),
            retry_after,
        },
        other => DataError::Network(format!(
            "Failed to fetch {concept} for CIK {filer}: HTTP {other}"
        )),
    }
}

/// Parses a `companyconcept` response body into facts, in response order.
///
/// Only the `USD` unit is read. Facts with unparseable dates or non-finite
/// values are skipped.
///
/// # Errors
///
/// [`DataError::Parse`] if the body is not a concept response.
pub fn parse_concept_facts(concept: &str, body: &str) -> Result<Vec<RawFact>> {
    let response: ConceptResponse = serde_json::from_str(body)
        .map_err(|e| DataError::Parse(format!("Failed to parse concept {concept}: {e}")))?;

    let Some(values) = response.units.get(UNIT) else {
        debug!(concept, "No USD facts reported");
        return Ok(Vec::new());
    };

    Ok(values
        .iter()
        .filter_map(|value| {
            let fact = value.to_raw_fact(concept);
            if fact.is_none() {
                debug!(concept, end = %value.end, accn = ?value.accn, "Skipping malformed fact");
            }
            fact
        })
        .collect())
}

// =============================================================================
// SEC API Response Types
// =============================================================================

/// Response from the SEC EDGAR Company Concept API.
#[derive(Debug, Deserialize)]
struct ConceptResponse {
    /// Facts keyed by unit (USD, shares, etc.)
    #[serde(default)]
    units: HashMap<String, Vec<FactValue>>,
}

/// A single fact value with metadata.
#[derive(Debug, Clone, Deserialize)]
struct FactValue {
    /// Start date of the period (absent for instant facts)
    #[serde(default)]
    start: Option<String>,
    /// End date of the period
    end: String,
    /// Value
    val: f64,
    /// Accession number
    #[serde(default)]
    accn: Option<String>,
    /// Fiscal year
    #[serde(default)]
    fy: Option<i32>,
    /// Fiscal period
    #[serde(default)]
    fp: Option<String>,
    /// Form type
    #[serde(default)]
    form: Option<String>,
    /// Frame (instant or duration)
    #[serde(default)]
    frame: Option<String>,
}

impl FactValue {
    fn to_raw_fact(&self, concept: &str) -> Option<RawFact> {
        let end = parse_date(&self.end)?;
        let start = match self.start.as_deref() {
            Some(start) => Some(parse_date(start)?),
            None => None,
        };
        if !self.val.is_finite() {
            return None;
        }

        #[allow(clippy::cast_possible_truncation)]
        let value = self.val.round() as i64;
        let form = self.form.as_deref().unwrap_or_default();

        let mut fact = RawFact::new(concept, form, start, end, value);
        fact.fiscal_year = self.fy;
        fact.fiscal_period = self.fp.as_deref().and_then(FiscalPeriod::parse);
        fact.frame = self.frame.clone();
        Some(fact)
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use findata_core::FormType;

    const REVENUES: &str = r#"{
        "cik": 320193,
        "taxonomy": "us-gaap",
        "tag": "Revenues",
        "label": "Revenues",
        "entityName": "Apple Inc.",
        "units": {
            "USD": [
                {"start": "2019-09-29", "end": "2020-09-26", "val": 274515000000,
                 "accn": "0000320193-20-000096", "fy": 2020, "fp": "FY",
                 "form": "10-K", "filed": "2020-10-30", "frame": "CY2020"},
                {"start": "2020-06-28", "end": "2020-09-26", "val": 64698000000,
                 "accn": "0000320193-20-000096", "fy": 2020, "fp": "FY",
                 "form": "10-K", "filed": "2020-10-30", "frame": "CY2020Q3"},
                {"start": "2019-12-29", "end": "2020-03-28", "val": 58313000000,
                 "accn": "0000320193-20-000052", "fy": 2020, "fp": "Q2",
                 "form": "10-Q", "filed": "2020-05-01"},
                {"start": "2019-12-29", "end": "2020-03-28", "val": 58313500000.4,
                 "accn": "0000320193-20-000062", "fy": 2020, "fp": "Q2",
                 "form": "10-Q/A", "filed": "2020-06-01"}
            ],
            "shares": [
                {"end": "2020-09-26", "val": 17000000000, "fy": 2020, "fp": "FY", "form": "10-K"}
            ]
        }
    }"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_concept_facts() {
        let facts = parse_concept_facts("Revenues", REVENUES).unwrap();
        assert_eq!(facts.len(), 4);

        let annual = &facts[0];
        assert_eq!(annual.concept, "Revenues");
        assert_eq!(annual.form, FormType::TenK);
        assert_eq!(annual.fiscal_year, Some(2020));
        assert_eq!(annual.fiscal_period, Some(FiscalPeriod::FY));
        assert_eq!(annual.start, Some(date(2019, 9, 29)));
        assert_eq!(annual.end, date(2020, 9, 26));
        assert_eq!(annual.value, 274_515_000_000);

        assert_eq!(facts[1].frame.as_deref(), Some("CY2020Q3"));
        assert_eq!(facts[2].frame, None);
        assert_eq!(facts[2].fiscal_period, Some(FiscalPeriod::Q2));
    }

    #[test]
    fn test_parse_keeps_response_order_and_amendments() {
        let facts = parse_concept_facts("Revenues", REVENUES).unwrap();
        assert_eq!(facts[3].form, FormType::TenQA);
        assert_eq!(facts[3].value, 58_313_500_000);
    }

    #[test]
    fn test_parse_skips_malformed_facts() {
        let body = r#"{"units": {"USD": [
            {"start": "2020-01-01", "end": "not a date", "val": 1},
            {"start": "2020-13-01", "end": "2020-03-31", "val": 2},
            {"start": "2020-01-01", "end": "2020-03-31", "val": 3, "fp": "H1", "form": "8-K"}
        ]}}"#;
        let facts = parse_concept_facts("Revenues", body).unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].value, 3);
        assert_eq!(facts[0].fiscal_period, None);
        assert_eq!(facts[0].form, FormType::Other("8-K".to_string()));
    }

    #[test]
    fn test_parse_without_usd_unit() {
        let body = r#"{"units": {"shares": [{"end": "2020-03-31", "val": 3}]}}"#;
        assert!(parse_concept_facts("Shares", body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let result = parse_concept_facts("Revenues", "<html>nope</html>");
        assert!(matches!(result, Err(DataError::Parse(_))));
    }

    #[test]
    fn test_status_mapping() {
        let filer = Cik::new(320193);
        assert!(status_error(StatusCode::NOT_FOUND, "X", filer, None).is_not_applicable());
        assert!(status_error(StatusCode::FORBIDDEN, "X", filer, None).is_not_applicable());

        let limited = status_error(
            StatusCode::TOO_MANY_REQUESTS,
            "X",
            filer,
            Some(Duration::from_secs(2)),
        );
        assert!(matches!(
            limited,
            DataError::RateLimited { retry_after: Some(d), .. } if d == Duration::from_secs(2)
        ));

        let server = status_error(StatusCode::BAD_GATEWAY, "X", filer, None);
        assert!(matches!(server, DataError::Network(_)));
    }

    #[test]
    fn test_concept_url() {
        assert_eq!(
            EdgarProvider::concept_url("Revenues", Cik::new(320193)),
            "https://data.sec.gov/api/xbrl/companyconcept/CIK0000320193/us-gaap/Revenues.json"
        );
    }

    #[test]
    fn test_provider_construction() {
        let provider = EdgarProvider::new("Test/1.0 (test@example.com)").unwrap();
        assert_eq!(provider.name(), "SEC EDGAR");
        assert_eq!(provider.user_agent(), "Test/1.0 (test@example.com)");

        assert!(matches!(
            EdgarProvider::new("  "),
            Err(DataError::InvalidParameter(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_concept_rejected() {
        let provider = EdgarProvider::new("Test/1.0 (test@example.com)").unwrap();
        let result = provider.fetch_facts("", Cik::new(1)).await;
        assert!(matches!(result, Err(DataError::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        let interval = Duration::from_millis(20);
        let mut limiter = RateLimiter::new(interval);

        let started = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        limiter.wait().await;
        assert!(started.elapsed() >= interval * 2);
    }
}
