//! Ticker to CIK directory.

use std::collections::HashMap;

use async_trait::async_trait;
use findata_core::{Cik, DataError, IdentifierResolver, Result, Symbol};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::EdgarProvider;

/// SEC company tickers URL
const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// Company ticker information from SEC JSON.
#[derive(Debug, Deserialize)]
struct CompanyTickerInfo {
    /// CIK as a number (SEC returns this as an integer)
    cik_str: u64,
    /// Ticker symbol
    ticker: String,
}

/// Immutable ticker to CIK mapping, loaded once.
///
/// Lookups are case-insensitive. A company listed under several tickers maps
/// back to the first one in file order.
#[derive(Debug, Clone, Default)]
pub struct TickerDirectory {
    by_ticker: HashMap<Symbol, Cik>,
    by_cik: HashMap<Cik, Symbol>,
}

impl TickerDirectory {
    /// Downloads and indexes the SEC ticker file.
    ///
    /// # Errors
    ///
    /// [`DataError::Network`] if the download fails, [`DataError::Parse`] if
    /// the file is malformed.
    #[instrument(skip(provider))]
    pub async fn fetch(provider: &EdgarProvider) -> Result<Self> {
        let body = provider
            .get_text(COMPANY_TICKERS_URL, |status, _| {
                DataError::Network(format!("Failed to fetch company tickers: HTTP {status}"))
            })
            .await?;
        let directory = Self::from_json(&body)?;
        debug!(tickers = directory.len(), "Loaded ticker directory");
        Ok(directory)
    }

    /// Indexes the contents of a `company_tickers.json` file.
    ///
    /// # Errors
    ///
    /// [`DataError::Parse`] if `body` is not a ticker file.
    pub fn from_json(body: &str) -> Result<Self> {
        let data: HashMap<String, CompanyTickerInfo> = serde_json::from_str(body)
            .map_err(|e| DataError::Parse(format!("Failed to parse company tickers: {e}")))?;

        // Entries are keyed by their position in the file.
        let mut entries: Vec<(u64, CompanyTickerInfo)> = data
            .into_iter()
            .filter_map(|(index, info)| Some((index.parse().ok()?, info)))
            .collect();
        entries.sort_by_key(|(index, _)| *index);

        Ok(Self::from_entries(
            entries
                .into_iter()
                .map(|(_, info)| (info.ticker, Cik::new(info.cik_str))),
        ))
    }

    /// Builds a directory from `(ticker, cik)` pairs.
    ///
    /// A repeated ticker keeps its first CIK.
    pub fn from_entries<S: AsRef<str>>(entries: impl IntoIterator<Item = (S, Cik)>) -> Self {
        let mut directory = Self::default();
        for (ticker, cik) in entries {
            let symbol = Symbol::new(ticker.as_ref());
            if symbol.as_str().is_empty() {
                continue;
            }
            directory.by_cik.entry(cik).or_insert_with(|| symbol.clone());
            directory.by_ticker.entry(symbol).or_insert(cik);
        }
        directory
    }

    /// Looks up the CIK of a ticker.
    #[must_use]
    pub fn cik_for(&self, symbol: &Symbol) -> Option<Cik> {
        self.by_ticker.get(symbol).copied()
    }

    /// Looks up the primary ticker of a CIK.
    #[must_use]
    pub fn ticker_for(&self, cik: Cik) -> Option<&Symbol> {
        self.by_cik.get(&cik)
    }

    /// Number of tickers indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_ticker.len()
    }

    /// Returns true if no ticker is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_ticker.is_empty()
    }
}

#[async_trait]
impl IdentifierResolver for TickerDirectory {
    async fn resolve(&self, symbol: &Symbol) -> Result<Cik> {
        if symbol.as_str().is_empty() {
            return Err(DataError::InvalidParameter("Empty ticker".to_string()));
        }
        self.cik_for(symbol)
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))
    }
}
