//! Collaborator traits for fetching facts and resolving filers.
//!
//! This module defines the two seams between the reconciliation engine and the
//! outside world:
//!
//! - [`FactSource`] - Fetches every reported fact for one concept tag of one filer
//! - [`IdentifierResolver`] - Maps a human ticker to the filer identifier

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{Cik, RawFact, Symbol},
};

/// Source of raw facts.
///
/// Implementations return facts in the repository's ingestion order; later
/// entries are treated as corrections of earlier ones.
#[async_trait]
pub trait FactSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g., "SEC EDGAR").
    fn name(&self) -> &str;

    /// Fetches all facts reported under `concept` by `filer`.
    ///
    /// # Errors
    ///
    /// [`DataError::NotApplicable`](crate::DataError::NotApplicable) when the
    /// filer never used the concept; any other variant for transport failures.
    async fn fetch_facts(&self, concept: &str, filer: Cik) -> Result<Vec<RawFact>>;
}

/// Resolves tickers to filer identifiers.
#[async_trait]
pub trait IdentifierResolver: Send + Sync + Debug {
    /// Looks up the CIK for a ticker.
    ///
    /// # Errors
    ///
    /// [`DataError::SymbolNotFound`](crate::DataError::SymbolNotFound) for an
    /// unknown ticker.
    async fn resolve(&self, symbol: &Symbol) -> Result<Cik>;
}
