//! Error types for data operations.
//!
//! This module defines [`DataError`] which covers all error cases that can occur
//! when resolving filers, fetching facts, or reconciling a quarterly series.

use thiserror::Error;

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// Network-related errors (connection failures, unexpected HTTP status, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The requested ticker could not be mapped to a filer.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The concept tag does not exist for this filer.
    #[error("Concept {concept} not applicable to filer {filer}")]
    NotApplicable {
        /// The concept tag that was requested.
        concept: String,
        /// The filer the concept was requested for.
        filer: String,
    },

    /// No candidate concept produced any data for the requested range.
    #[error("Data not available for {symbol} in range {start} to {end}")]
    DataNotAvailable {
        /// The ticker or filer that was requested.
        symbol: String,
        /// Start of the requested fiscal range.
        start: String,
        /// End of the requested fiscal range.
        end: String,
    },

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl DataError {
    /// Returns true if the error means the concept simply does not apply to the filer.
    #[must_use]
    pub const fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NotApplicable { .. })
    }
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;
