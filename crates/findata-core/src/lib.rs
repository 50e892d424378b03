#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/findata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for quarterly fundamentals reconciliation.
//!
//! This crate provides the foundational abstractions shared by the engine and
//! the providers:
//!
//! - [`FactSource`](provider::FactSource) - Fetches raw facts for one concept tag
//! - [`IdentifierResolver`](provider::IdentifierResolver) - Maps tickers to filer identifiers
//! - [`RawFact`](types::RawFact) - A single reported fact, as the repository returns it
//! - [`QuarterRecord`](types::QuarterRecord) - One reconciled quarter of a metric
//! - [`FiscalRange`](period::FiscalRange) - Inclusive fiscal window requested by a caller
//! - [`Metric`](metric::Metric) - Catalogue of supported metrics and their concept tags

/// Error types for data operations.
pub mod error;
/// Metric catalogue and concept tag lists.
pub mod metric;
/// Fiscal period, form type and fiscal range definitions.
pub mod period;
/// Collaborator traits for fetching facts and resolving filers.
pub mod provider;
/// Core data types (Symbol, Cik, RawFact, QuarterRecord, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use error::{DataError, Result};
pub use metric::Metric;
pub use period::{FiscalPeriod, FiscalRange, FormType, QuarterBound};
pub use provider::{FactSource, IdentifierResolver};
pub use types::{
    Cik, PeriodKey, Provenance, QuarterRecord, RawFact, Symbol, TimeGap, YearlyTotal,
};
