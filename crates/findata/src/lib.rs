#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/findata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Quarterly fundamentals from SEC XBRL filings.
//!
//! This crate re-exports the core types, the reconciliation engine and the
//! EDGAR collaborators, and provides [`FinData`] for fetching reconciled
//! tables by ticker.
//!
//! # Features
//!
//! - `edgar` - SEC EDGAR fact source and ticker directory (default)

/// The [`FinData`] client.
pub mod client;
/// [`MetricTable`] and its DataFrame export.
pub mod table;

pub use client::FinData;
pub use table::MetricTable;

// Core types and traits
pub use findata_core::*;

// Engine
pub use findata_reconcile::{
    END_COLUMN, Orchestrator, PERIOD_COLUMN, QuarterTable, START_COLUMN, assemble,
};

// Providers
#[cfg(feature = "edgar")]
pub use findata_edgar::{EdgarProvider, TickerDirectory};
