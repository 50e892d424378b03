#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/findata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Quarterly fact reconciliation.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use findata_core::{Cik, FiscalRange, Metric};
//! use findata_reconcile::{Orchestrator, assemble};
//!
//! let orchestrator = Orchestrator::new(Arc::new(source));
//! let range = FiscalRange::from_quarters(2018, 1, 2020, 4)?;
//! let table = assemble(
//!     &orchestrator,
//!     Cik::new(320193),
//!     Metric::Revenue.label(),
//!     Metric::Revenue.concept_tags(),
//!     &range,
//! )
//! .await?;
//! print!("{table}");
//! ```

/// Bounds filtering and the final quarterly table.
pub mod assemble;
/// Gap scanning and frame backfill.
pub mod backfill;
/// Sorting raw facts into annual totals and quarter candidates.
pub mod classify;
/// Date inference for value-only quarters.
pub mod dates;
/// Per-key deduplication policies.
pub mod dedupe;
/// Fallback across candidate concept tags.
pub mod orchestrator;
/// Missing quarter synthesis from annual totals.
pub mod yearly;

#[cfg(test)]
mod testing;

pub use assemble::{END_COLUMN, PERIOD_COLUMN, QuarterTable, START_COLUMN, assemble};
pub use classify::{Classified, Pass, classify};
pub use orchestrator::{DEFAULT_CONCURRENCY, Orchestrator, PassOutput};
pub use yearly::{AnnualTotals, fill_missing_quarters};
