//! Batch orchestration for wikiloot.
//!
//! This crate ties fetching, extraction, and table output together into the
//! `parse` workflow: every input row is fetched, its page is extracted, and
//! the results are split into an enriched table and an error table.

pub mod ledger;
pub mod pipeline;
pub mod progress;

pub use ledger::ErrorLedger;
pub use pipeline::{BatchOptions, BatchOutcome, RowResult, run_batch, save_outcome};
pub use progress::{ProgressReporter, ProgressTracker, SilentProgress};
