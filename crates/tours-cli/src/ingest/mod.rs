//! Listing ingestion: extraction, reconciliation against the store, and the
//! run log.
//!
//! Page-level and record-level failures are logged and skipped; only a
//! browser that will not start or a run log that cannot be written fails the
//! run.

mod reconcile;
mod runner;

pub(crate) use runner::{launch_page, run_dry, run_scrape, RunSettings};
