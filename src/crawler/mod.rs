//! Crawl orchestration
//!
//! One invocation is one bounded run: read the checkpoint, collect entry
//! links (Phase 1), extract fields (Phase 2), persist incrementally, and
//! leave the checkpoint pointing at the last attempted page. Scheduling
//! repeated runs until the page range is exhausted is the caller's job.

mod budget;
mod controller;

pub use budget::RunBudget;
pub use controller::{Controller, RunSummary};

use crate::config::Config;
use crate::fetcher::HttpFetcher;
use crate::store::{Checkpoint, RecordStore};
use std::path::Path;

/// Runs one complete crawl invocation with the production HTTP fetcher
///
/// Opens the record store and checkpoint in the configured data directory,
/// builds the fetcher (a setup failure here aborts the run), and drives the
/// controller once.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - The run finished, possibly early on its time budget
/// * `Err(GlosswalkError)` - Setup failed or persisted state could not be written
pub async fn crawl(config: Config) -> crate::Result<RunSummary> {
    let store = RecordStore::open(&config.storage)?;
    let checkpoint = Checkpoint::new(
        Path::new(&config.storage.data_dir),
        config.crawl.start_page,
    );
    let fetcher = HttpFetcher::new(config.site.clone(), config.fetch.clone())?;

    let controller = Controller::new(config, store, checkpoint, fetcher);
    controller.run().await
}
