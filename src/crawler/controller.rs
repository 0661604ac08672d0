//! Crawl controller: one bounded two-phase run
//!
//! Phase 1 walks listing pages from the checkpoint, collecting unseen entry
//! links. Phase 2 extracts fields from the collected links and flushes them
//! to the store in batches. Both phases share one wall-clock budget, and the
//! checkpoint advances after every attempted page whether or not it yielded
//! links, so a crash loses at most the in-memory batch, never page progress.

use crate::config::Config;
use crate::crawler::budget::RunBudget;
use crate::fetcher::PageFetcher;
use crate::store::{Checkpoint, Record, RecordStore};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Duration;

/// Counters for one run, purely observational
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Listing pages attempted (success or failure)
    pub pages_processed: u32,

    /// New entry URLs collected in Phase 1
    pub urls_collected: usize,

    /// Extractions that produced at least one non-empty field
    pub successful_extractions: usize,

    /// Extractions that came back all-empty
    pub failed_extractions: usize,

    /// Wall-clock time the run took
    pub elapsed: Duration,

    /// Page the next run will start from, or `None` when the range is done
    pub next_page: Option<u32>,
}

impl RunSummary {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            pages_processed: 0,
            urls_collected: 0,
            successful_extractions: 0,
            failed_extractions: 0,
            elapsed: Duration::ZERO,
            next_page: None,
        }
    }

    /// Logs the run outcome
    pub fn log(&self) {
        tracing::info!("Run complete (started {}):", self.started_at.to_rfc3339());
        tracing::info!("  Pages processed:        {}", self.pages_processed);
        tracing::info!("  URLs collected:         {}", self.urls_collected);
        tracing::info!("  Successful extractions: {}", self.successful_extractions);
        tracing::info!("  Failed extractions:     {}", self.failed_extractions);
        tracing::info!(
            "  Runtime:                {:.2} hours",
            self.elapsed.as_secs_f64() / 3600.0
        );
        match self.next_page {
            Some(page) => tracing::info!("Next run will start from page {}", page),
            None => tracing::info!("All pages complete"),
        }
    }
}

/// Orchestrates one bounded run against a store, checkpoint, and fetcher
///
/// Exclusively owns checkpoint mutation; the store owns shard mutation. The
/// fetcher is a trait parameter so tests can drive the controller without a
/// live site.
pub struct Controller<F: PageFetcher> {
    config: Config,
    store: RecordStore,
    checkpoint: Checkpoint,
    fetcher: F,
}

impl<F: PageFetcher> Controller<F> {
    pub fn new(config: Config, store: RecordStore, checkpoint: Checkpoint, fetcher: F) -> Self {
        Self {
            config,
            store,
            checkpoint,
            fetcher,
        }
    }

    /// Runs both phases once, within the configured wall-clock budget
    ///
    /// Short-circuits with zero fetch calls when the checkpoint has already
    /// reached the end of the page range. Checkpoint and shard write
    /// failures abort the run; fetch failures never do.
    pub async fn run(mut self) -> crate::Result<RunSummary> {
        let budget = RunBudget::start(
            Duration::from_secs(self.config.crawl.max_runtime_secs),
            Duration::from_secs(self.config.crawl.collect_margin_secs),
            Duration::from_secs(self.config.crawl.extract_margin_secs),
        );
        let mut summary = RunSummary::new(Utc::now());

        let last_page = self.checkpoint.load();
        let max_page = self.config.crawl.max_page;

        if last_page >= max_page {
            tracing::info!("All pages processed, crawling complete");
            summary.elapsed = budget.elapsed();
            return Ok(summary);
        }

        let first_page = last_page + 1;
        let target_page = last_page
            .saturating_add(self.config.crawl.pages_per_run)
            .min(max_page);
        tracing::info!(
            "Processing pages {} to {} ({} page(s)), {} URL(s) already stored",
            first_page,
            target_page,
            target_page - first_page + 1,
            self.store.record_count()
        );

        let batch = self
            .collect_links(first_page, target_page, &budget, &mut summary)
            .await?;
        summary.urls_collected = batch.len();
        tracing::info!(
            "Phase 1 complete: collected {} new URL(s) from {} page(s)",
            batch.len(),
            summary.pages_processed
        );

        if batch.is_empty() {
            tracing::info!("No new URLs to process, next run continues from the checkpoint");
        } else {
            self.extract_fields(&batch, &budget, &mut summary).await?;
        }

        summary.elapsed = budget.elapsed();
        let next_page = self.checkpoint.load() + 1;
        summary.next_page = (next_page <= max_page).then_some(next_page);
        summary.log();
        Ok(summary)
    }

    /// Phase 1: collect unseen entry links page by page
    ///
    /// The checkpoint is saved after every attempted page, including total
    /// failures, so the next run never revisits an attempted page.
    async fn collect_links(
        &mut self,
        first_page: u32,
        target_page: u32,
        budget: &RunBudget,
        summary: &mut RunSummary,
    ) -> crate::Result<HashSet<String>> {
        let mut batch: HashSet<String> = HashSet::new();

        for page in first_page..=target_page {
            if budget.collect_exhausted() {
                tracing::warn!("Approaching time limit, stopping link collection");
                break;
            }

            tokio::time::sleep(Duration::from_secs(self.config.fetch.page_pause_secs)).await;

            let url = self.config.site.page_url(page);
            tracing::info!("Fetching listing page {} ({})", page, url);
            let mut links = self.fetcher.fetch_links(&url).await;

            // One controller-level retry with a longer wait; the fetcher has
            // already exhausted its own bounded retries by now
            if links.is_empty() {
                tracing::warn!("Page {} returned no links, retrying once...", page);
                tokio::time::sleep(Duration::from_secs(self.config.fetch.retry_wait_secs)).await;
                links = self.fetcher.fetch_links(&url).await;
            }

            if links.is_empty() {
                tracing::error!("Page {} failed after retry, skipping", page);
            } else {
                let new_links: Vec<String> = links
                    .into_iter()
                    .filter(|link| !self.store.contains(link) && !batch.contains(link))
                    .collect();
                tracing::info!(
                    "Page {}: {} new link(s) (batch total: {})",
                    page,
                    new_links.len(),
                    batch.len() + new_links.len()
                );
                batch.extend(new_links);
            }

            self.checkpoint.save(page)?;
            summary.pages_processed += 1;
        }

        Ok(batch)
    }

    /// Phase 2: extract fields from the collected links, flushing in batches
    ///
    /// Whatever is buffered when the phase ends, early-exit included, is
    /// flushed unconditionally.
    async fn extract_fields(
        &mut self,
        batch: &HashSet<String>,
        budget: &RunBudget,
        summary: &mut RunSummary,
    ) -> crate::Result<()> {
        tracing::info!("Phase 2: extracting content from {} URL(s)", batch.len());

        let mut buffer: Vec<Record> = Vec::new();
        let total = batch.len();

        for (idx, url) in batch.iter().enumerate() {
            if budget.extract_exhausted() {
                tracing::warn!("Approaching time limit, stopping content extraction");
                break;
            }

            tokio::time::sleep(Duration::from_secs(self.config.fetch.entry_pause_secs)).await;

            let fields = self.fetcher.fetch_fields(url).await;
            if fields.is_empty() {
                summary.failed_extractions += 1;
                tracing::warn!("[{}/{}] Empty content: {}", idx + 1, total, url);
            } else {
                buffer.push(fields.into_record(url.clone()));
                summary.successful_extractions += 1;
                tracing::info!("[{}/{}] Extracted: {}", idx + 1, total, url);
            }

            if buffer.len() >= self.config.crawl.batch_size {
                let appended = self.store.append(&buffer)?;
                tracing::info!(
                    "Flushed batch of {} record(s) ({} new)",
                    buffer.len(),
                    appended
                );
                buffer.clear();
            }
        }

        if !buffer.is_empty() {
            let appended = self.store.append(&buffer)?;
            tracing::info!(
                "Flushed final batch of {} record(s) ({} new)",
                buffer.len(),
                appended
            );
        }

        Ok(())
    }
}
