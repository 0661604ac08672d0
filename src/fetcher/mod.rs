//! Page fetcher: navigation, challenge handling, and extraction
//!
//! The crawl controller talks to the target site only through the
//! [`PageFetcher`] trait, so tests can substitute a mock. The production
//! implementation is [`HttpFetcher`]: reqwest + scraper with bounded
//! retries, fixed backoff, and challenge-page detection. Fetch failures
//! never propagate out of the trait; exhausted retries degrade to an empty
//! result, and the next scheduled run is the recovery mechanism.

mod challenge;
mod client;
mod http;
mod retry;

pub use challenge::is_challenge_page;
pub use client::build_http_client;
pub use http::{FetchError, HttpFetcher};
pub use retry::RetryPolicy;

/// Text fields extracted from one entry page
///
/// Individually missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFields {
    pub h1: String,
    pub h2: String,
    pub content: String,
}

impl PageFields {
    /// True if every field is empty (a failed extraction)
    pub fn is_empty(&self) -> bool {
        self.h1.is_empty() && self.h2.is_empty() && self.content.is_empty()
    }

    /// Attaches the source URL, producing a storable record
    pub fn into_record(self, url: impl Into<String>) -> crate::store::Record {
        crate::store::Record {
            url: url.into(),
            h1: self.h1,
            h2: self.h2,
            content: self.content,
        }
    }
}

/// External collaborator contract for fetching pages
///
/// Both operations degrade instead of failing: `fetch_links` returns an
/// empty list and `fetch_fields` all-empty fields once their bounded
/// retries are exhausted.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    /// Fetches every entry link on a listing page, deduplicated
    async fn fetch_links(&self, url: &str) -> Vec<String>;

    /// Fetches the text fields of one entry page
    async fn fetch_fields(&self, url: &str) -> PageFields;
}
