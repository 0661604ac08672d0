//! HTTP implementation of the page fetcher
//!
//! Each fetch builds a fresh client (session isolation), GETs the page,
//! waits out challenge interstitials within a bounded window, and extracts
//! links or fields with scraper selectors. Transient failures are retried
//! with a fixed backoff; exhausted retries degrade to empty results and are
//! logged, never propagated.

use crate::config::{FetchConfig, SiteConfig};
use crate::fetcher::challenge::is_challenge_page;
use crate::fetcher::client::build_http_client;
use crate::fetcher::retry::RetryPolicy;
use crate::fetcher::{PageFetcher, PageFields};
use crate::GlosswalkError;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use url::Url;

/// Errors internal to a single fetch attempt
///
/// These never escape the [`PageFetcher`] contract; they only drive the
/// retry loop and the log output.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Challenge page did not clear for {url} within {timeout:?}")]
    ChallengeNotCleared { url: String, timeout: Duration },

    #[error("No entry links found on {url}")]
    NoLinks { url: String },
}

/// reqwest + scraper page fetcher
pub struct HttpFetcher {
    site: SiteConfig,
    fetch: FetchConfig,
    base: Url,
    link_selector: Selector,
    h1_selector: Selector,
    h2_selector: Selector,
    content_selector: Selector,
}

impl HttpFetcher {
    /// Creates the fetcher, failing fast on unusable configuration
    ///
    /// Selector or client construction failure here is a fatal setup error:
    /// the run aborts immediately rather than degrading.
    pub fn new(site: SiteConfig, fetch: FetchConfig) -> crate::Result<Self> {
        let base = Url::parse(&site.base_url)?;

        let parse = |name: &str, s: &str| {
            Selector::parse(s)
                .map_err(|e| GlosswalkError::FetcherSetup(format!("{} {:?}: {}", name, s, e)))
        };
        let link_selector = parse("link selector", &site.link_selector)?;
        let h1_selector = parse("h1 selector", &site.h1_selector)?;
        let h2_selector = parse("h2 selector", &site.h2_selector)?;
        let content_selector = parse("content selector", &site.content_selector)?;

        // Probe the client builder now so a broken TLS/config surface aborts
        // the run instead of failing every fetch
        build_http_client(&fetch).map_err(|e| GlosswalkError::FetcherSetup(e.to_string()))?;

        Ok(Self {
            site,
            fetch,
            base,
            link_selector,
            h1_selector,
            h2_selector,
            content_selector,
        })
    }

    /// One GET returning the body, with HTTP errors mapped to `FetchError`
    async fn get_once(&self, client: &Client, url: &str) -> Result<String, FetchError> {
        let response = client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// Fetches a page and waits out any challenge interstitial
    ///
    /// Re-requests the page (the HTTP analogue of a forced refresh) every
    /// poll interval until the challenge clears or the window expires.
    async fn get_page(&self, url: &str) -> Result<String, FetchError> {
        let client = build_http_client(&self.fetch)?;
        let timeout = Duration::from_secs(self.fetch.challenge_timeout_secs);
        let deadline = Instant::now() + timeout;

        let mut body = self.get_once(&client, url).await?;
        while is_challenge_page(&body, &self.site.challenge_keywords) {
            if Instant::now() >= deadline {
                return Err(FetchError::ChallengeNotCleared {
                    url: url.to_string(),
                    timeout,
                });
            }
            tracing::warn!("Challenge page detected on {}, waiting for clearance...", url);
            tokio::time::sleep(Duration::from_secs(self.fetch.challenge_poll_secs)).await;
            body = self.get_once(&client, url).await?;
        }

        Ok(body)
    }

    /// True if an absolute URL points at a glossary entry on the target site
    fn is_entry_link(&self, url: &Url) -> bool {
        let host_ok = url.host_str().is_some_and(|host| {
            host == self.site.host || host.ends_with(&format!(".{}", self.site.host))
        });
        host_ok
            && self
                .site
                .link_patterns
                .iter()
                .any(|pattern| url.path().contains(pattern.as_str()))
    }

    /// Extracts entry links from a listing page body, deduplicated in order
    ///
    /// Zero matches count as a failed attempt: mid-range listing pages
    /// always carry entries, so an empty result means the page did not
    /// render and is worth a retry.
    fn extract_links(&self, url: &str, body: &str) -> Result<Vec<String>, FetchError> {
        let document = Html::parse_document(body);

        let mut seen = HashSet::new();
        let mut links = Vec::new();
        for anchor in document.select(&self.link_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Ok(absolute) = self.base.join(href) else {
                continue;
            };
            if self.is_entry_link(&absolute) && seen.insert(absolute.to_string()) {
                links.push(absolute.into());
            }
        }

        if links.is_empty() {
            return Err(FetchError::NoLinks {
                url: url.to_string(),
            });
        }
        Ok(links)
    }

    /// Extracts the three text fields from an entry page body
    fn extract_fields(&self, body: &str) -> PageFields {
        let document = Html::parse_document(body);
        PageFields {
            h1: select_text(&document, &self.h1_selector),
            h2: select_text(&document, &self.h2_selector),
            content: select_text(&document, &self.content_selector),
        }
    }
}

/// Whitespace-normalized text of the first element matching the selector
///
/// A missing element yields an empty string; fields are individually
/// tolerant of absence.
fn select_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .next()
        .map(|el| {
            el.text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

impl PageFetcher for HttpFetcher {
    async fn fetch_links(&self, url: &str) -> Vec<String> {
        let policy = RetryPolicy::new(
            self.fetch.link_retries,
            Duration::from_secs(self.fetch.retry_wait_secs),
        );

        let result = policy
            .run(&format!("Listing page {}", url), |_attempt| async move {
                let body = self.get_page(url).await?;
                self.extract_links(url, &body)
            })
            .await;

        match result {
            Ok(links) => {
                tracing::info!("Found {} link(s) on {}", links.len(), url);
                links
            }
            Err(_) => Vec::new(),
        }
    }

    async fn fetch_fields(&self, url: &str) -> PageFields {
        let policy = RetryPolicy::new(
            self.fetch.field_retries,
            Duration::from_secs(self.fetch.retry_wait_secs),
        );

        let result = policy
            .run(&format!("Entry page {}", url), |_attempt| async move {
                let body = self.get_page(url).await?;
                Ok::<_, FetchError>(self.extract_fields(&body))
            })
            .await;

        result.unwrap_or_default()
    }
}
