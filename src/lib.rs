//! Glosswalk: a resumable glossary crawler
//!
//! This crate crawls a glossary website page-by-page and persists extracted
//! entries incrementally, so that many short, time-bounded runs behave like
//! one long-running crawl. Persistence is built on a page checkpoint,
//! size-bounded JSON shards, and a rebuildable duplicate index.

pub mod config;
pub mod crawler;
pub mod fetcher;
pub mod store;

use thiserror::Error;

/// Main error type for glosswalk operations
#[derive(Debug, Error)]
pub enum GlosswalkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetcher setup failed: {0}")]
    FetcherSetup(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for glosswalk operations
pub type Result<T> = std::result::Result<T, GlosswalkError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Controller, RunBudget, RunSummary};
pub use fetcher::{HttpFetcher, PageFetcher, PageFields, RetryPolicy};
pub use store::{Checkpoint, DuplicateIndex, Record, RecordStore};
