//! Configuration loading and validation
//!
//! Configuration lives in an optional TOML file with four sections:
//! `[crawl]` (page range and run budget), `[site]` (URLs and selectors),
//! `[fetch]` (timeouts, retries, politeness delays), and `[storage]`
//! (data directory and shard layout). Every field has a default, and the
//! `DATA_DIR` environment variable overrides the data directory.

mod parser;
mod types;
mod validation;

pub use parser::{apply_env_overrides, load_config, load_config_or_default};
pub use types::{Config, CrawlConfig, FetchConfig, SiteConfig, StorageConfig};
pub use validation::validate;
