//! Persistence layer: records, shards, duplicate index, and checkpoint
//!
//! This module makes many short-lived runs behave like one long crawl:
//! - `RecordStore`: append-only sharded JSON output with idempotent append
//! - `DuplicateIndex`: derived URL-membership cache, rebuildable from shards
//! - `Checkpoint`: durable cursor over the listing-page range
//!
//! Read errors degrade (a corrupt shard or index reads as empty, with a
//! warning); write errors propagate, since silently losing persisted state
//! would cost either data or re-crawled pages.

mod checkpoint;
mod index;
mod record;
pub(crate) mod shard;
mod stats;
mod store;

pub use checkpoint::{Checkpoint, CHECKPOINT_FILE};
pub use index::DuplicateIndex;
pub use record::Record;
pub use stats::{load_statistics, print_statistics, ShardInfo, StoreStatistics};
pub use store::RecordStore;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to persist {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
