//! Store statistics for the `--stats` CLI mode
//!
//! Purely observational: shard and record counts, sizes, and the checkpoint
//! position. Nothing here influences crawl control flow.

use crate::store::{shard, Checkpoint, RecordStore, StoreResult};

/// Size and record count of one shard file
#[derive(Debug, Clone)]
pub struct ShardInfo {
    pub name: String,
    pub records: usize,
    pub bytes: u64,
}

/// Snapshot of the store's on-disk state
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Per-shard breakdown, in shard order
    pub shards: Vec<ShardInfo>,

    /// Total records across all shards (before deduplication)
    pub total_records: usize,

    /// Unique records per the duplicate index
    pub unique_records: usize,

    /// Total bytes across all shard files
    pub total_bytes: u64,

    /// Last attempted page per the checkpoint
    pub last_page: u32,
}

/// Loads statistics by scanning the shard files
///
/// # Arguments
///
/// * `store` - The record store to inspect
/// * `checkpoint` - The page checkpoint for the same data directory
pub fn load_statistics(
    store: &RecordStore,
    checkpoint: &Checkpoint,
) -> StoreResult<StoreStatistics> {
    let mut shards = Vec::new();
    let mut total_records = 0;
    let mut total_bytes = 0;

    for path in store.list_shards()? {
        let records = shard::read_shard(&path).len();
        let bytes = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        total_records += records;
        total_bytes += bytes;
        shards.push(ShardInfo {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            records,
            bytes,
        });
    }

    Ok(StoreStatistics {
        shards,
        total_records,
        unique_records: store.record_count(),
        total_bytes,
        last_page: checkpoint.load(),
    })
}

/// Prints statistics in a human-readable format
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Glosswalk Store Statistics ===\n");

    println!("Shards ({}):", stats.shards.len());
    for info in &stats.shards {
        println!(
            "  {} - {} record(s), {:.2} MB",
            info.name,
            info.records,
            info.bytes as f64 / 1024.0 / 1024.0
        );
    }

    println!("\nTotal records:  {}", stats.total_records);
    println!("Unique records: {}", stats.unique_records);
    println!(
        "Total size:     {:.2} MB",
        stats.total_bytes as f64 / 1024.0 / 1024.0
    );
    println!("Last page:      {}", stats.last_page);
}
