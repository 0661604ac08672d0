//! Record store: sharded, deduplicating, append-only persistence
//!
//! The store owns the shard files and the duplicate index. Appends are
//! whole-shard rewrites: the current shard is read, extended in memory, and
//! rewritten via temp-file rename, so each flush costs O(shard size) but a
//! crash never corrupts a previously written shard.

use crate::config::StorageConfig;
use crate::store::index::DuplicateIndex;
use crate::store::shard;
use crate::store::{Record, StoreResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// An index smaller than this is not trusted while shards hold records
const SMALL_INDEX_THRESHOLD: usize = 100;

/// Sharded record store with a derived duplicate index
#[derive(Debug)]
pub struct RecordStore {
    data_dir: PathBuf,
    prefix: String,
    max_shard_bytes: u64,
    index: DuplicateIndex,
}

impl RecordStore {
    /// Opens (or initializes) the store in the configured data directory
    ///
    /// Creates the directory if needed, migrates a pre-sharding single
    /// output file, loads the index snapshot, and rebuilds the index from
    /// the shards whenever it looks inconsistent: empty or suspiciously
    /// small while shards are non-trivial, or holding fewer than 90% of the
    /// shard-derived record count.
    pub fn open(config: &StorageConfig) -> StoreResult<Self> {
        let data_dir = PathBuf::from(&config.data_dir);
        std::fs::create_dir_all(&data_dir)?;

        migrate_legacy_file(&data_dir, &config.shard_prefix)?;

        let index_path = data_dir.join(DuplicateIndex::file_name(&config.shard_prefix));
        let mut store = Self {
            data_dir,
            prefix: config.shard_prefix.clone(),
            max_shard_bytes: config.max_shard_bytes(),
            index: DuplicateIndex::load(index_path),
        };

        // Full scan once at open: the consistency check needs the true count
        let shards = store.list_shards()?;
        let mut shard_records = 0usize;
        let mut total_bytes = 0u64;
        for path in &shards {
            shard_records += shard::read_shard(path).len();
            total_bytes += std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        }

        tracing::info!(
            "Record store: {} shard(s), {} record(s) on disk, {:.2} MB, index has {} entry(ies)",
            shards.len(),
            shard_records,
            total_bytes as f64 / 1024.0 / 1024.0,
            store.index.len()
        );

        if index_needs_rebuild(store.index.len(), shard_records) {
            tracing::warn!(
                "Duplicate index looks inconsistent ({} indexed vs {} in shards), rebuilding",
                store.index.len(),
                shard_records
            );
            store.rebuild_index()?;
        }

        Ok(store)
    }

    /// Appends records, skipping any URL the store already holds
    ///
    /// First-write-wins, both against the persisted store and within the
    /// given batch. If the dry-run serialization of the current shard plus
    /// the new records reaches the size ceiling, the current shard is sealed
    /// and every new record goes to a freshly created shard; nothing is ever
    /// dropped for space. Returns the number of records actually written.
    pub fn append(&mut self, records: &[Record]) -> StoreResult<usize> {
        // Guard against an index that went missing since open
        if self.index.is_empty() && !self.list_shards()?.is_empty() {
            tracing::warn!("Duplicate index is empty but shards exist, rebuilding before append");
            self.rebuild_index()?;
        }

        let mut fresh: Vec<Record> = Vec::new();
        let mut batch_seen: HashSet<&str> = HashSet::new();
        for record in records {
            if record.url.is_empty()
                || self.index.contains(&record.url)
                || !batch_seen.insert(record.url.as_str())
            {
                continue;
            }
            fresh.push(record.clone());
        }

        if fresh.is_empty() {
            tracing::debug!("All {} record(s) already stored, nothing to append", records.len());
            return Ok(0);
        }

        let shards = self.list_shards()?;
        let current = shards
            .last()
            .cloned()
            .unwrap_or_else(|| self.data_dir.join(shard::shard_file_name(&self.prefix, 1)));

        let existing = shard::read_shard(&current);
        let existing_len = existing.len();

        let mut combined = existing;
        combined.extend(fresh.iter().cloned());

        let (target, to_write): (PathBuf, &[Record]) =
            if shard::serialized_size(&combined)? >= self.max_shard_bytes && existing_len > 0 {
                // Seal the current shard as-is and overflow into a new one
                shard::write_shard(&current, &combined[..existing_len])?;
                let next = shard::next_shard_path(&self.data_dir, &self.prefix, &shards);
                tracing::info!(
                    "Shard {} sealed at {} record(s), opening {}",
                    current.display(),
                    existing_len,
                    next.display()
                );
                (next, &combined[existing_len..])
            } else {
                (current, &combined[..])
            };

        shard::write_shard(&target, to_write)?;

        for record in &fresh {
            self.index.add(record);
        }
        self.index.save()?;

        let size = std::fs::metadata(&target).map(|m| m.len()).unwrap_or(0);
        tracing::info!(
            "Appended {} record(s) to {} ({} in file, {:.2} MB)",
            fresh.len(),
            target.display(),
            to_write.len(),
            size as f64 / 1024.0 / 1024.0
        );

        Ok(fresh.len())
    }

    /// Rebuilds the duplicate index by scanning every shard
    ///
    /// Corrupt or unreadable shards are skipped with a warning; the rebuild
    /// never fails because of them. The fresh snapshot is persisted before
    /// returning. Returns the rebuilt record count.
    pub fn rebuild_index(&mut self) -> StoreResult<usize> {
        let shards = self.list_shards()?;
        let mut all_records: Vec<Record> = Vec::new();
        for path in &shards {
            all_records.extend(shard::read_shard(path));
        }

        let index_path = self.data_dir.join(DuplicateIndex::file_name(&self.prefix));
        self.index = DuplicateIndex::from_records(index_path, all_records.iter());
        self.index.save()?;

        tracing::info!(
            "Rebuilt duplicate index: {} record(s) from {} shard(s)",
            self.index.len(),
            shards.len()
        );
        Ok(self.index.len())
    }

    /// O(1) membership check by URL
    pub fn contains(&self, url: &str) -> bool {
        self.index.contains(url)
    }

    /// All URLs currently in the store, per the duplicate index
    pub fn all_urls(&self) -> &HashSet<String> {
        self.index.urls()
    }

    /// Number of unique records the store holds
    pub fn record_count(&self) -> usize {
        self.index.len()
    }

    /// Ordered list of shard files currently on disk
    pub fn list_shards(&self) -> StoreResult<Vec<PathBuf>> {
        shard::list_shards(&self.data_dir, &self.prefix)
    }

    /// Directory holding the shards, index, and checkpoint
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Shard file prefix
    pub fn shard_prefix(&self) -> &str {
        &self.prefix
    }
}

/// Decides whether the index must be rebuilt before being trusted
///
/// An empty or small index over non-trivial shards usually means a freshly
/// initialized or corrupted snapshot; trusting it would re-crawl content the
/// shards already hold.
fn index_needs_rebuild(index_len: usize, shard_records: usize) -> bool {
    if shard_records == 0 {
        return false;
    }
    index_len < SMALL_INDEX_THRESHOLD || index_len * 10 < shard_records * 9
}

/// Migrates a pre-sharding single output file into shard 001
///
/// Runs only when no shards exist yet; the legacy file is removed after a
/// successful migration.
fn migrate_legacy_file(data_dir: &Path, prefix: &str) -> StoreResult<()> {
    let legacy = shard::legacy_file_path(data_dir, prefix);
    if !legacy.exists() || !shard::list_shards(data_dir, prefix)?.is_empty() {
        return Ok(());
    }

    let records = shard::read_shard(&legacy);
    if records.is_empty() {
        return Ok(());
    }

    let first_shard = data_dir.join(shard::shard_file_name(prefix, 1));
    shard::write_shard(&first_shard, &records)?;
    std::fs::remove_file(&legacy)?;
    tracing::info!(
        "Migrated {} record(s) from {} to {}",
        records.len(),
        legacy.display(),
        first_shard.display()
    );
    Ok(())
}
