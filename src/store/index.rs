//! Duplicate index: derived URL-membership cache over the shards
//!
//! The index answers `contains(url)` in O(1) and is persisted as a columnar
//! snapshot of all records. It is strictly a cache: it must always be
//! reconstructible from the shards, and deleting the snapshot file loses
//! nothing.

use crate::store::{Record, StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Columnar snapshot of all records, one vector per field
///
/// Row `i` across the four vectors is one record.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    url: Vec<String>,
    h1: Vec<String>,
    h2: Vec<String>,
    content: Vec<String>,
}

/// In-memory duplicate index with a persisted columnar snapshot
#[derive(Debug)]
pub struct DuplicateIndex {
    path: PathBuf,
    snapshot: Snapshot,
    seen: HashSet<String>,
}

impl DuplicateIndex {
    /// Snapshot file name for the given shard prefix
    pub fn file_name(prefix: &str) -> String {
        format!("{}_index.json", prefix)
    }

    /// Creates an empty index backed by the given snapshot path
    pub fn empty(path: PathBuf) -> Self {
        Self {
            path,
            snapshot: Snapshot::default(),
            seen: HashSet::new(),
        }
    }

    /// Loads the snapshot from disk
    ///
    /// A missing or corrupt snapshot loads as an empty index with a warning;
    /// the caller decides whether that warrants a rebuild from the shards.
    pub fn load(path: PathBuf) -> Self {
        let snapshot = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Snapshot>(&content) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(
                        "Index snapshot {} failed to parse ({}), starting empty",
                        path.display(),
                        e
                    );
                    Snapshot::default()
                }
            },
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Could not read index snapshot {}: {}", path.display(), e);
                }
                Snapshot::default()
            }
        };

        let seen = snapshot.url.iter().cloned().collect();
        Self {
            path,
            snapshot,
            seen,
        }
    }

    /// Builds a fresh index from records, first occurrence of each URL wins
    pub fn from_records<'a>(
        path: PathBuf,
        records: impl IntoIterator<Item = &'a Record>,
    ) -> Self {
        let mut index = Self::empty(path);
        for record in records {
            index.add(record);
        }
        index
    }

    /// O(1) membership check by URL
    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    /// Adds a record; a URL already present is ignored (first-write-wins)
    pub fn add(&mut self, record: &Record) {
        if record.url.is_empty() || !self.seen.insert(record.url.clone()) {
            return;
        }
        self.snapshot.url.push(record.url.clone());
        self.snapshot.h1.push(record.h1.clone());
        self.snapshot.h2.push(record.h2.clone());
        self.snapshot.content.push(record.content.clone());
    }

    /// Number of indexed records
    pub fn len(&self) -> usize {
        self.snapshot.url.len()
    }

    /// True if the index has no entries
    pub fn is_empty(&self) -> bool {
        self.snapshot.url.is_empty()
    }

    /// All indexed URLs
    pub fn urls(&self) -> &HashSet<String> {
        &self.seen
    }

    /// Persists the columnar snapshot via temp-file rename
    pub fn save(&self) -> StoreResult<()> {
        let payload = serde_json::to_string(&self.snapshot)?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, payload).map_err(|source| StoreError::Persist {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|source| StoreError::Persist {
            path: self.path.clone(),
            source,
        })?;

        Ok(())
    }
}
