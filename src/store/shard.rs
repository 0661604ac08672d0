//! Shard file handling
//!
//! Shards are pretty-printed JSON arrays of records named
//! `<prefix>_<3-digit>.json`, numbered monotonically. A shard that fails to
//! parse reads as empty with a warning and is never deleted; shard writes go
//! through a temp-file rename and propagate failures.

use crate::store::{Record, StoreError, StoreResult};
use std::path::{Path, PathBuf};

/// Builds the file name of shard `number`
pub fn shard_file_name(prefix: &str, number: u32) -> String {
    format!("{}_{:03}.json", prefix, number)
}

/// Path of the pre-sharding single output file, if one was ever written
pub fn legacy_file_path(data_dir: &Path, prefix: &str) -> PathBuf {
    data_dir.join(format!("{}.json", prefix))
}

/// Extracts the shard number from a file name like `prefix_012.json`
pub fn shard_number(file_name: &str, prefix: &str) -> Option<u32> {
    let rest = file_name.strip_prefix(prefix)?.strip_prefix('_')?;
    let digits = rest.strip_suffix(".json")?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Lists all shard files in the data directory, ordered by shard number
pub fn list_shards(data_dir: &Path, prefix: &str) -> StoreResult<Vec<PathBuf>> {
    let mut shards: Vec<(u32, PathBuf)> = Vec::new();

    let entries = match std::fs::read_dir(data_dir) {
        Ok(e) => e,
        // A data directory that does not exist yet simply has no shards
        Err(ref e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::Io(e)),
    };

    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(number) = shard_number(name, prefix) {
            shards.push((number, entry.path()));
        }
    }

    shards.sort_by_key(|(number, _)| *number);
    Ok(shards.into_iter().map(|(_, path)| path).collect())
}

/// Path for the shard that follows the given existing shards
///
/// With no existing shards this is shard 001; otherwise the highest existing
/// number plus one.
pub fn next_shard_path(data_dir: &Path, prefix: &str, existing: &[PathBuf]) -> PathBuf {
    let next = existing
        .iter()
        .filter_map(|p| p.file_name()?.to_str())
        .filter_map(|name| shard_number(name, prefix))
        .max()
        .map_or(1, |n| n + 1);
    data_dir.join(shard_file_name(prefix, next))
}

/// Reads all records from a shard file
///
/// A missing, unreadable, or corrupt shard reads as empty: it is logged as a
/// warning and left on disk, and never aborts the caller.
pub fn read_shard(path: &Path) -> Vec<Record> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Could not read shard {}: {}", path.display(), e);
            }
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<Record>>(&content) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(
                "Shard {} failed to parse ({}), treating as empty",
                path.display(),
                e
            );
            Vec::new()
        }
    }
}

/// Serializes records exactly as a shard write would, returning the byte size
///
/// Used as a dry run to decide whether an append would push the current
/// shard over its size ceiling.
pub fn serialized_size(records: &[Record]) -> StoreResult<u64> {
    let payload = serde_json::to_string_pretty(records)?;
    Ok(payload.len() as u64)
}

/// Writes a full shard file via temp-file rename
pub fn write_shard(path: &Path, records: &[Record]) -> StoreResult<()> {
    let payload = serde_json::to_string_pretty(records)?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, payload).map_err(|source| StoreError::Persist {
        path: tmp_path.clone(),
        source,
    })?;
    std::fs::rename(&tmp_path, path).map_err(|source| StoreError::Persist {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_shard_file_name_is_zero_padded() {
        assert_eq!(shard_file_name("glossary", 1), "glossary_001.json");
        assert_eq!(shard_file_name("glossary", 120), "glossary_120.json");
    }

    #[test]
    fn test_shard_number_parsing() {
        assert_eq!(shard_number("glossary_001.json", "glossary"), Some(1));
        assert_eq!(shard_number("glossary_042.json", "glossary"), Some(42));
        assert_eq!(shard_number("glossary.json", "glossary"), None);
        assert_eq!(shard_number("other_001.json", "glossary"), None);
        assert_eq!(shard_number("glossary_abc.json", "glossary"), None);
        assert_eq!(shard_number("glossary_001.json.tmp", "glossary"), None);
    }

    #[test]
    fn test_list_shards_ordered_by_number() {
        let dir = tempdir().unwrap();
        for n in [3u32, 1, 2] {
            std::fs::write(dir.path().join(shard_file_name("glossary", n)), "[]").unwrap();
        }
        std::fs::write(dir.path().join("unrelated.json"), "[]").unwrap();

        let shards = list_shards(dir.path(), "glossary").unwrap();
        let names: Vec<_> = shards
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["glossary_001.json", "glossary_002.json", "glossary_003.json"]
        );
    }

    #[test]
    fn test_list_shards_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(list_shards(&missing, "glossary").unwrap().is_empty());
    }

    #[test]
    fn test_next_shard_path() {
        let dir = tempdir().unwrap();
        let first = next_shard_path(dir.path(), "glossary", &[]);
        assert!(first.ends_with("glossary_001.json"));

        let existing = vec![
            dir.path().join("glossary_001.json"),
            dir.path().join("glossary_007.json"),
        ];
        let next = next_shard_path(dir.path(), "glossary", &existing);
        assert!(next.ends_with("glossary_008.json"));
    }

    #[test]
    fn test_corrupt_shard_reads_as_empty_and_survives() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("glossary_001.json");
        std::fs::write(&path, "{ definitely not a record array").unwrap();

        assert!(read_shard(&path).is_empty());
        assert!(path.exists());
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("glossary_001.json");
        let records = vec![
            Record {
                url: "https://example.com/glossary/a".to_string(),
                h1: "A".to_string(),
                h2: String::new(),
                content: "alpha".to_string(),
            },
            Record::empty("https://example.com/glossary/b"),
        ];

        write_shard(&path, &records).unwrap();
        assert_eq!(read_shard(&path), records);
        // The dry-run size matches what landed on disk
        let on_disk = std::fs::metadata(&path).unwrap().len();
        assert_eq!(serialized_size(&records).unwrap(), on_disk);
    }
}
