//! Page checkpoint: the durable cursor marking the last attempted page
//!
//! The checkpoint is a single JSON object `{"last_page": n}`. It is saved
//! once per attempted page and never rolled back; loading never fails, so a
//! missing or corrupt file simply restarts the run at the configured range.

use crate::store::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the checkpoint inside the data directory
pub const CHECKPOINT_FILE: &str = "page_checkpoint.json";

#[derive(Debug, Serialize, Deserialize)]
struct CheckpointFile {
    last_page: u32,
}

/// Durable cursor over the crawl page range
#[derive(Debug)]
pub struct Checkpoint {
    path: PathBuf,
    start_page: u32,
}

impl Checkpoint {
    /// Creates a checkpoint handle for the given data directory
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Directory holding the checkpoint file
    /// * `start_page` - First page of the assigned crawl range
    pub fn new(data_dir: &Path, start_page: u32) -> Self {
        Self {
            path: data_dir.join(CHECKPOINT_FILE),
            start_page,
        }
    }

    /// Loads the last attempted page
    ///
    /// Returns `start_page - 1` when the file is absent or unreadable, and
    /// clamps any value below the assigned range up to `start_page - 1`, so
    /// a checkpoint from an earlier range never rewinds this one. Never
    /// returns an error.
    pub fn load(&self) -> u32 {
        let floor = self.start_page.saturating_sub(1);

        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return floor,
        };

        match serde_json::from_str::<CheckpointFile>(&content) {
            Ok(file) => file.last_page.max(floor),
            Err(e) => {
                tracing::warn!(
                    "Checkpoint file {} is unreadable ({}), restarting at page {}",
                    self.path.display(),
                    e,
                    self.start_page
                );
                floor
            }
        }
    }

    /// Saves the last attempted page
    ///
    /// Writes to a temporary file and renames it over the checkpoint, so a
    /// crash mid-write leaves the previously saved value intact. Write
    /// failures propagate: silently losing checkpoint progress would make
    /// the next run reprocess already-attempted pages.
    pub fn save(&self, page: u32) -> StoreResult<()> {
        let payload = serde_json::to_string(&CheckpointFile { last_page: page })?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, payload).map_err(|source| StoreError::Persist {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|source| StoreError::Persist {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!("Checkpoint saved: last_page = {}", page);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_absent_checkpoint_returns_start_minus_one() {
        let dir = tempdir().unwrap();
        let checkpoint = Checkpoint::new(dir.path(), 6019);
        assert_eq!(checkpoint.load(), 6018);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let checkpoint = Checkpoint::new(dir.path(), 6019);
        checkpoint.save(6019).unwrap();
        assert_eq!(checkpoint.load(), 6019);
    }

    #[test]
    fn test_load_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let checkpoint = Checkpoint::new(dir.path(), 6019);
            checkpoint.save(6025).unwrap();
        }
        let reopened = Checkpoint::new(dir.path(), 6019);
        assert_eq!(reopened.load(), 6025);
    }

    #[test]
    fn test_corrupt_checkpoint_falls_back() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CHECKPOINT_FILE), "not json").unwrap();
        let checkpoint = Checkpoint::new(dir.path(), 6019);
        assert_eq!(checkpoint.load(), 6018);
    }

    #[test]
    fn test_earlier_range_value_is_clamped() {
        let dir = tempdir().unwrap();
        let checkpoint = Checkpoint::new(dir.path(), 6019);
        // A leftover checkpoint from a different assignment
        std::fs::write(
            dir.path().join(CHECKPOINT_FILE),
            r#"{"last_page": 42}"#,
        )
        .unwrap();
        assert_eq!(checkpoint.load(), 6018);
    }

    #[test]
    fn test_start_page_one_floor_is_zero() {
        let dir = tempdir().unwrap();
        let checkpoint = Checkpoint::new(dir.path(), 1);
        assert_eq!(checkpoint.load(), 0);
    }
}
