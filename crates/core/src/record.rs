//! Trash record data structure

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Association between a trashed item's original location and where it lives
/// in the trash area. Records are never patched; restore and GC drop them whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashRecord {
    /// Absolute canonical path at the time of deletion (unique key)
    pub original_path: PathBuf,
    /// Absolute path inside the trash area
    pub trash_path: PathBuf,
    /// Unix seconds of the move. `None` for records inherited from the legacy
    /// schema, which never stored it.
    pub deleted_at: Option<u64>,
}

impl TrashRecord {
    /// Create a record for an item moved at `deleted_at`
    pub fn new(original_path: PathBuf, trash_path: PathBuf, deleted_at: SystemTime) -> Self {
        Self {
            original_path,
            trash_path,
            deleted_at: Some(unix_secs(deleted_at)),
        }
    }

    /// Age of the record at `now`, if it carries a deletion time.
    /// A deletion time in the future counts as age zero.
    pub fn age(&self, now: SystemTime) -> Option<Duration> {
        self.deleted_at
            .map(|ts| Duration::from_secs(unix_secs(now).saturating_sub(ts)))
    }
}

/// Seconds since the Unix epoch, clamped to zero for pre-epoch clocks
pub fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
