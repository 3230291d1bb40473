//! Persisted trash store
//!
//! A single JSON document maps original paths to trash records:
//! ```text
//! {
//!   "version": 1,
//!   "dir": "/home/u/.local/share/trashcan/files",
//!   "ttl": 604800,
//!   "pathmap": {
//!     "/tmp/a/report.txt": { "trash_path": "...", "deleted_at": 1760000000 }
//!   }
//! }
//! ```
//! The schema is append-only. Documents written before `version` existed have
//! `null` pathmap values; their trash path is the mirrored location under `dir`.

use crate::config::TrashConfig;
use crate::error::{Result, TrashError};
use crate::paths;
use crate::record::TrashRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Schema version written by this build
pub const STORE_VERSION: u32 = 1;

/// In-memory record set plus the header it was persisted with
#[derive(Debug, Default)]
pub struct TrashStore {
    /// Trash root the document describes
    dir: Option<PathBuf>,
    /// Retention window (seconds) the document was last written with
    ttl_secs: Option<u64>,
    /// original_path -> record, sorted for deterministic listing
    records: BTreeMap<PathBuf, TrashRecord>,
    /// trash_path -> original_path
    by_trash_path: HashMap<PathBuf, PathBuf>,
    /// Set by any mutation since load/save
    dirty: bool,
}

#[derive(Serialize)]
struct PersistedStoreRef<'a> {
    version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    dir: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl: Option<u64>,
    pathmap: BTreeMap<&'a Path, PersistedEntry>,
}

#[derive(Deserialize)]
struct PersistedStore {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    dir: Option<PathBuf>,
    #[serde(default)]
    ttl: Option<u64>,
    #[serde(default)]
    pathmap: Option<BTreeMap<PathBuf, Option<PersistedEntry>>>,
}

#[derive(Serialize, Deserialize)]
struct PersistedEntry {
    #[serde(default)]
    trash_path: Option<PathBuf>,
    #[serde(default)]
    deleted_at: Option<u64>,
}

impl TrashStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from `path`
    ///
    /// A missing file yields an empty store. A file that exists but is not a
    /// well-formed store document fails with `CorruptState`.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No trash store at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(TrashError::io(path, e)),
        };

        let corrupt = |reason: String| TrashError::CorruptState {
            path: path.to_path_buf(),
            reason,
        };

        let doc: PersistedStore =
            serde_json::from_slice(&bytes).map_err(|e| corrupt(e.to_string()))?;

        if let Some(version) = doc.version {
            if version > STORE_VERSION {
                warn!(
                    "Trash store {} was written by a newer version (schema {}), unknown fields are ignored",
                    path.display(),
                    version
                );
            }
        }

        let mut records = BTreeMap::new();
        for (original_path, entry) in doc.pathmap.unwrap_or_default() {
            if !original_path.is_absolute() {
                return Err(corrupt(format!(
                    "record key is not absolute: {}",
                    original_path.display()
                )));
            }

            let (trash_path, deleted_at) = match entry {
                Some(PersistedEntry {
                    trash_path: Some(trash_path),
                    deleted_at,
                }) => (trash_path, deleted_at),
                other => {
                    let dir = doc.dir.as_deref().ok_or_else(|| {
                        corrupt(format!(
                            "record {} has no trash path and the store names no trash directory",
                            original_path.display()
                        ))
                    })?;
                    let deleted_at = other.and_then(|e| e.deleted_at);
                    (paths::mirrored_destination(dir, &original_path), deleted_at)
                }
            };

            records.insert(
                original_path.clone(),
                TrashRecord {
                    original_path,
                    trash_path,
                    deleted_at,
                },
            );
        }

        debug!("Loaded {} trash records from {}", records.len(), path.display());

        let by_trash_path = records
            .values()
            .map(|r| (r.trash_path.clone(), r.original_path.clone()))
            .collect();

        Ok(Self {
            dir: doc.dir,
            ttl_secs: doc.ttl,
            records,
            by_trash_path,
            dirty: false,
        })
    }

    /// Stamp the header with the active configuration
    pub fn attach(&mut self, config: &TrashConfig) {
        if let Some(dir) = &self.dir {
            if dir != &config.trash_dir {
                warn!(
                    "Trash store was written for {}, now using {}",
                    dir.display(),
                    config.trash_dir.display()
                );
            }
        }
        self.dir = Some(config.trash_dir.clone());
        self.ttl_secs = Some(config.ttl.as_secs());
    }

    /// Persist the full record set to `path` via write-to-temp + rename
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let doc = PersistedStoreRef {
            version: STORE_VERSION,
            dir: self.dir.as_deref(),
            ttl: self.ttl_secs,
            pathmap: self
                .records
                .iter()
                .map(|(key, record)| {
                    (
                        key.as_path(),
                        PersistedEntry {
                            trash_path: Some(record.trash_path.clone()),
                            deleted_at: record.deleted_at,
                        },
                    )
                })
                .collect(),
        };

        let data = serde_json::to_vec_pretty(&doc).map_err(|e| {
            TrashError::io(path, std::io::Error::new(ErrorKind::InvalidData, e))
        })?;
        atomic_write(path, &data)?;

        debug!("Saved {} trash records to {}", self.records.len(), path.display());
        self.dirty = false;
        Ok(())
    }

    /// Insert a record, returning the one it replaced
    pub fn put(&mut self, record: TrashRecord) -> Option<TrashRecord> {
        self.dirty = true;
        self.by_trash_path
            .insert(record.trash_path.clone(), record.original_path.clone());
        let replaced = self.records.insert(record.original_path.clone(), record);
        if let Some(old) = &replaced {
            self.unindex(old);
        }
        replaced
    }

    pub fn get(&self, original_path: &Path) -> Option<&TrashRecord> {
        self.records.get(original_path)
    }

    pub fn remove(&mut self, original_path: &Path) -> Option<TrashRecord> {
        let removed = self.records.remove(original_path);
        if let Some(record) = &removed {
            self.unindex(record);
            self.dirty = true;
        }
        removed
    }

    /// Drop `record` from the reverse index unless another record now owns
    /// its trash path
    fn unindex(&mut self, record: &TrashRecord) {
        let owner = self.by_trash_path.get(&record.trash_path);
        if owner == Some(&record.original_path)
            && self.records.get(&record.original_path).map(|r| &r.trash_path)
                != Some(&record.trash_path)
        {
            self.by_trash_path.remove(&record.trash_path);
        }
    }

    /// All records, sorted by original path
    pub fn all(&self) -> impl Iterator<Item = &TrashRecord> {
        self.records.values()
    }

    /// Reverse lookup: which record owns this trash location
    pub fn find_by_trash_path(&self, trash_path: &Path) -> Option<&TrashRecord> {
        self.by_trash_path
            .get(trash_path)
            .and_then(|original| self.records.get(original))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether anything changed since the last load or save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Atomic write helper
///
/// Writes data to a temporary file in the target's directory, fsyncs it, then
/// renames it over the target. A crash leaves either the old or the new file.
pub fn atomic_write(target: &Path, data: &[u8]) -> Result<()> {
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    fs::create_dir_all(parent).map_err(|e| TrashError::io(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| TrashError::io(parent, e))?;
    tmp.write_all(data).map_err(|e| TrashError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| TrashError::io(tmp.path(), e))?;
    tmp.persist(target)
        .map_err(|e| TrashError::io(target, e.error))?;

    // Make the rename itself durable
    if let Ok(dir) = File::open(parent) {
        let _ = dir.sync_all();
    }

    Ok(())
}
