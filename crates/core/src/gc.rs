//! Retention policy and garbage collection of the trash area
//!
//! Age reference: a record's deletion time when it has one, the entry's
//! modification time otherwise (untracked files, legacy records). Renames
//! keep the original mtime, so tracked items are never aged by it when a
//! deletion time exists. An entry is removed only when its age is strictly
//! greater than the TTL.

use crate::config::{TrashConfig, DEFAULT_TTL};
use crate::error::TrashError;
use crate::paths;
use crate::store::TrashStore;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Retention policy configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Items older than this are removed (default: 7 days)
    pub ttl: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self { ttl: DEFAULT_TTL }
    }
}

impl RetentionPolicy {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Age exactly equal to the TTL is kept
    pub fn is_expired(&self, age: Duration) -> bool {
        age > self.ttl
    }
}

impl From<&TrashConfig> for RetentionPolicy {
    fn from(config: &TrashConfig) -> Self {
        Self::new(config.ttl)
    }
}

/// What a sweep did
#[derive(Debug, Default)]
pub struct GcReport {
    /// Leaf files deleted (tracked or not)
    pub files_removed: usize,
    /// Trashed directories deleted as a whole
    pub dirs_removed: usize,
    /// Records dropped because their item expired
    pub records_removed: usize,
    /// Records dropped because their trash copy had vanished
    pub dangling_records: usize,
    /// Empty directories cleaned up after the sweep
    pub dirs_pruned: usize,
    /// Items that are not old enough yet
    pub kept: usize,
    pub bytes_freed: u64,
    /// Per-entry failures; the sweep continued past each of them
    pub errors: Vec<(PathBuf, TrashError)>,
}

impl GcReport {
    pub fn removed_anything(&self) -> bool {
        self.files_removed
            + self.dirs_removed
            + self.records_removed
            + self.dangling_records
            + self.dirs_pruned
            > 0
    }
}

/// Garbage collector
pub struct GarbageCollector<'a> {
    config: &'a TrashConfig,
    policy: RetentionPolicy,
}

impl<'a> GarbageCollector<'a> {
    /// Create a new GC with the given policy
    pub fn new(config: &'a TrashConfig, policy: RetentionPolicy) -> Self {
        Self { config, policy }
    }

    /// Run garbage collection as of now
    pub fn collect(&self, store: &mut TrashStore) -> GcReport {
        self.collect_at(store, SystemTime::now())
    }

    /// Run garbage collection as of `now`
    pub fn collect_at(&self, store: &mut TrashStore, now: SystemTime) -> GcReport {
        let mut report = GcReport::default();
        let trash_dir = &self.config.trash_dir;

        // 1. Records whose trash copy is gone
        let dangling: Vec<PathBuf> = store
            .all()
            .filter(|r| !paths::exists_no_follow(&r.trash_path))
            .map(|r| r.original_path.clone())
            .collect();
        for key in dangling {
            warn!("Dropping record for {}: trash copy is missing", key.display());
            store.remove(&key);
            report.dangling_records += 1;
        }

        // 2. Walk the trash area
        let mut seen = HashSet::new();
        let mut untracked_dirs = Vec::new();

        let mut walker = WalkDir::new(trash_dir)
            .min_depth(1)
            .follow_links(false)
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| trash_dir.clone());
                    report.errors.push((path.clone(), TrashError::io(path, e.into())));
                    continue;
                }
            };

            let path = entry.path();
            let is_dir = entry.file_type().is_dir();

            let owner = store.find_by_trash_path(path).map(|r| r.original_path.clone());
            if let Some(original) = owner {
                // A trashed directory is one unit
                if is_dir {
                    walker.skip_current_dir();
                }
                seen.insert(path.to_path_buf());
                self.sweep_tracked(store, &original, path, now, &mut report);
                continue;
            }

            if is_dir {
                untracked_dirs.push(path.to_path_buf());
            } else {
                self.sweep_untracked(path, now, &mut report);
            }
        }

        // Records pointing outside the current trash root (older configuration)
        let unvisited: Vec<(PathBuf, PathBuf)> = store
            .all()
            .filter(|r| !seen.contains(&r.trash_path))
            .map(|r| (r.trash_path.clone(), r.original_path.clone()))
            .collect();
        for (trash_path, original) in &unvisited {
            self.sweep_tracked(store, original, trash_path, now, &mut report);
        }

        // 3. Deepest first, so emptied parents go too
        for dir in untracked_dirs.iter().rev() {
            if !is_empty_dir(dir) {
                continue;
            }
            match fs::remove_dir(dir) {
                Ok(()) => report.dirs_pruned += 1,
                Err(e) => report.errors.push((dir.clone(), TrashError::io(dir, e))),
            }
        }

        info!(
            "GC removed {} files, {} directories, {} records ({} bytes), kept {}",
            report.files_removed,
            report.dirs_removed,
            report.records_removed,
            report.bytes_freed,
            report.kept
        );

        report
    }

    fn sweep_tracked(
        &self,
        store: &mut TrashStore,
        original: &Path,
        trash_path: &Path,
        now: SystemTime,
        report: &mut GcReport,
    ) {
        let record = match store.get(original) {
            Some(record) => record.clone(),
            None => return,
        };

        let age = match record.age(now) {
            Some(age) => age,
            None => match mtime_age(trash_path, now) {
                Ok(age) => age,
                Err(e) => {
                    report.errors.push((trash_path.to_path_buf(), TrashError::io(trash_path, e)));
                    return;
                }
            },
        };

        if !self.policy.is_expired(age) {
            debug!("Keeping {} (age {:?})", trash_path.display(), age);
            report.kept += 1;
            return;
        }

        let is_dir = fs::symlink_metadata(trash_path)
            .map(|m| m.is_dir())
            .unwrap_or(false);
        let bytes = entry_size(trash_path);

        match paths::remove_any(trash_path) {
            Ok(()) => {
                if is_dir {
                    report.dirs_removed += 1;
                } else {
                    report.files_removed += 1;
                }
                report.bytes_freed += bytes;
                store.remove(original);
                report.records_removed += 1;
                debug!(
                    "Expired {} (trashed from {})",
                    trash_path.display(),
                    original.display()
                );
            }
            Err(e) => {
                report.errors.push((trash_path.to_path_buf(), TrashError::io(trash_path, e)));
            }
        }
    }

    fn sweep_untracked(&self, path: &Path, now: SystemTime, report: &mut GcReport) {
        let age = match mtime_age(path, now) {
            Ok(age) => age,
            Err(e) => {
                report.errors.push((path.to_path_buf(), TrashError::io(path, e)));
                return;
            }
        };

        if !self.policy.is_expired(age) {
            report.kept += 1;
            return;
        }

        let bytes = entry_size(path);
        match fs::remove_file(path) {
            Ok(()) => {
                report.files_removed += 1;
                report.bytes_freed += bytes;
                debug!("Expired untracked {}", path.display());
            }
            Err(e) => report.errors.push((path.to_path_buf(), TrashError::io(path, e))),
        }
    }
}

/// Age by modification time; a timestamp in the future counts as zero
fn mtime_age(path: &Path, now: SystemTime) -> io::Result<Duration> {
    let modified = fs::symlink_metadata(path)?.modified()?;
    Ok(now.duration_since(modified).unwrap_or(Duration::ZERO))
}

/// Bytes held by a file, or by every file under a directory
fn entry_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_type().is_dir())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}
