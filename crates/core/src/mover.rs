//! Delete transition: move an item into the trash area and record it

use crate::config::{Layout, TrashConfig};
use crate::error::{Result, TrashError};
use crate::paths;
use crate::record::{unix_secs, TrashRecord};
use crate::store::TrashStore;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{info, warn};

/// Result of trashing one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashOutcome {
    /// The record now tracking the item
    pub record: TrashRecord,
    /// Record from an earlier trash cycle of the same path. Its trash copy has
    /// been deleted.
    pub replaced: Option<TrashRecord>,
}

/// Moves items into the trash area
pub struct Mover<'a> {
    config: &'a TrashConfig,
}

impl<'a> Mover<'a> {
    pub fn new(config: &'a TrashConfig) -> Self {
        Self { config }
    }

    /// Trash a path relative to the process working directory
    pub fn trash(&self, store: &mut TrashStore, path: &Path) -> Result<TrashOutcome> {
        let cwd = paths::current_dir()?;
        self.trash_at(store, path, &cwd, SystemTime::now())
    }

    /// Trash every path, continuing past failures
    ///
    /// Fails as a whole only when the working directory is unreadable, before
    /// anything is moved.
    pub fn trash_all<P: AsRef<Path>>(
        &self,
        store: &mut TrashStore,
        targets: &[P],
    ) -> Result<Vec<(PathBuf, Result<TrashOutcome>)>> {
        let cwd = paths::current_dir()?;
        Ok(targets
            .iter()
            .map(|target| {
                let target = target.as_ref();
                let outcome = self.trash_at(store, target, &cwd, SystemTime::now());
                (target.to_path_buf(), outcome)
            })
            .collect())
    }

    /// Trash `path` (resolved against `cwd`) as of `now`
    pub fn trash_at(
        &self,
        store: &mut TrashStore,
        path: &Path,
        cwd: &Path,
        now: SystemTime,
    ) -> Result<TrashOutcome> {
        // 1. Resolve
        let original = paths::resolve_target(path, cwd)?;

        // 2. Stat without following a final symlink
        if let Err(e) = fs::symlink_metadata(&original) {
            return Err(match e.kind() {
                ErrorKind::NotFound => TrashError::NotFound(original),
                _ => TrashError::io(original, e),
            });
        }

        // 3. Never trash the trash area, its store, or anything holding them
        self.check_overlap(&original)?;

        // 4. Pick a free destination, never inside another trashed item
        let trash_dir = &self.config.trash_dir;
        let is_claimed = |p: &Path| store.find_by_trash_path(p).is_some();
        let destination = match self.config.layout {
            Layout::Mirrored => paths::free_mirrored_destination(trash_dir, &original, is_claimed),
            Layout::Flat => paths::unique_destination(
                paths::flat_destination(trash_dir, &original, unix_secs(now)),
                is_claimed,
            ),
        };

        let dest_parent = destination.parent().unwrap_or(trash_dir.as_path());
        fs::create_dir_all(dest_parent).map_err(|e| TrashError::io(dest_parent, e))?;

        // 5. Move
        if let Err(source) = fs::rename(&original, &destination) {
            paths::prune_empty_ancestors(dest_parent, trash_dir, is_claimed);
            return Err(TrashError::MoveFailed {
                from: original,
                to: destination,
                source,
            });
        }

        info!("Trashed {} -> {}", original.display(), destination.display());

        // 6-7. Record, dropping the previous generation's copy
        let record = TrashRecord::new(original, destination, now);
        let replaced = store.put(record.clone());

        if let Some(old) = &replaced {
            if old.trash_path != record.trash_path {
                self.discard_previous(store, old);
            }
        }

        Ok(TrashOutcome { record, replaced })
    }

    fn check_overlap(&self, original: &Path) -> Result<()> {
        let config = self.config;
        let overlaps = config.is_in_trash(original)
            || config.trash_dir.starts_with(original)
            || config.store_path.starts_with(original)
            || config.lock_path() == original;

        if overlaps {
            Err(TrashError::InsideTrash(original.to_path_buf()))
        } else {
            Ok(())
        }
    }

    fn discard_previous(&self, store: &TrashStore, old: &TrashRecord) {
        match paths::remove_any(&old.trash_path) {
            Ok(()) => {
                info!(
                    "Replaced previous trash copy of {} at {}",
                    old.original_path.display(),
                    old.trash_path.display()
                );
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                // Left untracked; the collector expires it by mtime
                warn!(
                    "Failed to remove previous trash copy {}: {}",
                    old.trash_path.display(),
                    e
                );
                return;
            }
        }

        if let Some(parent) = old.trash_path.parent() {
            paths::prune_empty_ancestors(parent, &self.config.trash_dir, |p| {
                store.find_by_trash_path(p).is_some()
            });
        }
    }
}
