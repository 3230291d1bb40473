//! Restore transition: move an item back to where it was trashed from

use crate::config::TrashConfig;
use crate::error::{Result, TrashError};
use crate::paths;
use crate::record::TrashRecord;
use crate::store::TrashStore;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of restoring one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The item is back at its original location; the record is gone
    Restored {
        record: TrashRecord,
        /// Empty trash directories removed after the move
        pruned_dirs: usize,
    },
    /// Nothing was trashed under this path. Not an error.
    NotTrashed(PathBuf),
}

/// Moves trashed items back to their original locations
pub struct Restorer<'a> {
    config: &'a TrashConfig,
}

impl<'a> Restorer<'a> {
    pub fn new(config: &'a TrashConfig) -> Self {
        Self { config }
    }

    /// Restore a path given relative to the process working directory
    pub fn restore(&self, store: &mut TrashStore, path: &Path) -> Result<RestoreOutcome> {
        let cwd = paths::current_dir()?;
        self.restore_at(store, path, &cwd)
    }

    /// Restore every path, continuing past failures
    pub fn restore_all<P: AsRef<Path>>(
        &self,
        store: &mut TrashStore,
        targets: &[P],
    ) -> Result<Vec<(PathBuf, Result<RestoreOutcome>)>> {
        let cwd = paths::current_dir()?;
        Ok(targets
            .iter()
            .map(|target| {
                let target = target.as_ref();
                (target.to_path_buf(), self.restore_at(store, target, &cwd))
            })
            .collect())
    }

    /// Restore `path` (resolved against `cwd`)
    ///
    /// The record is removed only after the move succeeded.
    pub fn restore_at(
        &self,
        store: &mut TrashStore,
        path: &Path,
        cwd: &Path,
    ) -> Result<RestoreOutcome> {
        let key = paths::resolve_key(path, cwd)?;

        let record = match store.get(&key) {
            Some(record) => record.clone(),
            None => {
                debug!("Nothing trashed under {}", key.display());
                return Ok(RestoreOutcome::NotTrashed(key));
            }
        };

        let move_failed = |source: io::Error| TrashError::MoveFailed {
            from: record.trash_path.clone(),
            to: record.original_path.clone(),
            source,
        };

        // rename(2) would silently replace a file that has since appeared
        if paths::exists_no_follow(&record.original_path) {
            return Err(move_failed(io::Error::new(
                ErrorKind::AlreadyExists,
                "destination already exists",
            )));
        }

        fs::rename(&record.trash_path, &record.original_path).map_err(move_failed)?;

        store.remove(&key);

        let pruned_dirs = record
            .trash_path
            .parent()
            .map(|parent| {
                paths::prune_empty_ancestors(parent, &self.config.trash_dir, |p| {
                    store.find_by_trash_path(p).is_some()
                })
            })
            .unwrap_or(0);

        info!(
            "Restored {} from {}",
            record.original_path.display(),
            record.trash_path.display()
        );

        Ok(RestoreOutcome::Restored {
            record,
            pruned_dirs,
        })
    }
}
