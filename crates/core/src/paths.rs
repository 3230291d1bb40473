//! Path resolution and trash destination naming
//!
//! Original paths are keyed by their canonical parent directory joined with
//! the final component. The final component is left alone so a symlink is
//! trashed as a link and never through to its target.

use crate::error::{Result, TrashError};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Current working directory, as a resolution error when unavailable
pub fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| TrashError::PathResolution {
        path: PathBuf::from("."),
        reason: format!("cannot read working directory: {}", e),
    })
}

/// Resolve a user-supplied path to its absolute canonical key
///
/// Fails with `PathResolution` when the parent directory cannot be
/// canonicalized or the path names no entry (`/`).
pub fn resolve_target(path: &Path, cwd: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let resolution_error = |reason: String| TrashError::PathResolution {
        path: path.to_path_buf(),
        reason,
    };

    match joined.components().next_back() {
        Some(Component::Normal(name)) => {
            let parent = joined
                .parent()
                .ok_or_else(|| resolution_error("path has no parent".to_string()))?;
            let parent = fs::canonicalize(parent).map_err(|e| resolution_error(e.to_string()))?;
            Ok(parent.join(name))
        }
        Some(Component::CurDir) | Some(Component::ParentDir) => {
            fs::canonicalize(&joined).map_err(|e| resolution_error(e.to_string()))
        }
        _ => Err(resolution_error("path names no file".to_string())),
    }
}

/// Resolve a restore argument to a record key
///
/// Same as `resolve_target`, except a vanished parent directory falls back to
/// the lexically normalized path so the record can still be found (and the
/// restore reported as a failed move rather than an unknown path).
pub fn resolve_key(path: &Path, cwd: &Path) -> Result<PathBuf> {
    match resolve_target(path, cwd) {
        Ok(key) => Ok(key),
        Err(err) => {
            let joined = if path.is_absolute() {
                path.to_path_buf()
            } else {
                cwd.join(path)
            };
            let normalized = normalize_lexically(&joined);
            match normalized.file_name() {
                Some(_) => Ok(normalized),
                None => Err(err),
            }
        }
    }
}

/// Remove `.` and `..` components without touching the filesystem
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if out.file_name().is_some() {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Destination that reproduces the original hierarchy under `trash_dir`
pub fn mirrored_destination(trash_dir: &Path, original: &Path) -> PathBuf {
    let mut dest = trash_dir.to_path_buf();
    for component in original.components() {
        if let Component::Normal(part) = component {
            dest.push(part);
        }
    }
    dest
}

/// Destination directly under `trash_dir`: `<stem>_<unix-ts><ext>`
pub fn flat_destination(trash_dir: &Path, original: &Path, unix_ts: u64) -> PathBuf {
    let name = original
        .file_name()
        .unwrap_or_else(|| OsStr::new("unnamed"));
    trash_dir.join(suffixed_name(name, &unix_ts.to_string()))
}

/// First free variant of `candidate`, appending `_1`, `_2`, ... to the stem.
/// Never returns a path that already exists (dangling symlinks included) or
/// one that `is_claimed` reports as some record's trash location.
pub fn unique_destination(candidate: PathBuf, is_claimed: impl Fn(&Path) -> bool) -> PathBuf {
    first_variant(candidate, |path| !exists_no_follow(path) && !is_claimed(path))
}

/// Mirrored destination that never lands inside another trashed item
///
/// Each intermediate component must be a plain directory that no record owns
/// (or not exist yet). A file, a symlink, or another record's trash copy in
/// the way is stepped around with its first usable `_<n>` variant.
pub fn free_mirrored_destination(
    trash_dir: &Path,
    original: &Path,
    is_claimed: impl Fn(&Path) -> bool,
) -> PathBuf {
    let parts: Vec<&OsStr> = original
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();

    let Some((leaf, ancestors)) = parts.split_last() else {
        return trash_dir.to_path_buf();
    };

    let mut dest = trash_dir.to_path_buf();
    for part in ancestors {
        dest = first_variant(dest.join(part), |path| {
            if is_claimed(path) {
                return false;
            }
            match fs::symlink_metadata(path) {
                Ok(meta) => meta.is_dir(),
                Err(_) => true,
            }
        });
    }

    unique_destination(dest.join(leaf), is_claimed)
}

/// `candidate` if `accept` takes it, else the first accepted `_<n>` variant
fn first_variant(candidate: PathBuf, accept: impl Fn(&Path) -> bool) -> PathBuf {
    if accept(&candidate) {
        return candidate;
    }

    let name = candidate
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("unnamed"));

    let mut counter = 1u64;
    loop {
        let next = candidate.with_file_name(suffixed_name(&name, &counter.to_string()));
        if accept(&next) {
            return next;
        }
        counter += 1;
    }
}

/// Whether anything (file, directory, dangling link) sits at `path`
pub fn exists_no_follow(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Remove whatever sits at `path`, recursing into directories but never
/// following a symlink
pub fn remove_any(path: &Path) -> std::io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Remove empty directories from `start` upward, stopping at the first
/// non-empty one, at one `is_claimed` reports as a trashed item, at
/// `trash_dir`, or at anything outside `trash_dir`.
/// Returns the number of directories removed.
pub fn prune_empty_ancestors(
    start: &Path,
    trash_dir: &Path,
    is_claimed: impl Fn(&Path) -> bool,
) -> usize {
    let mut current = start.to_path_buf();
    let mut removed = 0;

    while current != trash_dir && current.starts_with(trash_dir) {
        if is_claimed(&current) {
            break;
        }
        match fs::read_dir(&current) {
            Ok(mut entries) => {
                if entries.next().is_some() {
                    break;
                }
            }
            Err(_) => break,
        }
        if fs::remove_dir(&current).is_err() {
            break;
        }
        removed += 1;
        if !current.pop() {
            break;
        }
    }

    removed
}

/// `report.txt` + `7` -> `report_7.txt`; `.bashrc` + `7` -> `.bashrc_7`
fn suffixed_name(name: &OsStr, suffix: &str) -> OsString {
    let as_path = Path::new(name);
    let stem = as_path.file_stem().unwrap_or(name);

    let mut out = stem.to_os_string();
    out.push("_");
    out.push(suffix);
    if let Some(ext) = as_path.extension() {
        out.push(".");
        out.push(ext);
    }
    out
}
