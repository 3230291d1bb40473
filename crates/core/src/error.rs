//! Error types for trash operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for trash operations
pub type Result<T> = std::result::Result<T, TrashError>;

/// Everything that can go wrong while trashing, restoring or collecting
#[derive(Debug, Error)]
pub enum TrashError {
    /// The input path could not be turned into an absolute canonical path
    #[error("cannot resolve {}: {reason}", path.display())]
    PathResolution { path: PathBuf, reason: String },

    /// Delete target does not exist
    #[error("{}: no such file or directory", .0.display())]
    NotFound(PathBuf),

    /// OS-level rename failed, in either direction
    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The persisted store exists but is not well-formed
    #[error("trash state at {} is corrupt: {reason}", path.display())]
    CorruptState { path: PathBuf, reason: String },

    /// Another invocation holds the lock
    #[error("another trash command is running (lock held at {})", .0.display())]
    LockBusy(PathBuf),

    /// Target is the trash area, lives inside it, or contains it
    #[error("refusing to trash {}: it overlaps the trash area", .0.display())]
    InsideTrash(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TrashError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must abort the whole invocation
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::LockBusy(_) | Self::CorruptState { .. })
    }
}
