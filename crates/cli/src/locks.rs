//! Lock file management for command exclusivity
//!
//! One `trash` invocation at a time may touch a given store. The lock is a
//! non-blocking `flock` on `<store>.lock`, held from before the store is
//! loaded until after it is saved.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use trashcan_core::{Result, TrashError};

/// Held exclusive lock on a trash store
pub struct TrashLock {
    path: PathBuf,
    file: File,
    released: bool,
}

/// Lock file content
#[derive(Debug, Serialize, Deserialize)]
struct LockContent {
    pid: u32,
    started_at: u64,
}

impl TrashLock {
    /// Try to acquire the lock without waiting
    ///
    /// Returns `LockBusy` if another process (or another handle in this one)
    /// holds it.
    pub fn try_acquire(lock_path: &Path) -> Result<Self> {
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(lock_path)
            .map_err(|e| io_error(lock_path, e))?;

        if !try_flock_exclusive(&file).map_err(|e| io_error(lock_path, e))? {
            return Err(TrashError::LockBusy(lock_path.to_path_buf()));
        }

        Self::write_lock_content(&mut file).map_err(|e| io_error(lock_path, e))?;
        tracing::debug!("Acquired trash lock {}", lock_path.display());

        Ok(Self {
            path: lock_path.to_path_buf(),
            file,
            released: false,
        })
    }

    /// Release the lock
    pub fn release(mut self) -> Result<()> {
        self.unlock()
    }

    /// Pid recorded by the current holder, if readable
    pub fn holder(lock_path: &Path) -> Option<u32> {
        let mut file = File::open(lock_path).ok()?;
        Self::read_lock_content(&mut file).ok().map(|c| c.pid)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unlock(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        // The file stays: unlinking a flock'd path lets two processes lock
        // different inodes.
        let _ = self.file.set_len(0);
        unlock_flock(&self.file).map_err(|e| io_error(&self.path, e))?;
        tracing::debug!("Released trash lock {}", self.path.display());
        Ok(())
    }

    /// Write lock content (PID + timestamp)
    fn write_lock_content(file: &mut File) -> std::io::Result<()> {
        let content = LockContent {
            pid: std::process::id(),
            started_at: current_timestamp_ms(),
        };

        let serialized = serde_json::to_string(&content)?;

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(serialized.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    /// Read lock content from file
    fn read_lock_content(file: &mut File) -> std::io::Result<LockContent> {
        file.seek(SeekFrom::Start(0))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl Drop for TrashLock {
    fn drop(&mut self) {
        if let Err(e) = self.unlock() {
            tracing::warn!("Failed to release trash lock: {}", e);
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> TrashError {
    TrashError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Try to acquire exclusive file lock (non-blocking)
#[cfg(unix)]
fn try_flock_exclusive(file: &File) -> std::io::Result<bool> {
    use nix::fcntl::{flock, FlockArg};
    use std::os::unix::io::AsRawFd;

    match flock(file.as_raw_fd(), FlockArg::LockExclusiveNonblock) {
        Ok(_) => Ok(true),
        Err(nix::errno::Errno::EWOULDBLOCK) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(unix)]
fn unlock_flock(file: &File) -> std::io::Result<()> {
    use nix::fcntl::{flock, FlockArg};
    use std::os::unix::io::AsRawFd;

    flock(file.as_raw_fd(), FlockArg::Unlock).map_err(Into::into)
}

#[cfg(not(unix))]
fn try_flock_exclusive(_file: &File) -> std::io::Result<bool> {
    // No advisory locking here; callers run unserialized
    Ok(true)
}

#[cfg(not(unix))]
fn unlock_flock(_file: &File) -> std::io::Result<()> {
    Ok(())
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
