//! Scoped store access for one command invocation
//!
//! lock -> load -> operate -> save (if changed) -> release. The lock guard
//! releases on every early return, so a failed load never leaves it held.

use crate::locks::TrashLock;
use anyhow::{Context, Result};
use trashcan_core::{TrashConfig, TrashStore};

/// Run `op` against the store while holding the trash lock
///
/// Fatal errors (`LockBusy`, `CorruptState`) abort before `op` runs. Whatever `op` did to
/// the store is saved before the lock is released, including when `op`
/// reports per-item failures in its return value.
pub fn with_store<T>(config: &TrashConfig, op: impl FnOnce(&mut TrashStore) -> T) -> Result<T> {
    let lock_path = config.lock_path();
    let lock = match TrashLock::try_acquire(&lock_path) {
        Ok(lock) => lock,
        Err(err) if err.is_fatal() => {
            let holder = TrashLock::holder(&lock_path)
                .map(|pid| format!(" (pid {})", pid))
                .unwrap_or_default();
            return Err(err).context(format!("Try again once it finishes{}", holder));
        }
        Err(err) => return Err(err).context("Failed to acquire trash lock"),
    };

    let mut store = match TrashStore::load(&config.store_path) {
        Ok(store) => store,
        Err(err) if err.is_fatal() => {
            return Err(err).context(format!(
                "Move {} aside to start with an empty trash",
                config.store_path.display()
            ));
        }
        Err(err) => return Err(err).context("Failed to load trash store"),
    };
    store.attach(config);

    let output = op(&mut store);

    if store.is_dirty() {
        store
            .save(&config.store_path)
            .context("Failed to save trash store")?;
    }

    lock.release().context("Failed to release trash lock")?;
    Ok(output)
}
