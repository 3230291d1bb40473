//! Mutual exclusion between invocations

use crate::common::TestSandbox;
use crate::trash;
use anyhow::Result;
use cli_lib::locks::TrashLock;

#[test]
fn test_busy_lock_fails_without_changes() -> Result<()> {
    let sandbox = TestSandbox::mirrored()?;
    let file = sandbox.write("a.txt", "a")?;

    let held = TrashLock::try_acquire(&sandbox.lock_path())?;

    let result = trash!(sandbox, "delete", "a.txt").assert_failure()?;
    assert!(result.contains_stderr("another trash command is running"));
    assert!(file.exists());
    assert!(!sandbox.store_path().exists());

    held.release()?;

    trash!(sandbox, "delete", "a.txt").assert_success()?;
    assert!(!file.exists());

    // Lock file outlives the command
    assert!(sandbox.lock_path().exists());
    Ok(())
}
