//! Garbage collection through the binary

use crate::common::TestSandbox;
use crate::trash;
use anyhow::Result;
use filetime::FileTime;
use std::fs;
use std::time::{Duration, SystemTime};

/// Rewrite a record's deletion time in the persisted store
fn backdate(sandbox: &TestSandbox, original: &std::path::Path, secs_ago: u64) -> Result<()> {
    let mut json = sandbox.store_json()?;
    let now = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?.as_secs();
    json["pathmap"][original.display().to_string()]["deleted_at"] = (now - secs_ago).into();
    fs::write(sandbox.store_path(), serde_json::to_string_pretty(&json)?)?;
    Ok(())
}

#[test]
fn test_gc_removes_only_expired() -> Result<()> {
    let sandbox = TestSandbox::mirrored()?;
    let old = sandbox.write("old.txt", "old")?;
    let fresh = sandbox.write("fresh.txt", "fresh")?;

    trash!(sandbox, "delete", "old.txt", "fresh.txt").assert_success()?;
    backdate(&sandbox, &old, 8 * 86400)?;

    let result = trash!(sandbox, "gc").assert_success()?;
    assert!(result.contains_stdout("GC Complete"));

    assert!(!sandbox.mirrored_path(&old).exists());
    assert!(sandbox.mirrored_path(&fresh).exists());

    let list = trash!(sandbox, "list").assert_success()?;
    assert_eq!(list.lines(), vec![fresh.display().to_string().as_str()]);
    Ok(())
}

#[test]
fn test_gc_ttl_argument_overrides_config() -> Result<()> {
    let sandbox = TestSandbox::mirrored()?;
    let file = sandbox.write("a.txt", "a")?;

    trash!(sandbox, "delete", "a.txt").assert_success()?;
    backdate(&sandbox, &file, 2 * 3600)?;

    // Within the configured week
    trash!(sandbox, "gc").assert_success()?;
    assert!(sandbox.mirrored_path(&file).exists());

    // Outside one hour
    trash!(sandbox, "gc", "1h").assert_success()?;
    assert!(!sandbox.mirrored_path(&file).exists());
    assert!(trash!(sandbox, "list").assert_success()?.lines().is_empty());
    Ok(())
}

#[test]
fn test_gc_untracked_by_mtime() -> Result<()> {
    let sandbox = TestSandbox::mirrored()?;
    trash!(sandbox, "list").assert_success()?;

    let stray = sandbox.trash_dir().join("leftovers/stray.bin");
    fs::create_dir_all(stray.parent().unwrap())?;
    fs::write(&stray, vec![0u8; 2048])?;
    let month_ago = SystemTime::now() - Duration::from_secs(30 * 86400);
    filetime::set_file_mtime(&stray, FileTime::from_system_time(month_ago))?;

    let recent = sandbox.trash_dir().join("recent.bin");
    fs::write(&recent, b"r")?;

    let result = trash!(sandbox, "gc").assert_success()?;
    assert!(result.contains_stdout("Space freed"));

    assert!(!stray.exists());
    assert!(!stray.parent().unwrap().exists());
    assert!(recent.exists());
    assert!(sandbox.trash_dir().is_dir());
    Ok(())
}

#[test]
fn test_gc_clean_trash() -> Result<()> {
    let sandbox = TestSandbox::mirrored()?;

    let result = trash!(sandbox, "gc").assert_success()?;
    assert!(result.contains_stdout("already clean"));
    Ok(())
}

#[test]
fn test_gc_rejects_bad_ttl() -> Result<()> {
    let sandbox = TestSandbox::mirrored()?;

    let result = trash!(sandbox, "gc", "soon").assert_failure()?;
    assert!(result.contains_stderr("invalid ttl"));
    Ok(())
}

#[test]
fn test_gc_keeps_fresh_item_trashed_from_expired_dir() -> Result<()> {
    let sandbox = TestSandbox::mirrored()?;
    sandbox.write("d/old.txt", "old")?;
    let dir = sandbox.work_dir().join("d");

    trash!(sandbox, "delete", "d").assert_success()?;
    let fresh = sandbox.write("d/f", "fresh")?;
    trash!(sandbox, "delete", "d/f").assert_success()?;
    backdate(&sandbox, &dir, 8 * 86400)?;

    trash!(sandbox, "gc").assert_success()?;
    assert!(!sandbox.mirrored_path(&dir).exists());

    let list = trash!(sandbox, "list").assert_success()?;
    assert_eq!(list.lines(), vec![fresh.display().to_string().as_str()]);

    trash!(sandbox, "restore", "d/f").assert_success()?;
    assert_eq!(fs::read_to_string(&fresh)?, "fresh");
    Ok(())
}
