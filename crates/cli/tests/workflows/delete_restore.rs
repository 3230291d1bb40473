//! Delete and restore round trips through the binary

use crate::common::TestSandbox;
use crate::trash;
use anyhow::Result;
use std::fs;

#[test]
fn test_delete_then_restore() -> Result<()> {
    let sandbox = TestSandbox::mirrored()?;
    let file = sandbox.write("tmp/a/report.txt", "numbers")?;

    let result = trash!(sandbox, "delete", "tmp/a/report.txt").assert_success()?;
    assert!(result.contains_stdout(&file.display().to_string()));
    assert!(!file.exists());

    let stored = sandbox.mirrored_path(&file);
    assert_eq!(fs::read_to_string(&stored)?, "numbers");

    let json = sandbox.store_json()?;
    let entry = &json["pathmap"][file.display().to_string()];
    assert_eq!(entry["trash_path"], stored.display().to_string());
    assert!(entry["deleted_at"].is_u64());

    trash!(sandbox, "restore", "tmp/a/report.txt").assert_success()?;
    assert_eq!(fs::read_to_string(&file)?, "numbers");
    assert!(!stored.exists());

    // Mirror skeleton pruned, root kept
    assert!(sandbox.trash_dir().is_dir());
    assert_eq!(fs::read_dir(sandbox.trash_dir())?.count(), 0);

    let list = trash!(sandbox, "list").assert_success()?;
    assert!(list.lines().is_empty());
    Ok(())
}

#[test]
fn test_aliases() -> Result<()> {
    let sandbox = TestSandbox::mirrored()?;
    let a = sandbox.write("a.txt", "a")?;
    let b = sandbox.write("b.txt", "b")?;

    trash!(sandbox, "rm", "a.txt").assert_success()?;
    trash!(sandbox, "put", "b.txt").assert_success()?;
    assert!(!a.exists() && !b.exists());

    let list = trash!(sandbox, "ls").assert_success()?;
    assert_eq!(list.lines().len(), 2);

    trash!(sandbox, "r", "a.txt", "b.txt").assert_success()?;
    assert!(a.exists() && b.exists());
    Ok(())
}

#[test]
fn test_directory_round_trip() -> Result<()> {
    let sandbox = TestSandbox::mirrored()?;
    sandbox.write("project/src/main.rs", "fn main() {}")?;
    sandbox.write("project/README", "hi")?;
    let dir = sandbox.work_dir().join("project");

    trash!(sandbox, "delete", "project").assert_success()?;
    assert!(!dir.exists());
    assert!(sandbox.mirrored_path(&dir).join("src/main.rs").is_file());

    trash!(sandbox, "restore", "project").assert_success()?;
    assert_eq!(fs::read_to_string(dir.join("src/main.rs"))?, "fn main() {}");
    assert_eq!(fs::read_to_string(dir.join("README"))?, "hi");
    Ok(())
}

#[test]
fn test_batch_continues_past_failures() -> Result<()> {
    let sandbox = TestSandbox::mirrored()?;
    let good = sandbox.write("good.txt", "g")?;

    let result = trash!(sandbox, "delete", "missing.txt", "good.txt").assert_failure()?;
    assert!(result.contains_stderr("missing.txt"));
    assert!(result.contains_stderr("1 of 2 paths could not be trashed"));

    // The good path was still trashed and recorded
    assert!(!good.exists());
    let list = trash!(sandbox, "list").assert_success()?;
    assert_eq!(list.lines(), vec![good.display().to_string().as_str()]);
    Ok(())
}

#[test]
fn test_retrash_replaces_previous_copy() -> Result<()> {
    let sandbox = TestSandbox::mirrored()?;
    let file = sandbox.write("notes.txt", "first")?;

    trash!(sandbox, "delete", "notes.txt").assert_success()?;
    sandbox.write("notes.txt", "second")?;
    let result = trash!(sandbox, "delete", "notes.txt").assert_success()?;
    assert!(result.contains_stdout("replaced copy"));

    let list = trash!(sandbox, "list").assert_success()?;
    assert_eq!(list.lines().len(), 1);

    trash!(sandbox, "restore", "notes.txt").assert_success()?;
    assert_eq!(fs::read_to_string(&file)?, "second");

    // Old copy is gone, nothing left behind
    assert_eq!(fs::read_dir(sandbox.trash_dir())?.count(), 0);
    Ok(())
}

#[test]
fn test_restore_refuses_to_overwrite() -> Result<()> {
    let sandbox = TestSandbox::mirrored()?;
    let file = sandbox.write("a.txt", "trashed")?;

    trash!(sandbox, "delete", "a.txt").assert_success()?;
    sandbox.write("a.txt", "newer")?;

    let result = trash!(sandbox, "restore", "a.txt").assert_failure()?;
    assert!(result.contains_stderr("could not be restored"));
    assert_eq!(fs::read_to_string(&file)?, "newer");

    // Record and trash copy survive the failed restore
    assert_eq!(fs::read_to_string(sandbox.mirrored_path(&file))?, "trashed");
    let list = trash!(sandbox, "list").assert_success()?;
    assert_eq!(list.lines().len(), 1);
    Ok(())
}

#[test]
fn test_restore_untrashed_is_noop() -> Result<()> {
    let sandbox = TestSandbox::mirrored()?;

    let result = trash!(sandbox, "restore", "never.txt").assert_success()?;
    assert!(result.contains_stdout("Nothing to restore"));
    assert!(!sandbox.store_path().exists());
    Ok(())
}

#[test]
fn test_refuses_trash_area() -> Result<()> {
    let sandbox = TestSandbox::mirrored()?;
    trash!(sandbox, "list").assert_success()?;

    let trash_dir = sandbox.trash_dir().display().to_string();
    let result = trash!(sandbox, "delete", &trash_dir).assert_failure()?;
    assert!(result.contains_stderr("overlaps the trash area"));
    assert!(sandbox.trash_dir().is_dir());
    Ok(())
}

#[test]
fn test_flat_layout() -> Result<()> {
    let sandbox = TestSandbox::new("7d", "flat")?;
    let one = sandbox.write("one/report.txt", "1")?;
    let two = sandbox.write("two/report.txt", "2")?;

    trash!(sandbox, "delete", "one/report.txt", "two/report.txt").assert_success()?;

    let stored: Vec<_> = fs::read_dir(sandbox.trash_dir())?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|p| p.is_file()));

    trash!(sandbox, "restore", "one/report.txt", "two/report.txt").assert_success()?;
    assert_eq!(fs::read_to_string(&one)?, "1");
    assert_eq!(fs::read_to_string(&two)?, "2");
    Ok(())
}

#[test]
fn test_delete_below_path_that_was_trashed_as_file() -> Result<()> {
    let sandbox = TestSandbox::mirrored()?;
    let x = sandbox.write("x", "file")?;
    trash!(sandbox, "delete", "x").assert_success()?;

    let y = sandbox.write("x/y", "nested")?;
    trash!(sandbox, "delete", "x/y").assert_success()?;
    assert!(!y.exists());

    trash!(sandbox, "restore", "x/y").assert_success()?;
    assert_eq!(fs::read_to_string(&y)?, "nested");
    assert_eq!(fs::read_to_string(sandbox.mirrored_path(&x))?, "file");
    Ok(())
}
