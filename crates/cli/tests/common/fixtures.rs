//! Isolated trash environments for CLI tests

use super::cli::TrashCommand;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory holding a config file, a trash root, a store and a
/// working directory with user files
pub struct TestSandbox {
    _temp: TempDir,
    root: PathBuf,
}

impl TestSandbox {
    /// Sandbox with the given `[trash]` ttl and layout
    pub fn new(ttl: &str, layout: &str) -> Result<Self> {
        let temp = TempDir::new()?;
        let root = fs::canonicalize(temp.path())?;
        fs::create_dir_all(root.join("work"))?;

        let sandbox = Self { _temp: temp, root };
        fs::write(
            sandbox.config_path(),
            format!(
                "[trash]\ndir = \"{}\"\nstore = \"{}\"\nttl = \"{}\"\nlayout = \"{}\"\n",
                sandbox.trash_dir().display(),
                sandbox.store_path().display(),
                ttl,
                layout
            ),
        )?;
        Ok(sandbox)
    }

    /// Mirrored layout, one week retention
    pub fn mirrored() -> Result<Self> {
        Self::new("7d", "mirrored")
    }

    pub fn work_dir(&self) -> PathBuf {
        self.root.join("work")
    }

    pub fn trash_dir(&self) -> PathBuf {
        self.root.join("trash")
    }

    pub fn store_path(&self) -> PathBuf {
        self.root.join("state").join("store.json")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join("state").join("store.json.lock")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Create a file under the working directory
    pub fn write(&self, rel: &str, contents: &str) -> Result<PathBuf> {
        let path = self.work_dir().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Where the mirrored layout puts `original`
    pub fn mirrored_path(&self, original: &Path) -> PathBuf {
        self.trash_dir()
            .join(original.strip_prefix("/").unwrap_or(original))
    }

    /// Persisted store as raw JSON
    pub fn store_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&fs::read_to_string(self.store_path())?)?)
    }

    /// Command running in the working directory against this sandbox
    pub fn command(&self) -> TrashCommand {
        let mut cmd = TrashCommand::new(self.work_dir());
        cmd.env("TRASHCAN_CONFIG", self.config_path());
        cmd
    }
}
