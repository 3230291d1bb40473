//! Trash configuration
//!
//! The configuration is an explicit value handed to every component. There is
//! no process-wide trash root; tests build one per temporary directory.

use crate::error::{Result, TrashError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default retention window (7 days)
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// How trashed items are laid out under the trash root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Reproduce the original directory hierarchy under the trash root
    #[default]
    Mirrored,
    /// Place everything directly under the trash root, `<stem>_<unix-ts><ext>`
    Flat,
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layout::Mirrored => f.write_str("mirrored"),
            Layout::Flat => f.write_str("flat"),
        }
    }
}

impl std::str::FromStr for Layout {
    type Err = TrashError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mirrored" => Ok(Layout::Mirrored),
            "flat" => Ok(Layout::Flat),
            other => Err(TrashError::InvalidConfig(format!(
                "unknown layout '{}' (expected 'mirrored' or 'flat')",
                other
            ))),
        }
    }
}

/// Everything a trash component needs to know about its environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashConfig {
    /// Root of the holding area
    pub trash_dir: PathBuf,
    /// Location of the persisted record set
    pub store_path: PathBuf,
    /// Retention window used by the garbage collector
    pub ttl: Duration,
    /// Trash layout strategy
    pub layout: Layout,
}

impl TrashConfig {
    /// Create a config with the default TTL and layout
    pub fn new(trash_dir: impl Into<PathBuf>, store_path: impl Into<PathBuf>) -> Self {
        Self {
            trash_dir: trash_dir.into(),
            store_path: store_path.into(),
            ttl: DEFAULT_TTL,
            layout: Layout::default(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Path of the lock file guarding the store (`<store>.lock`)
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .store_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.store_path.with_file_name(name)
    }

    /// Check the configuration without touching the filesystem
    pub fn validate(&self) -> Result<()> {
        if !self.trash_dir.is_absolute() {
            return Err(TrashError::InvalidConfig(format!(
                "trash_dir must be absolute: {}",
                self.trash_dir.display()
            )));
        }
        if self.trash_dir.parent().is_none() {
            return Err(TrashError::InvalidConfig(
                "trash_dir cannot be the filesystem root".to_string(),
            ));
        }
        if !self.store_path.is_absolute() || self.store_path.file_name().is_none() {
            return Err(TrashError::InvalidConfig(format!(
                "store must be an absolute file path: {}",
                self.store_path.display()
            )));
        }
        if self.store_path.starts_with(&self.trash_dir) {
            return Err(TrashError::InvalidConfig(format!(
                "store {} must not live inside trash_dir {}",
                self.store_path.display(),
                self.trash_dir.display()
            )));
        }
        Ok(())
    }

    /// Validate, create the trash root and store directory, and canonicalize
    /// both so later prefix checks compare like with like.
    pub fn prepare(mut self) -> Result<Self> {
        self.validate()?;

        fs::create_dir_all(&self.trash_dir).map_err(|e| TrashError::io(&self.trash_dir, e))?;
        self.trash_dir =
            fs::canonicalize(&self.trash_dir).map_err(|e| TrashError::io(&self.trash_dir, e))?;

        if let (Some(parent), Some(name)) = (self.store_path.parent(), self.store_path.file_name()) {
            fs::create_dir_all(parent).map_err(|e| TrashError::io(parent, e))?;
            let parent = fs::canonicalize(parent).map_err(|e| TrashError::io(parent, e))?;
            self.store_path = parent.join(name);
        }

        // Symlinks may have hidden an overlap
        self.validate()?;
        Ok(self)
    }

    /// Whether `path` is the trash root or somewhere beneath it
    pub fn is_in_trash(&self, path: &Path) -> bool {
        path.starts_with(&self.trash_dir)
    }
}

/// Parse a retention window
///
/// Supports:
/// - Bare integer: days ("7")
/// - Suffixed: "45s", "30m", "12h", "7d", "2w"
pub fn parse_ttl(input: &str) -> Result<Duration> {
    let input = input.trim();
    let invalid = || {
        TrashError::InvalidConfig(format!(
            "invalid ttl '{}' (expected e.g. 7, 7d, 12h, 30m, 45s, 2w)",
            input
        ))
    };

    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (digits, unit) = input.split_at(split);
    if digits.is_empty() {
        return Err(invalid());
    }
    let value: u64 = digits.parse().map_err(|_| invalid())?;

    let multiplier = match unit {
        "" | "d" => 86400,
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        "w" => 604800,
        _ => return Err(invalid()),
    };

    value
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}

/// Render a retention window in the largest unit that divides it evenly
pub fn format_ttl(ttl: Duration) -> String {
    let secs = ttl.as_secs();
    for (unit, size) in [("w", 604800), ("d", 86400), ("h", 3600), ("m", 60)] {
        if secs > 0 && secs % size == 0 {
            return format!("{}{}", secs / size, unit);
        }
    }
    format!("{}s", secs)
}
