//! System configuration file
//!
//! Loaded from `<config_dir>/trashcan/config.toml` unless `--config` (or
//! `TRASHCAN_CONFIG`) names another file. A missing file means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use trashcan_core::config::parse_ttl;
use trashcan_core::{Layout, TrashConfig};

/// Default retention window as written in the config file
pub const DEFAULT_TTL: &str = "7d";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub trash: TrashSection,
}

/// `[trash]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrashSection {
    /// Trash root; defaults to `<data_local_dir>/trashcan/files`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Store file; defaults to `<data_local_dir>/trashcan/store.json`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<PathBuf>,
    /// Retention window, e.g. "7d", "12h", "30"
    pub ttl: String,
    pub layout: Layout,
}

impl Default for TrashSection {
    fn default() -> Self {
        Self {
            dir: None,
            store: None,
            ttl: DEFAULT_TTL.to_string(),
            layout: Layout::default(),
        }
    }
}

impl SystemConfig {
    /// Check values without touching the filesystem
    pub fn validate(&self) -> Result<()> {
        parse_ttl(&self.trash.ttl).context("Invalid [trash].ttl")?;
        self.to_trash_config()?
            .validate()
            .context("Invalid [trash] paths")?;
        Ok(())
    }

    /// Resolve defaults into a `TrashConfig` (not yet prepared)
    pub fn to_trash_config(&self) -> Result<TrashConfig> {
        let trash_dir = match &self.trash.dir {
            Some(dir) => expand_home(dir),
            None => default_data_dir()?.join("files"),
        };
        let store_path = match &self.trash.store {
            Some(store) => expand_home(store),
            None => default_data_dir()?.join("store.json"),
        };
        let ttl = parse_ttl(&self.trash.ttl).context("Invalid [trash].ttl")?;

        Ok(TrashConfig::new(trash_dir, store_path)
            .with_ttl(ttl)
            .with_layout(self.trash.layout))
    }
}

/// Default location of the config file
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("trashcan").join("config.toml"))
}

/// Config file to use: the explicit override or the default location
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => config_file_path().context("Could not determine config file path"),
    }
}

/// `<data_local_dir>/trashcan`
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|dir| dir.join("trashcan"))
        .context("Could not determine local data directory")
}

/// Load config from `path`, falling back to defaults if it does not exist
pub fn load(path: &Path) -> Result<SystemConfig> {
    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Ok(SystemConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: SystemConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    config.validate()?;
    Ok(config)
}

/// Write config to `path`
pub fn save(path: &Path, config: &SystemConfig) -> Result<()> {
    config.validate()?;
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    trashcan_core::store::atomic_write(path, contents.as_bytes())
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(())
}

/// Create the config file with defaults if it is missing
///
/// Returns true if a file was created.
pub fn init_if_missing(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save(path, &SystemConfig::default())?;
    Ok(true)
}

/// Annotated example file
pub fn example_config() -> String {
    format!(
        r#"# trashcan configuration

[trash]
# Where trashed files are kept (default: <data_local_dir>/trashcan/files)
# dir = "~/.local/share/trashcan/files"

# Record of trashed paths (default: <data_local_dir>/trashcan/store.json)
# store = "~/.local/share/trashcan/store.json"

# How long items stay before `trash gc` removes them.
# A bare number is days; suffixes: s, m, h, d, w
ttl = "{}"

# "mirrored" keeps the original directory structure under `dir`,
# "flat" stores <name>_<unix-time><ext> directly in `dir`
layout = "mirrored"
"#,
        DEFAULT_TTL
    )
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
