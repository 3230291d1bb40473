//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use std::time::{SystemTime, UNIX_EPOCH};
use trashcan_core::TrashConfig;

use crate::system_config;
use std::path::Path;

/// Load the config file and turn it into a ready-to-use `TrashConfig`
///
/// Creates the trash root and store directory if needed.
pub fn load_trash_config(config_override: Option<&Path>) -> Result<TrashConfig> {
    let path = system_config::resolve_path(config_override)?;
    let config = system_config::load(&path)?;
    config
        .to_trash_config()?
        .prepare()
        .context("Failed to prepare trash directory")
}

/// Format timestamp as relative time ("2 hours ago")
pub fn format_relative_time(ts_secs: u64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format_relative_time_at(ts_secs, now)
}

fn format_relative_time_at(ts_secs: u64, now_secs: u64) -> String {
    let Some(seconds) = now_secs.checked_sub(ts_secs) else {
        return "in the future".to_string();
    };

    if seconds < 60 {
        format!("{} seconds ago", seconds)
    } else if seconds < 3600 {
        format!("{} minutes ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours ago", seconds / 3600)
    } else if seconds < 604800 {
        format!("{} days ago", seconds / 86400)
    } else {
        format!("{} weeks ago", seconds / 604800)
    }
}

/// Format timestamp as local absolute time ("2024-01-03 14:30:00")
pub fn format_absolute_time(ts_secs: u64) -> String {
    i64::try_from(ts_secs)
        .ok()
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Format file size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// "1 path" / "3 paths"
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
