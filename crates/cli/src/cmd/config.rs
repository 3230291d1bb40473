//! Configuration management command
//!
//! Shows the effective configuration, where it is read from, and an
//! annotated example.

use crate::system_config;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;
use trashcan_core::config::format_ttl;

/// Show the effective configuration
pub fn run_show(config_override: Option<&Path>) -> Result<()> {
    let config_path = system_config::resolve_path(config_override)?;
    let config = system_config::load(&config_path)?;
    let trash = config.to_trash_config()?;

    println!("{}", "Trash Configuration".bold());
    if config_path.exists() {
        println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());
    } else {
        println!(
            "{}: {} {}\n",
            "Location".dimmed(),
            config_path.display().dimmed(),
            "(not created, using defaults)".yellow()
        );
    }

    println!("{}", "[trash]".yellow());
    println!("  {} = {}", "dir".cyan(), trash.trash_dir.display());
    println!("  {} = {}", "store".cyan(), trash.store_path.display());
    println!(
        "  {} = {} {}",
        "ttl".cyan(),
        config.trash.ttl,
        format!("({}s = {})", trash.ttl.as_secs(), format_ttl(trash.ttl)).dimmed()
    );
    println!("  {} = {}", "layout".cyan(), trash.layout);

    println!("\n{}", "Valid Values:".bold());
    println!("  ttl: <n> days, or <n> with suffix s, m, h, d, w");
    println!("  layout: mirrored, flat");

    Ok(())
}

/// Show the config file path and optionally create it
pub fn run_path(config_override: Option<&Path>, create: bool) -> Result<()> {
    let config_path = system_config::resolve_path(config_override)
        .context("Could not determine config file path")?;

    if create && system_config::init_if_missing(&config_path)? {
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!("{}", "File does not exist. Use --init to create it.".yellow());
    }

    Ok(())
}

/// Show example configuration
pub fn run_example() -> Result<()> {
    let example = system_config::example_config();
    println!("{}", example);
    Ok(())
}
