//! Run garbage collection

use crate::session;
use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use trashcan_core::config::{format_ttl, parse_ttl};
use trashcan_core::{GarbageCollector, RetentionPolicy, TrashConfig};

pub fn run(config: &TrashConfig, ttl: Option<&str>) -> Result<()> {
    // 1. Retention window: command line beats config
    let policy = match ttl {
        Some(ttl) => RetentionPolicy::new(parse_ttl(ttl).context("Invalid ttl argument")?),
        None => RetentionPolicy::from(config),
    };

    println!(
        "{} {}",
        "Running Garbage Collection...".bold(),
        format!("(older than {})", format_ttl(policy.ttl)).dimmed()
    );
    println!();

    // 2. Sweep under the lock
    let report = session::with_store(config, |store| {
        GarbageCollector::new(config, policy).collect(store)
    })?;

    // 3. Display results
    println!("{}", "GC Complete".green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    if !report.removed_anything() {
        println!("{}", "No expired items - trash is already clean".dimmed());
    } else {
        println!("Files deleted:       {}", report.files_removed.to_string().yellow());
        println!("Directories deleted: {}", report.dirs_removed.to_string().yellow());
        println!("Records dropped:     {}", report.records_removed.to_string().yellow());
        if report.dangling_records > 0 {
            println!(
                "Dangling records:    {}",
                report.dangling_records.to_string().yellow()
            );
        }
        if report.dirs_pruned > 0 {
            println!("Empty dirs pruned:   {}", report.dirs_pruned.to_string().yellow());
        }
        println!();
        println!(
            "Space freed:         {}",
            util::format_size(report.bytes_freed).green()
        );
    }
    println!("Still in trash:      {}", report.kept.to_string().cyan());

    if !report.errors.is_empty() {
        println!();
        for (path, err) in &report.errors {
            eprintln!("{} {}: {}", "✗".red(), path.display(), err);
        }
        anyhow::bail!(
            "{} could not be collected",
            util::plural(report.errors.len(), "item")
        );
    }

    Ok(())
}
