//! List trashed paths

use crate::session;
use crate::util;
use anyhow::Result;
use owo_colors::OwoColorize;
use trashcan_core::{Lister, TrashConfig, TrashRecord};

pub fn run(config: &TrashConfig, long: bool) -> Result<()> {
    let records: Vec<TrashRecord> =
        session::with_store(config, |store| Lister::new(store).entries().cloned().collect())?;

    if !long {
        // One path per line, safe to pipe
        for record in &records {
            println!("{}", record.original_path.display());
        }
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", "Trash is empty".dimmed());
        return Ok(());
    }

    for record in &records {
        let when = match record.deleted_at {
            Some(ts) => format!(
                "{} ({})",
                util::format_absolute_time(ts),
                util::format_relative_time(ts)
            ),
            None => "unknown time".to_string(),
        };
        println!("{}", record.original_path.display().bold());
        println!("  {} {}", "deleted:".dimmed(), when.cyan());
        println!("  {} {}", "stored: ".dimmed(), record.trash_path.display());
    }
    println!();
    println!("{}", util::plural(records.len(), "item").dimmed());

    Ok(())
}
