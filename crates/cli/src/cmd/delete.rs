//! Move paths into the trash

use crate::session;
use crate::util;
use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use trashcan_core::{Mover, TrashConfig};

pub fn run(config: &TrashConfig, paths: &[PathBuf]) -> Result<()> {
    let results = session::with_store(config, |store| Mover::new(config).trash_all(store, paths))??;

    let mut failed = 0;
    for (_, result) in &results {
        match result {
            Ok(outcome) => {
                println!(
                    "{} {} → {}",
                    "✓".green(),
                    outcome.record.original_path.display(),
                    outcome.record.trash_path.display().dimmed()
                );
                if let Some(previous) = &outcome.replaced {
                    let when = previous
                        .deleted_at
                        .map(util::format_relative_time)
                        .unwrap_or_else(|| "earlier".to_string());
                    println!(
                        "  {}",
                        format!("replaced copy trashed {}", when).yellow()
                    );
                }
            }
            Err(err) => {
                failed += 1;
                eprintln!("{} {}", "✗".red(), err);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!(
            "{} of {} could not be trashed",
            failed,
            util::plural(results.len(), "path")
        );
    }

    Ok(())
}
