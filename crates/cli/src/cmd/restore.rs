//! Move trashed paths back to where they came from

use crate::session;
use crate::util;
use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use trashcan_core::{RestoreOutcome, Restorer, TrashConfig};

pub fn run(config: &TrashConfig, paths: &[PathBuf]) -> Result<()> {
    let results =
        session::with_store(config, |store| Restorer::new(config).restore_all(store, paths))??;

    let mut failed = 0;
    for (_, result) in &results {
        match result {
            Ok(RestoreOutcome::Restored { record, .. }) => {
                println!(
                    "{} {} → {}",
                    "✓".green(),
                    record.trash_path.display().dimmed(),
                    record.original_path.display()
                );
            }
            Ok(RestoreOutcome::NotTrashed(path)) => {
                println!(
                    "{}",
                    format!("Nothing to restore for {}", path.display()).dimmed()
                );
            }
            Err(err) => {
                failed += 1;
                eprintln!("{} {}", "✗".red(), err);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!(
            "{} of {} could not be restored",
            failed,
            util::plural(results.len(), "path")
        );
    }

    Ok(())
}
