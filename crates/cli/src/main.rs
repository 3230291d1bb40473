//! trashcan CLI - trash command

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli_lib::{cmd, util};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// trashcan - a recoverable rm
#[derive(Parser)]
#[command(name = "trash")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: <config_dir>/trashcan/config.toml)
    #[arg(long, global = true, env = "TRASHCAN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Move files or directories into the trash
    #[command(visible_aliases = ["put", "p", "rm"])]
    Delete {
        /// Paths to trash
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Put trashed paths back where they were
    #[command(visible_alias = "r")]
    Restore {
        /// Original paths of trashed items
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Permanently remove items older than the retention window
    Gc {
        /// Override the configured window (e.g. 7, 7d, 12h, 30m)
        ttl: Option<String>,
    },
    /// List original paths of trashed items
    #[command(visible_alias = "ls")]
    List {
        /// Show deletion time and trash location
        #[arg(short, long)]
        long: bool,
    },
    /// Show or create the configuration file
    Config {
        /// Print the config file path
        #[arg(long, conflicts_with = "example")]
        path: bool,
        /// Print an annotated example config
        #[arg(long)]
        example: bool,
        /// Create the config file with defaults if missing
        #[arg(long, conflicts_with = "example")]
        init: bool,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays pipeable
    let filter = EnvFilter::try_from_env("TRASHCAN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config_override = cli.config.as_deref();

    match cli.command {
        Commands::Delete { paths } => {
            let config = util::load_trash_config(config_override)?;
            cmd::delete::run(&config, &paths)
        }
        Commands::Restore { paths } => {
            let config = util::load_trash_config(config_override)?;
            cmd::restore::run(&config, &paths)
        }
        Commands::Gc { ttl } => {
            let config = util::load_trash_config(config_override)?;
            cmd::gc::run(&config, ttl.as_deref())
        }
        Commands::List { long } => {
            let config = util::load_trash_config(config_override)?;
            cmd::list::run(&config, long)
        }
        Commands::Config { path, example, init } => {
            if example {
                cmd::config::run_example()
            } else if path || init {
                cmd::config::run_path(config_override, init)
            } else {
                cmd::config::run_show(config_override)
            }
        }
    }
}
