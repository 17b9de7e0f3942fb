//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Command-line arguments for the repaint demo.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "verdant", about = "Live biome repainting demo")]
pub struct CliArgs {
    /// Version banner the in-process host announces.
    #[arg(long)]
    pub banner: Option<String>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Maximum distinct columns waiting for the sync worker.
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref banner) = args.banner {
            self.host.version_banner = banner.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(capacity) = args.queue_capacity {
            self.sync.queue_capacity = capacity;
        }
    }
}
