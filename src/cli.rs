//! CLI definitions for Mycelium.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Mycelium CLI.
#[derive(Parser)]
#[command(name = "mycelium")]
#[command(about = "Embeddable deployment micro-kernel")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/kernel.toml", global = true)]
    pub config: PathBuf,

    /// Kernel root directory (overrides `home` from the config file)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Directory for rolling log files
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Boot the kernel and run until interrupted (default)
    Run {
        /// Deploy each wave one unit at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Check the configuration file and exit
    Validate {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}
