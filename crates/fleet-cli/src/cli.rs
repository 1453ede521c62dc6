//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Quadlet Fleet - deploy per-tenant container definitions from git
#[derive(Parser, Debug)]
#[command(name = "quadlet-fleet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the deployer configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "QUADLET_FLEET_CONFIG",
        default_value = "/etc/quadlet-fleet/config.toml"
    )]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run one full reconciliation cycle (git sync, merge, deploy, cleanup)
    Sync {
        /// Compute and print the plan without touching the host
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate unit files in a directory tree
    Check {
        /// Directory to validate
        dir: PathBuf,
    },

    /// Print one spec merged with its group transform to stdout
    Augment {
        /// Unit file to merge; the transform is picked by its parent
        /// directory name
        file: PathBuf,
    },
}
