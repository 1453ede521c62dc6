//! Quadlet Fleet CLI
//!
//! Reconciles per-tenant quadlet definitions from a git repository onto the
//! local host; one invocation runs one cycle.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    match cli.command {
        Commands::Sync { dry_run } => commands::run_sync(&cli.config, dry_run),
        Commands::Check { dir } => commands::run_check(&dir),
        Commands::Augment { file } => commands::run_augment(&cli.config, &file),
    }
}
