//! fleet-mint-key binary
//!
//! Companion to `quadlet-fleet`: mints one tagged auth key and writes it
//! where the entity's container unit expects its `EnvironmentFile=`.

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use fleet_mint::{KeyMinter, MintConfig, Result, write_env_file};

/// Mint a Tailscale auth key into an env file
#[derive(Parser, Debug)]
#[command(name = "fleet-mint-key")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the OAuth credential env file
    #[arg(short, long, default_value = "/etc/tailscale/oauth.env")]
    config: PathBuf,

    /// Tag to apply to the minted key (e.g. tag:fleet)
    #[arg(short, long)]
    tag: String,

    /// Output env file receiving TS_AUTHKEY=
    #[arg(short, long)]
    output: PathBuf,

    /// Hostname to record as TS_HOSTNAME= and as the key description
    #[arg(long, default_value = "")]
    hostname: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

#[tokio::main]
async fn run() -> Result<()> {
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

    let config = MintConfig::load(&cli.config)?;
    let key = KeyMinter::new(config).mint(&cli.tag, &cli.hostname).await?;
    write_env_file(&cli.output, &key, &cli.hostname)?;
    info!(output = %cli.output.display(), tag = %cli.tag, "auth key minted");
    Ok(())
}
