//! Auth-key minting for fleet entities
//!
//! Exchanges an OAuth client credential for a Tailscale API token, mints a
//! tagged, short-lived auth key, and writes it to an env file that the
//! deployed container units reference via `EnvironmentFile=`. Runs out of
//! band from the reconciliation cycle, typically from a systemd timer.

pub mod client;
pub mod config;
pub mod error;
pub mod output;

pub use client::KeyMinter;
pub use config::MintConfig;
pub use error::{Error, Result};
pub use output::write_env_file;
