//! Host collaborators for Quadlet Fleet
//!
//! The side-effecting half of the deployer: git materialization of the
//! tenant tree, OS user lifecycle for execution identities, systemd
//! user-manager control, and the [`fleet_core::Deployer`] implementation
//! that glues them together. Everything here blocks the calling thread;
//! the reconciliation cycle is synchronous by design.

pub mod deploy;
pub mod error;
pub mod git;
pub mod identity;
pub mod process;
pub mod systemd;

pub use deploy::HostDeployer;
pub use error::{Error, Result};
pub use git::GitSource;
pub use identity::UserDirectory;
