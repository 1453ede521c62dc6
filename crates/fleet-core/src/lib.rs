//! Reconciliation core for Quadlet Fleet
//!
//! Builds the desired set of rendered unit definitions from a source tree
//! plus a transform registry, diffs it against the currently-managed entity
//! set, and drives a [`Deployer`] through the minimal set of create, update,
//! and remove actions. Change detection runs on persisted content
//! fingerprints, so repeated cycles over unchanged input are per-entity
//! no-ops.
//!
//! The core performs no network I/O and controls no processes; those
//! concerns live behind the [`SourceSync`], [`Deployer`], and
//! [`IdentityDirectory`] collaborator traits.

pub mod check;
pub mod config;
pub mod desired;
pub mod diff;
pub mod error;
pub mod fingerprint;
pub mod reconcile;

pub use check::{Finding, check_tree};
pub use config::FleetConfig;
pub use desired::{DesiredState, build_desired, load_transforms};
pub use diff::DiffPlan;
pub use error::{Error, Result};
pub use fingerprint::FingerprintStore;
pub use reconcile::{
    CycleReport, DeployError, Deployer, EntityFailure, FailureStage, IdentityDirectory, Reconciler,
    SourceSync, SyncOutcome,
};
