//! The reconciliation cycle
//!
//! Turns a freshly built desired state and the currently-managed entity set
//! into the minimal set of create, update, and remove actions, gated
//! per-entity by persisted fingerprints. Side effects run behind the
//! [`Deployer`] trait; a failure on one entity never stops the others.
//!
//! The cycle is synchronous and single-threaded, driven by one external
//! invocation at a time. The fingerprint store and the identity namespace
//! are touched without locking, so overlapping cycles must be excluded
//! externally (non-overlapping timer or a lock file around the whole run).
//! Every action is safe to re-run: an interrupted cycle is repaired by the
//! next one recomputing desired state from scratch.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::desired::DesiredState;
use crate::diff::DiffPlan;
use crate::error::Result;
use crate::fingerprint::FingerprintStore;

/// A failed side effect on a single entity.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct DeployError {
    pub message: String,
}

impl DeployError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of materializing the source tree.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// Root of the local source tree.
    pub root: PathBuf,
    /// Whether content changed since the last sync.
    pub changed: bool,
}

/// Produces and updates the local materialization of the source tree.
pub trait SourceSync {
    fn sync(&mut self) -> Result<SyncOutcome>;
}

/// Resolves entity names against the host's identity namespace.
pub trait IdentityDirectory {
    /// Names of all currently-managed entities.
    fn managed(&self) -> Result<BTreeSet<String>>;

    /// Stable managed-file location for an entity's unit definition.
    fn unit_path(&self, name: &str) -> PathBuf;
}

/// Applies and removes named entities. Implementations own the actual
/// writes, service control, and identity lifecycle; the reconciler only
/// sequences the calls.
pub trait Deployer {
    /// Provision the execution identity for a new entity.
    fn provision_identity(&mut self, name: &str) -> std::result::Result<(), DeployError>;

    /// Write `rendered` to the entity's managed location and reload and
    /// restart its service unit.
    fn apply(&mut self, name: &str, rendered: &str) -> std::result::Result<(), DeployError>;

    /// Tear the entity down: stop the service, remove the managed file,
    /// destroy the identity. Best-effort; every sub-step failure is
    /// returned, and later sub-steps still run.
    fn teardown(&mut self, name: &str) -> Vec<DeployError>;
}

/// Where in the per-entity sequence a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Provision,
    Apply,
    Teardown,
}

/// One isolated per-entity failure, reported without aborting the cycle.
#[derive(Debug, Clone)]
pub struct EntityFailure {
    pub name: String,
    pub stage: FailureStage,
    pub message: String,
}

/// Outcome of one reconciliation cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub removed: Vec<String>,
    pub failures: Vec<EntityFailure>,
}

impl CycleReport {
    /// True when every per-entity action succeeded.
    pub fn clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, name: &str, stage: FailureStage, message: impl Into<String>) {
        let message = message.into();
        warn!(entity = %name, ?stage, %message, "entity action failed");
        self.failures.push(EntityFailure {
            name: name.to_string(),
            stage,
            message,
        });
    }
}

/// Sequences one cycle's actions against a [`Deployer`].
pub struct Reconciler<'a, D: Deployer> {
    store: &'a FingerprintStore,
    deployer: &'a mut D,
}

impl<'a, D: Deployer> Reconciler<'a, D> {
    pub fn new(store: &'a FingerprintStore, deployer: &'a mut D) -> Self {
        Self { store, deployer }
    }

    /// Run one full cycle over `desired` and `managed`.
    ///
    /// Only structural problems return `Err`; per-entity failures land in
    /// the report. The fingerprint for an entity advances only after its
    /// apply fully succeeded, so a failed entity retries next cycle.
    pub fn run(&mut self, desired: &DesiredState, managed: &BTreeSet<String>) -> CycleReport {
        let plan = DiffPlan::compute(desired, managed);
        let mut report = CycleReport::default();

        for name in &plan.to_create {
            info!(entity = %name, "creating");
            if let Err(e) = self.deployer.provision_identity(name) {
                report.fail(name, FailureStage::Provision, e.message);
                continue;
            }
            self.apply_entity(name, &desired[name], &mut report, true);
        }

        for name in &plan.to_evaluate {
            let rendered = &desired[name];
            if !self.store.changed(name, rendered) {
                debug!(entity = %name, "unchanged, skipping");
                report.unchanged.push(name.clone());
                continue;
            }
            info!(entity = %name, "changed, deploying");
            self.apply_entity(name, rendered, &mut report, false);
        }

        for name in &plan.to_remove {
            info!(entity = %name, "removing");
            for e in self.deployer.teardown(name) {
                report.fail(name, FailureStage::Teardown, e.message);
            }
            // The record goes away even after a partial teardown, so a
            // half-removed entity cannot be mistaken for an applied one.
            if let Err(e) = self.store.clear(name) {
                report.fail(name, FailureStage::Teardown, e.to_string());
            }
            report.removed.push(name.clone());
        }

        report
    }

    fn apply_entity(&mut self, name: &str, rendered: &str, report: &mut CycleReport, fresh: bool) {
        if let Err(e) = self.deployer.apply(name, rendered) {
            report.fail(name, FailureStage::Apply, e.message);
            return;
        }
        if let Err(e) = self.store.record(name, rendered) {
            report.fail(name, FailureStage::Apply, e.to_string());
            return;
        }
        if fresh {
            report.created.push(name.to_string());
        } else {
            report.updated.push(name.to_string());
        }
    }
}
