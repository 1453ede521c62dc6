//! The host deployer
//!
//! Implements [`fleet_core::Deployer`] against a real host: unit files land
//! in the entity's per-user quadlet directory, services run inside the
//! entity's own systemd instance, identities are OS users.

use std::fs::{self, OpenOptions};
use std::io::Write;

use fs2::FileExt;
use tracing::debug;

use fleet_core::{DeployError, Deployer, IdentityDirectory};

use crate::error::Result;
use crate::identity::{UserDirectory, quadlet_dir, user_home};
use crate::process::run;
use crate::systemd;

/// Deploys entities onto the local host.
pub struct HostDeployer {
    users: UserDirectory,
}

impl HostDeployer {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            users: UserDirectory::new(group),
        }
    }

    /// The identity directory backing this deployer, for managed-set
    /// enumeration at cycle start.
    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    /// Write the unit file into the user's quadlet directory, atomically,
    /// and hand ownership of the `.config` tree to the user. Podman refuses
    /// to run when a parent directory is not owned by the container user.
    fn write_unit(&self, name: &str, rendered: &str) -> Result<()> {
        let dir = quadlet_dir(name);
        fs::create_dir_all(&dir)?;
        run(
            "chown",
            &[
                "-R",
                &format!("{name}:{name}"),
                &user_home(name).join(".config").to_string_lossy(),
            ],
        )?;

        let path = self.users.unit_path(name);
        let temp_path = path.with_file_name(format!(".{name}.{}.tmp", std::process::id()));
        let mut temp = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        temp.lock_exclusive()?;
        temp.write_all(rendered.as_bytes())?;
        temp.sync_all()?;
        fs2::FileExt::unlock(&temp)?;
        fs::rename(&temp_path, &path)?;

        run("chown", &[
            &format!("{name}:{name}"),
            &path.to_string_lossy(),
        ])?;
        Ok(())
    }

    fn remove_unit(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.users.unit_path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Deployer for HostDeployer {
    fn provision_identity(&mut self, name: &str) -> std::result::Result<(), DeployError> {
        self.users
            .create_user(name)
            .map_err(|e| DeployError::new(e.to_string()))
    }

    fn apply(&mut self, name: &str, rendered: &str) -> std::result::Result<(), DeployError> {
        let into_deploy = |e: crate::error::Error| DeployError::new(e.to_string());

        self.write_unit(name, rendered).map_err(into_deploy)?;
        systemd::wait_ready(name).map_err(into_deploy)?;
        systemd::daemon_reload(name).map_err(into_deploy)?;
        systemd::restart(name, name).map_err(into_deploy)?;
        debug!(entity = %name, "unit applied and restarted");
        Ok(())
    }

    fn teardown(&mut self, name: &str) -> Vec<DeployError> {
        let mut failures = Vec::new();

        if let Err(e) = systemd::stop(name, name) {
            failures.push(DeployError::new(format!("stopping service: {e}")));
        }
        if let Err(e) = self.remove_unit(name) {
            failures.push(DeployError::new(format!("removing unit file: {e}")));
        }
        if let Err(e) = self.users.delete_user(name) {
            failures.push(DeployError::new(format!("deleting user: {e}")));
        }

        failures
    }
}
