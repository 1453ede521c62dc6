//! Execution-identity lifecycle
//!
//! One OS user per entity, collected under a single group so membership
//! doubles as the managed-entity registry. Regular (non-system) users are
//! created so useradd auto-allocates subuid/subgid ranges for rootless
//! Podman.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::warn;

use fleet_core::IdentityDirectory;

use crate::error::{Error, Result};
use crate::process::{run, run_unchecked};

/// getent exits with 2 when the key is not present in the database.
const GETENT_NOT_FOUND: i32 = 2;

/// Resolves and mutates the managed-user namespace for one group.
pub struct UserDirectory {
    group: String,
}

impl UserDirectory {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
        }
    }

    /// Create the user, place it in the managed group, and enable linger
    /// so its systemd instance outlives logins.
    pub fn create_user(&self, name: &str) -> Result<()> {
        run(
            "useradd",
            &["--create-home", "-s", "/sbin/nologin", "-G", &self.group, name],
        )?;
        run("loginctl", &["enable-linger", name])?;
        Ok(())
    }

    /// Remove the user and its home. Linger and slice teardown are
    /// best-effort; only the final userdel decides success.
    pub fn delete_user(&self, name: &str) -> Result<()> {
        if let Err(e) = run("loginctl", &["disable-linger", name]) {
            warn!(user = %name, error = %e, "disable-linger failed");
        }
        match run("id", &["-u", name]) {
            Ok(uid) => {
                let slice = format!("user-{}.slice", uid.trim());
                if let Err(e) = run("systemctl", &["stop", &slice]) {
                    warn!(user = %name, error = %e, "stopping user slice failed");
                }
            }
            Err(e) => warn!(user = %name, error = %e, "uid lookup failed"),
        }
        run("userdel", &["-r", name])?;
        Ok(())
    }

    fn members(&self) -> Result<BTreeSet<String>> {
        let result = run_unchecked("getent", &["group", &self.group])?;
        if result.status == Some(GETENT_NOT_FOUND) {
            // Group does not exist yet: nothing is managed.
            return Ok(BTreeSet::new());
        }
        if !result.success() {
            return Err(Error::Command {
                command: format!("getent group {}", self.group),
                message: format!("exit status {:?}: {}", result.status, result.output.trim()),
            });
        }
        Ok(parse_group_members(&result.output))
    }
}

/// Member names from one `getent group` line (`name:pw:gid:a,b,c`).
fn parse_group_members(line: &str) -> BTreeSet<String> {
    line.trim()
        .splitn(4, ':')
        .nth(3)
        .unwrap_or("")
        .split(',')
        .filter(|m| !m.is_empty())
        .map(|m| m.to_string())
        .collect()
}

/// Home of a managed user; identities are created with `--create-home`.
pub fn user_home(name: &str) -> PathBuf {
    PathBuf::from("/home").join(name)
}

/// Per-user quadlet directory watched by the user's systemd generator.
pub fn quadlet_dir(name: &str) -> PathBuf {
    user_home(name).join(".config/containers/systemd")
}

impl IdentityDirectory for UserDirectory {
    fn managed(&self) -> fleet_core::Result<BTreeSet<String>> {
        self.members().map_err(|e| fleet_core::Error::Identity {
            message: e.to_string(),
        })
    }

    fn unit_path(&self, name: &str) -> PathBuf {
        quadlet_dir(name).join(format!("{name}.container"))
    }
}
