//! Per-user systemd control
//!
//! All unit operations run inside the entity's own systemd instance via
//! `systemctl --user -M <name>@`.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::process::{run, run_unchecked};

const READY_ATTEMPTS: u32 = 30;
const READY_POLL: Duration = Duration::from_secs(1);

fn machine(name: &str) -> String {
    format!("{name}@")
}

/// Wait until the user's systemd instance answers `is-system-running`.
///
/// `degraded` counts as ready: the manager is up even if some unit failed.
pub fn wait_ready(name: &str) -> Result<()> {
    for _ in 0..READY_ATTEMPTS {
        // Non-zero exit here just means "not running yet" (or degraded),
        // so only the printed state matters.
        if let Ok(result) = run_unchecked(
            "systemctl",
            &["--user", "-M", &machine(name), "is-system-running"],
        ) {
            let state = result.output.trim();
            if state == "running" || state == "degraded" {
                return Ok(());
            }
        }
        std::thread::sleep(READY_POLL);
    }
    Err(Error::ManagerTimeout {
        name: name.to_string(),
    })
}

/// Reload unit definitions inside the user's manager.
pub fn daemon_reload(name: &str) -> Result<()> {
    run(
        "systemctl",
        &["--user", "-M", &machine(name), "daemon-reload"],
    )?;
    Ok(())
}

/// Restart the entity's generated service.
pub fn restart(name: &str, service: &str) -> Result<()> {
    run(
        "systemctl",
        &[
            "--user",
            "-M",
            &machine(name),
            "restart",
            &format!("{service}.service"),
        ],
    )?;
    Ok(())
}

/// Stop the entity's generated service.
pub fn stop(name: &str, service: &str) -> Result<()> {
    run(
        "systemctl",
        &[
            "--user",
            "-M",
            &machine(name),
            "stop",
            &format!("{service}.service"),
        ],
    )?;
    Ok(())
}
