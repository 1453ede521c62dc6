//! Runtime configuration
//!
//! Loaded from an explicit TOML path threaded through every call that needs
//! it; there is no process-wide configuration singleton.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Deployer configuration, read from a TOML file.
///
/// ```toml
/// [source]
/// url = "https://git.example.com/fleet.git"
/// branch = "main"
///
/// [paths]
/// transform_dir = "/etc/quadlet-fleet/transforms"
/// state_dir = "/var/lib/quadlet-fleet"
///
/// [identity]
/// group = "fleet"
/// ```
///
/// Only `source.url` is required; everything else has a default.
#[derive(Debug, Clone, Deserialize)]
pub struct FleetConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Where the tenant source tree comes from.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Git URL of the fleet repository.
    pub url: String,
    /// Branch to track.
    #[serde(default = "default_branch")]
    pub branch: String,
}

/// On-host directory layout.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Directory holding one transform file per group.
    #[serde(default = "default_transform_dir")]
    pub transform_dir: PathBuf,
    /// State directory for the repo checkout and fingerprint records.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

/// Execution-identity settings.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// OS group whose members are the managed entities.
    #[serde(default = "default_group")]
    pub group: String,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_transform_dir() -> PathBuf {
    PathBuf::from("/etc/quadlet-fleet/transforms")
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("/var/lib/quadlet-fleet")
}

fn default_group() -> String {
    "fleet".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            transform_dir: default_transform_dir(),
            state_dir: default_state_dir(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            group: default_group(),
        }
    }
}

impl FleetConfig {
    /// Load and validate configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] when the file is absent,
    /// [`Error::Config`] when it is unparseable or `source.url` is empty.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ConfigNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                Error::SourceRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let config: FleetConfig = toml::from_str(&text).map_err(|e| Error::Config {
            message: format!("{}: {}", path.display(), e),
        })?;

        if config.source.url.trim().is_empty() {
            return Err(Error::Config {
                message: format!("{}: source.url must not be empty", path.display()),
            });
        }

        Ok(config)
    }

    /// Local checkout of the fleet repository.
    pub fn repo_dir(&self) -> PathBuf {
        self.paths.state_dir.join("repo")
    }

    /// Directory of persisted per-entity fingerprint records.
    pub fn fingerprint_dir(&self) -> PathBuf {
        self.paths.state_dir.join("fingerprints")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[source]\nurl = \"https://example.com/fleet.git\"\n");

        let config = FleetConfig::load(&path).unwrap();
        assert_eq!(config.source.branch, "main");
        assert_eq!(
            config.paths.transform_dir,
            PathBuf::from("/etc/quadlet-fleet/transforms")
        );
        assert_eq!(config.identity.group, "fleet");
        assert_eq!(
            config.fingerprint_dir(),
            PathBuf::from("/var/lib/quadlet-fleet/fingerprints")
        );
    }

    #[test]
    fn explicit_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "[source]\nurl = \"git@host:fleet.git\"\nbranch = \"prod\"\n\n[paths]\nstate_dir = \"/srv/fleet\"\ntransform_dir = \"/srv/fleet/transforms\"\n\n[identity]\ngroup = \"tenants\"\n",
        );

        let config = FleetConfig::load(&path).unwrap();
        assert_eq!(config.source.branch, "prod");
        assert_eq!(config.repo_dir(), PathBuf::from("/srv/fleet/repo"));
        assert_eq!(config.identity.group, "tenants");
    }

    #[test]
    fn missing_file_is_config_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = FleetConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn missing_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[source]\nbranch = \"main\"\n");
        let err = FleetConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn empty_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[source]\nurl = \"\"\n");
        let err = FleetConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
