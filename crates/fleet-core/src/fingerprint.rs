//! Persisted content fingerprints
//!
//! One record per managed entity, holding the lowercase-hex SHA-256 of the
//! last successfully applied rendered text. The store is the sole gate for
//! whether an entity's apply action runs: matching fingerprints make a cycle
//! a per-entity no-op.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Compute the lowercase-hex SHA-256 digest of rendered text.
pub fn digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Directory-backed fingerprint store, one file per entity name.
#[derive(Debug, Clone)]
pub struct FingerprintStore {
    dir: PathBuf,
}

impl FingerprintStore {
    /// Open (and create, if needed) a store rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// The persisted digest for `name`, if a record exists.
    pub fn persisted(&self, name: &str) -> Option<String> {
        let text = fs::read_to_string(self.record_path(name)).ok()?;
        Some(text.trim().to_string())
    }

    /// Whether `content` differs from the last successfully applied text.
    ///
    /// An absent record is always "changed".
    pub fn changed(&self, name: &str, content: &str) -> bool {
        match self.persisted(name) {
            Some(stored) => stored != digest(content),
            None => true,
        }
    }

    /// Record `content` as applied for `name`.
    ///
    /// Written atomically (temp file, advisory lock, rename) so an
    /// interrupted cycle never leaves a torn record behind.
    pub fn record(&self, name: &str, content: &str) -> Result<()> {
        let path = self.record_path(name);
        let temp_path = path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()));

        let mut temp = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        temp.lock_exclusive()?;
        temp.write_all(digest(content).as_bytes())?;
        temp.sync_all()?;
        fs2::FileExt::unlock(&temp)?;

        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    /// Delete the record for `name`. A missing record is not an error.
    pub fn clear(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.record_path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
