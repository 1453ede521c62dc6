//! Standalone validation pass over a tenant tree
//!
//! Checks every unit file against the fleet's naming and content
//! conventions. Findings are aggregated across the whole tree; the pass
//! never stops at the first problem.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use fleet_unit::{Entry, UnitDocument};

use crate::desired::unit_stem;
use crate::error::{Error, Result};

/// Entity names double as OS login names, so stems must look like one.
const MAX_NAME_LEN: usize = 32;

fn name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[a-z][a-z0-9-]*$").expect("valid name pattern"))
}

/// One convention violation found during the validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub path: PathBuf,
    pub message: String,
}

impl Finding {
    fn new(path: &Path, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Validate every unit file under `dir`, recursing into subdirectories.
///
/// # Errors
///
/// Returns an error only when a directory cannot be listed; unreadable
/// individual files become findings so the rest of the tree still checks.
pub fn check_tree(dir: &Path) -> Result<Vec<Finding>> {
    let mut findings = Vec::new();
    walk(dir, &mut findings)?;
    Ok(findings)
}

fn walk(dir: &Path, findings: &mut Vec<Finding>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::SourceRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| Error::SourceRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, findings)?;
        } else if let Some(stem) = unit_stem(&path) {
            check_file(&path, &stem, findings);
        }
    }
    Ok(())
}

fn check_file(path: &Path, stem: &str, findings: &mut Vec<Finding>) {
    if stem.len() > MAX_NAME_LEN {
        findings.push(Finding::new(
            path,
            format!("filename stem exceeds {MAX_NAME_LEN} characters"),
        ));
    }
    if !name_pattern().is_match(stem) {
        findings.push(Finding::new(
            path,
            format!("filename stem {stem:?} is not a valid login name ([a-z][a-z0-9-]*)"),
        ));
    }

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            findings.push(Finding::new(path, format!("unreadable: {e}")));
            return;
        }
    };

    let doc = UnitDocument::parse(&text);
    match doc.section("Container") {
        None => findings.push(Finding::new(path, "missing [Container] section")),
        Some(container) => {
            if !container.has_key("Image") {
                findings.push(Finding::new(path, "missing Image= in [Container]"));
            }
            for entry in &container.entries {
                if let Entry::Pair { key, value } = entry {
                    if key == "ContainerName" && value != stem {
                        findings.push(Finding::new(
                            path,
                            format!("ContainerName={value} does not match filename stem {stem}"),
                        ));
                    }
                }
            }
        }
    }
}
