//! Desired-state construction
//!
//! Scans the synchronized source tree, applies group transforms, and
//! produces the full entity-name → rendered-text mapping. The mapping is
//! rebuilt from scratch every cycle; nothing here mutates incrementally.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::warn;

use fleet_unit::{UnitDocument, merge};

use crate::error::{Error, Result};

/// Extension of deployable unit files, in tenant tree and transform
/// directory alike.
pub const UNIT_EXTENSION: &str = "container";

/// Entity name → final rendered text, in stable name order.
pub type DesiredState = BTreeMap<String, String>;

/// Load the transform registry: one parsed document per `*.container` file
/// directly inside `dir`, keyed by filename stem (the group name).
///
/// A missing directory yields an empty registry; any other listing or read
/// failure aborts the cycle.
pub fn load_transforms(dir: &Path) -> Result<BTreeMap<String, UnitDocument>> {
    let mut transforms = BTreeMap::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(transforms),
        Err(e) => {
            return Err(Error::TransformDir {
                path: dir.to_path_buf(),
                source: e,
            });
        }
    };

    for entry in entries {
        let entry = entry.map_err(|e| Error::TransformDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        let Some(group) = unit_stem(&path) else {
            continue;
        };

        let text = read_source(&path)?;
        transforms.insert(group, UnitDocument::parse(&text));
    }

    Ok(transforms)
}

/// Build the desired state from the source tree at `root`.
///
/// Files directly under `root` deploy with no transform: their rendered text
/// is their raw content. Each non-hidden first-level subdirectory is a
/// group; its unit files are parsed and merged against the registered
/// transform of the same name. A group with no registered transform
/// contributes nothing and is diagnosed with a warning.
pub fn build_desired(
    root: &Path,
    transforms: &BTreeMap<String, UnitDocument>,
) -> Result<DesiredState> {
    let mut desired = DesiredState::new();

    for (name, path) in unit_files(root)? {
        desired.insert(name, read_source(&path)?);
    }

    let entries = std::fs::read_dir(root).map_err(|e| Error::SourceRead {
        path: root.to_path_buf(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::SourceRead {
            path: root.to_path_buf(),
            source: e,
        })?;
        let dir = entry.path();
        let Some(group) = dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !dir.is_dir() || group.starts_with('.') {
            continue;
        }

        let Some(transform) = transforms.get(group) else {
            warn!(group, "no transform registered for group, skipping");
            continue;
        };

        for (name, path) in unit_files(&dir)? {
            let spec = UnitDocument::parse(&read_source(&path)?);
            desired.insert(name, merge(&spec, transform).render());
        }
    }

    Ok(desired)
}

/// All unit files directly inside `dir`, as (stem, path), sorted by stem.
fn unit_files(dir: &Path) -> Result<Vec<(String, std::path::PathBuf)>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::SourceRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::SourceRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(stem) = unit_stem(&path) {
            files.push((stem, path));
        }
    }
    files.sort();
    Ok(files)
}

/// Filename stem of a unit file, or `None` for any other path.
pub fn unit_stem(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(UNIT_EXTENSION) {
        return None;
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::SourceRead {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn root_files_deploy_raw() {
        let root = tree();
        let raw = "[Container]\nImage=nginx:latest\n";
        fs::write(root.path().join("edge.container"), raw).unwrap();
        fs::write(root.path().join("README.md"), "not a unit").unwrap();

        let desired = build_desired(root.path(), &BTreeMap::new()).unwrap();
        assert_eq!(desired.len(), 1);
        assert_eq!(desired["edge"], raw);
    }

    #[test]
    fn group_files_are_merged_with_their_transform() {
        let root = tree();
        let grp = root.path().join("tailnet");
        fs::create_dir(&grp).unwrap();
        fs::write(
            grp.join("web.container"),
            "[Container]\nImage=nginx:latest\n",
        )
        .unwrap();

        let mut transforms = BTreeMap::new();
        transforms.insert(
            "tailnet".to_string(),
            UnitDocument::parse("[Container]\nNetwork=slirp4netns\n"),
        );

        let desired = build_desired(root.path(), &transforms).unwrap();
        assert_eq!(
            desired["web"],
            "[Container]\nImage=nginx:latest\nNetwork=slirp4netns\n"
        );
    }

    #[test]
    fn group_without_transform_contributes_nothing() {
        let root = tree();
        let grp = root.path().join("orphan");
        fs::create_dir(&grp).unwrap();
        fs::write(grp.join("web.container"), "[Container]\nImage=a\n").unwrap();

        let desired = build_desired(root.path(), &BTreeMap::new()).unwrap();
        assert!(desired.is_empty());
    }

    #[test]
    fn hidden_directories_are_ignored() {
        let root = tree();
        let git = root.path().join(".git");
        fs::create_dir(&git).unwrap();
        fs::write(git.join("stash.container"), "[Container]\nImage=a\n").unwrap();

        let desired = build_desired(root.path(), &BTreeMap::new()).unwrap();
        assert!(desired.is_empty());
    }

    #[test]
    fn missing_transform_dir_is_empty_registry() {
        let root = tree();
        let transforms = load_transforms(&root.path().join("does-not-exist")).unwrap();
        assert!(transforms.is_empty());
    }

    #[test]
    fn transforms_keyed_by_stem() {
        let dir = tree();
        fs::write(
            dir.path().join("tailnet.container"),
            "[Service]\nRestart=on-failure\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let transforms = load_transforms(dir.path()).unwrap();
        assert_eq!(transforms.len(), 1);
        assert!(transforms["tailnet"].section("Service").is_some());
    }

    #[test]
    fn desired_is_rebuilt_not_accumulated() {
        let root = tree();
        fs::write(root.path().join("a.container"), "[Container]\nImage=a\n").unwrap();

        let first = build_desired(root.path(), &BTreeMap::new()).unwrap();
        fs::remove_file(root.path().join("a.container")).unwrap();
        fs::write(root.path().join("b.container"), "[Container]\nImage=b\n").unwrap();
        let second = build_desired(root.path(), &BTreeMap::new()).unwrap();

        assert!(first.contains_key("a"));
        assert!(!second.contains_key("a"));
        assert!(second.contains_key("b"));
    }
}
