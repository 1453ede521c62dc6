//! End-to-end reconciliation cycles over real directories
//!
//! Drives the full pipeline — git sync, transform loading, desired-state
//! building, diffing, fingerprint gating — with a recording deployer in
//! place of the host collaborators.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

use fleet_core::{
    DeployError, Deployer, FingerprintStore, Reconciler, SourceSync, build_desired,
    load_transforms,
};
use fleet_system::GitSource;

/// Deployer that tracks applied content in memory and never fails.
#[derive(Default)]
struct FakeHost {
    identities: BTreeSet<String>,
    applied: std::collections::BTreeMap<String, String>,
    log: Vec<String>,
}

impl Deployer for FakeHost {
    fn provision_identity(&mut self, name: &str) -> Result<(), DeployError> {
        self.identities.insert(name.to_string());
        self.log.push(format!("provision {name}"));
        Ok(())
    }

    fn apply(&mut self, name: &str, rendered: &str) -> Result<(), DeployError> {
        self.applied.insert(name.to_string(), rendered.to_string());
        self.log.push(format!("apply {name}"));
        Ok(())
    }

    fn teardown(&mut self, name: &str) -> Vec<DeployError> {
        self.identities.remove(name);
        self.applied.remove(name);
        self.log.push(format!("teardown {name}"));
        Vec::new()
    }
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn full_cycle_from_tree_to_deployed_set() {
    let root = tempfile::tempdir().unwrap();
    let state = tempfile::tempdir().unwrap();

    // One raw root-level entity, one grouped entity, one orphan group.
    write(
        &root.path().join("edge.container"),
        "[Container]\nImage=edge:1\n",
    );
    write(
        &root.path().join("tailnet/web.container"),
        "[Container]\nImage=nginx:latest\n\n[Service]\nEnvironment=FOO=bar\n",
    );
    write(
        &root.path().join("orphan/lost.container"),
        "[Container]\nImage=never\n",
    );

    let transform_dir = state.path().join("transforms");
    write(
        &transform_dir.join("tailnet.container"),
        "[Container]\nNetwork=slirp4netns\n\n[Service]\n+ExecStartPre=prep\nRestart=on-failure\n",
    );

    let transforms = load_transforms(&transform_dir).unwrap();
    let desired = build_desired(root.path(), &transforms).unwrap();

    // Orphan group contributed nothing.
    assert_eq!(desired.keys().collect::<Vec<_>>(), vec!["edge", "web"]);

    let store = FingerprintStore::open(&state.path().join("fingerprints")).unwrap();
    let mut host = FakeHost::default();
    let report = Reconciler::new(&store, &mut host).run(&desired, &BTreeSet::new());

    assert_eq!(report.created, vec!["edge", "web"]);
    assert!(report.clean());
    assert_eq!(host.applied["edge"], "[Container]\nImage=edge:1\n");
    // The spec's trailing blank line stays put; the transform default for
    // [Container] lands after it, then the merged [Service].
    assert_eq!(
        host.applied["web"],
        "[Container]\nImage=nginx:latest\n\nNetwork=slirp4netns\n[Service]\nExecStartPre=prep\nEnvironment=FOO=bar\nRestart=on-failure\n"
    );
}

#[test]
fn repeated_cycles_are_idempotent_until_the_tree_changes() {
    let root = tempfile::tempdir().unwrap();
    let state = tempfile::tempdir().unwrap();
    write(
        &root.path().join("edge.container"),
        "[Container]\nImage=edge:1\n",
    );

    let store = FingerprintStore::open(&state.path().join("fingerprints")).unwrap();
    let mut host = FakeHost::default();
    let transforms = load_transforms(&state.path().join("transforms")).unwrap();

    // Cycle 1: create.
    let desired = build_desired(root.path(), &transforms).unwrap();
    Reconciler::new(&store, &mut host).run(&desired, &BTreeSet::new());
    assert_eq!(host.log, vec!["provision edge", "apply edge"]);

    // Cycle 2: same tree, entity now managed. Nothing happens.
    host.log.clear();
    let managed = host.identities.clone();
    let desired = build_desired(root.path(), &transforms).unwrap();
    let report = Reconciler::new(&store, &mut host).run(&desired, &managed);
    assert!(host.log.is_empty());
    assert_eq!(report.unchanged, vec!["edge"]);

    // Cycle 3: content changed upstream. One apply, no re-provision.
    write(
        &root.path().join("edge.container"),
        "[Container]\nImage=edge:2\n",
    );
    let managed = host.identities.clone();
    let desired = build_desired(root.path(), &transforms).unwrap();
    let report = Reconciler::new(&store, &mut host).run(&desired, &managed);
    assert_eq!(host.log, vec!["apply edge"]);
    assert_eq!(report.updated, vec!["edge"]);

    // Cycle 4: entity deleted from the tree. Torn down, fingerprint gone.
    host.log.clear();
    fs::remove_file(root.path().join("edge.container")).unwrap();
    let managed = host.identities.clone();
    let desired = build_desired(root.path(), &transforms).unwrap();
    let report = Reconciler::new(&store, &mut host).run(&desired, &managed);
    assert_eq!(host.log, vec!["teardown edge"]);
    assert_eq!(report.removed, vec!["edge"]);
    assert!(store.persisted("edge").is_none());
}

#[test]
fn git_backed_tree_flows_into_the_cycle() {
    use git2::{Repository, RepositoryInitOptions, Signature};

    let upstream_dir = tempfile::tempdir().unwrap();
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    let upstream = Repository::init_opts(upstream_dir.path(), &opts).unwrap();

    let commit = |name: &str, content: &str, message: &str| {
        fs::write(upstream_dir.path().join(name), content).unwrap();
        let mut index = upstream.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = upstream.find_tree(tree_id).unwrap();
        let sig = Signature::now("fleet-test", "fleet-test@example.com").unwrap();
        let parent = upstream.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        upstream
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    };
    commit("edge.container", "[Container]\nImage=edge:1\n", "init");

    let state = tempfile::tempdir().unwrap();
    let mut source = GitSource::new(
        upstream_dir.path().to_str().unwrap(),
        "main",
        state.path().join("repo"),
    );

    let outcome = source.sync().unwrap();
    assert!(outcome.changed);

    let transforms = load_transforms(&state.path().join("transforms")).unwrap();
    let desired = build_desired(&outcome.root, &transforms).unwrap();
    assert_eq!(desired["edge"], "[Container]\nImage=edge:1\n");

    let store = FingerprintStore::open(&state.path().join("fingerprints")).unwrap();
    let mut host = FakeHost::default();
    let report = Reconciler::new(&store, &mut host).run(&desired, &BTreeSet::new());
    assert_eq!(report.created, vec!["edge"]);

    // Upstream moves; the next cycle sees exactly one update.
    commit("edge.container", "[Container]\nImage=edge:2\n", "bump");
    let outcome = source.sync().unwrap();
    assert!(outcome.changed);

    let desired = build_desired(&outcome.root, &transforms).unwrap();
    let managed = host.identities.clone();
    let report = Reconciler::new(&store, &mut host).run(&desired, &managed);
    assert_eq!(report.updated, vec!["edge"]);
    assert_eq!(host.applied["edge"], "[Container]\nImage=edge:2\n");
}
