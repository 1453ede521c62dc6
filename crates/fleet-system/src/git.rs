//! Git materialization of the tenant source tree

use std::path::PathBuf;

use git2::build::RepoBuilder;
use git2::{Repository, ResetType};
use tracing::info;

use fleet_core::{SourceSync, SyncOutcome};

use crate::error::Result;

/// Keeps a local checkout of the fleet repository in step with one branch
/// of its origin. Clone on first use; fetch-compare-reset afterwards.
pub struct GitSource {
    url: String,
    branch: String,
    dest: PathBuf,
}

impl GitSource {
    pub fn new(url: impl Into<String>, branch: impl Into<String>, dest: PathBuf) -> Self {
        Self {
            url: url.into(),
            branch: branch.into(),
            dest,
        }
    }

    fn clone_fresh(&self) -> Result<()> {
        info!(url = %self.url, branch = %self.branch, "cloning fleet repository");
        RepoBuilder::new()
            .branch(&self.branch)
            .clone(&self.url, &self.dest)?;
        Ok(())
    }

    /// Fetch the tracked branch and hard-reset onto it when it moved.
    /// Returns whether content changed.
    fn update(&self) -> Result<bool> {
        let repo = Repository::open(&self.dest)?;
        repo.find_remote("origin")?
            .fetch(&[self.branch.as_str()], None, None)?;

        let head = repo.refname_to_id("HEAD")?;
        let fetched = repo.refname_to_id("FETCH_HEAD")?;
        if head == fetched {
            return Ok(false);
        }

        info!(
            from = %head,
            to = %fetched,
            "changes detected, resetting checkout"
        );
        let target = repo.find_object(fetched, None)?;
        repo.reset(&target, ResetType::Hard, None)?;
        Ok(true)
    }
}

impl SourceSync for GitSource {
    fn sync(&mut self) -> fleet_core::Result<SyncOutcome> {
        let fresh = !self.dest.join(".git").exists();
        let changed = if fresh {
            self.clone_fresh().map(|()| true)
        } else {
            self.update()
        }
        .map_err(|e| fleet_core::Error::Sync {
            message: e.to_string(),
        })?;

        Ok(SyncOutcome {
            root: self.dest.clone(),
            changed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{RepositoryInitOptions, Signature};
    use std::fs;
    use std::path::Path;

    fn init_upstream(dir: &Path) -> Repository {
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        Repository::init_opts(dir, &opts).unwrap()
    }

    fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) {
        let workdir = repo.workdir().unwrap();
        fs::write(workdir.join(name), content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let sig = Signature::now("fleet-test", "fleet-test@example.com").unwrap();
        let parent = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    }

    #[test]
    fn first_sync_clones_and_reports_changed() {
        let upstream_dir = tempfile::tempdir().unwrap();
        let upstream = init_upstream(upstream_dir.path());
        commit_file(&upstream, "web.container", "[Container]\nImage=a\n", "init");

        let checkout = tempfile::tempdir().unwrap();
        let dest = checkout.path().join("repo");
        let mut source = GitSource::new(
            upstream_dir.path().to_str().unwrap(),
            "main",
            dest.clone(),
        );

        let outcome = source.sync().unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.root, dest);
        assert!(dest.join("web.container").exists());
    }

    #[test]
    fn second_sync_without_upstream_changes_is_unchanged() {
        let upstream_dir = tempfile::tempdir().unwrap();
        let upstream = init_upstream(upstream_dir.path());
        commit_file(&upstream, "web.container", "[Container]\nImage=a\n", "init");

        let checkout = tempfile::tempdir().unwrap();
        let dest = checkout.path().join("repo");
        let mut source = GitSource::new(
            upstream_dir.path().to_str().unwrap(),
            "main",
            dest,
        );

        assert!(source.sync().unwrap().changed);
        assert!(!source.sync().unwrap().changed);
    }

    #[test]
    fn upstream_commit_is_pulled_in_on_next_sync() {
        let upstream_dir = tempfile::tempdir().unwrap();
        let upstream = init_upstream(upstream_dir.path());
        commit_file(&upstream, "web.container", "[Container]\nImage=a\n", "init");

        let checkout = tempfile::tempdir().unwrap();
        let dest = checkout.path().join("repo");
        let mut source = GitSource::new(
            upstream_dir.path().to_str().unwrap(),
            "main",
            dest.clone(),
        );
        source.sync().unwrap();

        commit_file(&upstream, "web.container", "[Container]\nImage=b\n", "bump");

        let outcome = source.sync().unwrap();
        assert!(outcome.changed);
        let content = fs::read_to_string(dest.join("web.container")).unwrap();
        assert_eq!(content, "[Container]\nImage=b\n");
    }
}
