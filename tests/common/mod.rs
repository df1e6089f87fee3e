//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files. Repositories are built through `git2`
//! directly, so the fixtures work without a system git binary.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::MetaFixture;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = MetaFixture::new();
//!     let pin = fixture.add_submodule("lib");
//!     // ... test code
//! }
//! ```

#![allow(dead_code)]

use git2::{Oid, Repository, Signature};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use sub_repo::backend::{CommitId, GitRepo};

/// Initialize a repository at `path` with a test user configured.
pub fn init_repo(path: &Path) -> Repository {
    std::fs::create_dir_all(path).unwrap();
    let repo = Repository::init(path).unwrap();
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();
    repo
}

fn signature() -> Signature<'static> {
    Signature::now("Test User", "test@example.com").unwrap()
}

/// Write `content` to `path`, stage it, and commit.
pub fn commit_file(repo: &Repository, path: &str, content: &str, message: &str) -> Oid {
    let full_path = repo.workdir().unwrap().join(path);
    if let Some(parent) = full_path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&full_path, content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(path)).unwrap();
    index.write().unwrap();
    commit_index(repo, message)
}

/// Commit whatever is currently staged in the index.
pub fn commit_index(repo: &Repository, message: &str) -> Oid {
    let sig = signature();
    let mut index = repo.index().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<_> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

/// Stage `path` with `content` without committing.
pub fn stage_file(repo: &Repository, path: &str, content: &str) {
    std::fs::write(repo.workdir().unwrap().join(path), content).unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new(path)).unwrap();
    index.write().unwrap();
}

/// Overwrite a tracked file without staging it.
pub fn modify_file(repo: &Repository, path: &str, content: &str) {
    std::fs::write(repo.workdir().unwrap().join(path), content).unwrap();
}

/// Create a commit unrelated to the current history and detach HEAD onto
/// it. The previous head is no longer an ancestor of the new one.
pub fn diverge(repo: &Repository) -> Oid {
    std::fs::write(repo.workdir().unwrap().join("unrelated.txt"), "u").unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new("unrelated.txt")).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = signature();
    let oid = repo
        .commit(None, &sig, &sig, "unrelated history", &tree, &[])
        .unwrap();
    repo.set_head_detached(oid).unwrap();
    oid
}

/// A meta-repository fixture with helpers to grow submodules under it.
///
/// Layout inside the temp directory: the meta-repository at `meta/`, one
/// upstream repository per submodule at `upstream-<name>/`.
pub struct MetaFixture {
    temp: TempDir,
    meta_path: PathBuf,
}

impl MetaFixture {
    /// A meta-repository with one initial commit.
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let meta_path = temp.path().join("meta");
        let repo = init_repo(&meta_path);
        commit_file(&repo, "README.md", "# meta\n", "initial");
        Self { temp, meta_path }
    }

    /// A meta-repository with no commits at all.
    pub fn without_commits() -> Self {
        let temp = TempDir::new().unwrap();
        let meta_path = temp.path().join("meta");
        init_repo(&meta_path);
        Self { temp, meta_path }
    }

    pub fn meta_path(&self) -> &Path {
        &self.meta_path
    }

    /// Open the meta-repository through git2.
    pub fn meta(&self) -> Repository {
        Repository::open(&self.meta_path).unwrap()
    }

    /// Open the meta-repository through the backend under test.
    pub fn backend(&self) -> GitRepo {
        GitRepo::open(&self.meta_path).unwrap()
    }

    /// Create an upstream repository with two commits and embed it as a
    /// submodule named `name`. Returns the pinned commit.
    pub fn add_submodule(&self, name: &str) -> CommitId {
        let upstream_path = self.temp.path().join(format!("upstream-{name}"));
        let upstream = init_repo(&upstream_path);
        commit_file(&upstream, "lib.rs", "pub fn lib() {}\n", "initial");
        commit_file(&upstream, "lib.rs", "pub fn lib() { /* v2 */ }\n", "second");

        let meta = self.meta();
        let url = upstream_path.to_str().unwrap().to_string();
        let mut sm = meta.submodule(&url, Path::new(name), true).unwrap();
        sm.clone(None).unwrap();
        sm.add_finalize().unwrap();
        commit_index(&meta, &format!("add submodule {name}"));

        let sub = self.submodule_repo(name);
        let pin = sub.head().unwrap().peel_to_commit().unwrap().id();
        CommitId::from(pin)
    }

    /// Open the checkout of submodule `name` inside the meta working tree.
    pub fn submodule_repo(&self, name: &str) -> Repository {
        Repository::open(self.meta_path.join(name)).unwrap()
    }

    /// Remove the submodule's working directory, leaving it recorded but
    /// not populated.
    pub fn depopulate_submodule(&self, name: &str) {
        std::fs::remove_dir_all(self.meta_path.join(name)).unwrap();
    }
}

impl Default for MetaFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Delete `path` from the working tree and stage the removal.
pub fn stage_removal(repo: &Repository, path: &str) {
    std::fs::remove_file(repo.workdir().unwrap().join(path)).unwrap();
    let mut index = repo.index().unwrap();
    index.remove_path(Path::new(path)).unwrap();
    index.write().unwrap();
}
