//! # Version-Control Backend
//!
//! This module defines the read-only query surface the rest of the
//! application uses to inspect repositories, plus its production
//! implementation over `git2` (libgit2 bindings).
//!
//! ## Design
//!
//! All status collection, submodule resolution, and gating logic is written
//! against the `VcsRepo` trait rather than a concrete repository type. This
//! is achieved for the same reason the repository-management layer is
//! trait-based: the underlying implementation can be swapped out, which is
//! particularly useful for testing. In the application, `GitRepo` wraps a
//! real `git2::Repository`; in unit tests an in-memory fake stands in so
//! that resolver and gate logic can be exercised without touching disk.
//!
//! The trait is strictly read-only. The single mutating surface of the tool
//! (the submodule-inclusion workflow) lives in the `git` module and shells
//! out to the system git binary instead.

use std::path::{Path, PathBuf};

use git2::{ErrorCode, ObjectType, Oid, StatusOptions};
use log::warn;
use serde::Serialize;

use crate::error::{Error, Result};

/// Name of the file in which the meta-repository records its submodule
/// configuration. An implementation artifact, not user content; status
/// collection for the meta-repository filters it out.
pub const MODULES_FILE: &str = ".gitmodules";

/// Hex digest identifying a commit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form used in human-readable output.
    pub fn short(&self) -> &str {
        let end = self.0.len().min(7);
        &self.0[..end]
    }
}

impl From<Oid> for CommitId {
    fn from(oid: Oid) -> Self {
        Self(oid.to_string())
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One raw per-path change record as reported by the backend.
///
/// The flags describe what the backend observed for this path; the change
/// classifier in the `status` module turns them into a single semantic
/// change kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawChange {
    pub path: PathBuf,
    pub is_new: bool,
    pub is_deleted: bool,
    pub is_conflicted: bool,
    pub is_renamed: bool,
    pub is_typechange: bool,
    /// The path differs between head and index.
    pub in_index: bool,
    /// The path differs between index and working tree.
    pub in_worktree: bool,
}

/// Read-only queries against one repository handle.
///
/// `reopen` exists so that fan-out code can give every worker thread its own
/// independent handle; handles are never shared across threads.
pub trait VcsRepo: Sized + Send {
    /// All changed and untracked paths of the repository. Paths inside
    /// nested submodules are never reported.
    fn raw_changes(&self) -> Result<Vec<RawChange>>;

    /// The currently checked-out branch, or `None` for a detached head.
    fn current_branch(&self) -> Result<Option<String>>;

    /// The head commit. Fails with [`Error::NoCommits`] for a repository
    /// that has no commits yet.
    fn head_commit(&self) -> Result<CommitId>;

    /// Whether `ancestor` is reachable from `descendant` by following
    /// parent links.
    fn is_ancestor(&self, ancestor: &CommitId, descendant: &CommitId) -> Result<bool>;

    /// Names of all submodules recorded by this repository.
    fn submodule_names(&self) -> Result<Vec<String>>;

    /// Whether the submodule's working directory is populated.
    fn submodule_visible(&self, name: &str) -> Result<bool>;

    /// Open a handle onto the submodule's own repository.
    fn open_submodule(&self, name: &str) -> Result<Self>;

    /// The commit recorded for the submodule in this repository's tree at
    /// `at`, or `None` if the submodule is not recorded there (e.g. staged
    /// but not yet committed).
    fn pinned_commit(&self, name: &str, at: &CommitId) -> Result<Option<CommitId>>;

    /// An independent handle onto the same repository, suitable for use on
    /// another thread.
    fn reopen(&self) -> Result<Self>;
}

/// Production backend over a local git repository.
pub struct GitRepo {
    repo: git2::Repository,
    location: PathBuf,
}

impl GitRepo {
    /// Open the repository at exactly `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = git2::Repository::open(path)
            .map_err(|e| backend_err("open repository", &e))?;
        Ok(Self::from_repo(repo))
    }

    /// Open the repository containing `path`, walking up parent directories
    /// the way the git CLI does.
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = git2::Repository::discover(path)
            .map_err(|e| backend_err("discover repository", &e))?;
        Ok(Self::from_repo(repo))
    }

    fn from_repo(repo: git2::Repository) -> Self {
        let location = repo
            .workdir()
            .unwrap_or_else(|| repo.path())
            .to_path_buf();
        Self { repo, location }
    }

    /// Root of the working tree (or the git directory for a bare
    /// repository).
    pub fn location(&self) -> &Path {
        &self.location
    }

    fn find_submodule(&self, name: &str) -> Result<git2::Submodule<'_>> {
        self.repo.find_submodule(name).map_err(|e| Error::SubmoduleLookup {
            name: name.to_string(),
            message: e.message().to_string(),
        })
    }

    fn parse_oid(id: &CommitId) -> Result<Oid> {
        Oid::from_str(id.as_str()).map_err(|e| Error::Backend {
            op: format!("parse commit id '{}'", id),
            message: e.message().to_string(),
        })
    }
}

fn backend_err(op: &str, e: &git2::Error) -> Error {
    Error::Backend {
        op: op.to_string(),
        message: e.message().to_string(),
    }
}

impl VcsRepo for GitRepo {
    fn raw_changes(&self) -> Result<Vec<RawChange>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .exclude_submodules(true)
            .renames_head_to_index(true)
            .renames_index_to_workdir(true);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| backend_err("read status", &e))?;

        let mut changes = Vec::with_capacity(statuses.len());
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                warn!("skipping non-utf8 path in status of {}", self.location.display());
                continue;
            };
            let s = entry.status();
            changes.push(RawChange {
                path: PathBuf::from(path),
                is_new: s.intersects(git2::Status::INDEX_NEW | git2::Status::WT_NEW),
                is_deleted: s
                    .intersects(git2::Status::INDEX_DELETED | git2::Status::WT_DELETED),
                is_conflicted: s.is_conflicted(),
                is_renamed: s
                    .intersects(git2::Status::INDEX_RENAMED | git2::Status::WT_RENAMED),
                is_typechange: s.intersects(
                    git2::Status::INDEX_TYPECHANGE | git2::Status::WT_TYPECHANGE,
                ),
                in_index: s.intersects(
                    git2::Status::INDEX_NEW
                        | git2::Status::INDEX_MODIFIED
                        | git2::Status::INDEX_DELETED
                        | git2::Status::INDEX_RENAMED
                        | git2::Status::INDEX_TYPECHANGE,
                ),
                // A conflicted path is a working-tree fact even when libgit2
                // reports no WT_* bit for it.
                in_worktree: s.intersects(
                    git2::Status::WT_NEW
                        | git2::Status::WT_MODIFIED
                        | git2::Status::WT_DELETED
                        | git2::Status::WT_RENAMED
                        | git2::Status::WT_TYPECHANGE,
                ) || s.is_conflicted(),
            });
        }
        Ok(changes)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        if self
            .repo
            .head_detached()
            .map_err(|e| backend_err("resolve HEAD", &e))?
        {
            return Ok(None);
        }
        // Reading the symbolic target directly keeps the branch name
        // available on an unborn branch, where `Repository::head` fails.
        let head = self
            .repo
            .find_reference("HEAD")
            .map_err(|e| backend_err("resolve HEAD", &e))?;
        Ok(head
            .symbolic_target()
            .and_then(|t| t.strip_prefix("refs/heads/"))
            .map(String::from))
    }

    fn head_commit(&self) -> Result<CommitId> {
        match self.repo.head() {
            Ok(head) => {
                let commit = head
                    .peel_to_commit()
                    .map_err(|e| backend_err("peel HEAD to commit", &e))?;
                Ok(CommitId::from(commit.id()))
            }
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Err(Error::NoCommits {
                    repo: self.location.display().to_string(),
                })
            }
            Err(e) => Err(backend_err("resolve HEAD", &e)),
        }
    }

    fn is_ancestor(&self, ancestor: &CommitId, descendant: &CommitId) -> Result<bool> {
        let anc = Self::parse_oid(ancestor)?;
        let desc = Self::parse_oid(descendant)?;
        // A commit absent from the object database cannot be part of the
        // history; report that as a plain negative, not a query failure.
        if self.repo.find_commit(anc).is_err() {
            return Ok(false);
        }
        self.repo
            .graph_descendant_of(desc, anc)
            .map_err(|e| backend_err("ancestry test", &e))
    }

    fn submodule_names(&self) -> Result<Vec<String>> {
        let submodules = self
            .repo
            .submodules()
            .map_err(|e| backend_err("list submodules", &e))?;
        let mut names = Vec::with_capacity(submodules.len());
        for sm in &submodules {
            match sm.name() {
                Some(name) => names.push(name.to_string()),
                None => warn!(
                    "skipping submodule with non-utf8 name at {}",
                    sm.path().display()
                ),
            }
        }
        Ok(names)
    }

    fn submodule_visible(&self, name: &str) -> Result<bool> {
        let sm = self.find_submodule(name)?;
        let Some(workdir) = self.repo.workdir() else {
            return Ok(false);
        };
        // A populated submodule has a `.git` entry (a gitlink file for
        // modern checkouts, a directory for old ones).
        Ok(workdir.join(sm.path()).join(".git").exists())
    }

    fn open_submodule(&self, name: &str) -> Result<Self> {
        let sm = self.find_submodule(name)?;
        let repo = sm.open().map_err(|e| Error::Backend {
            op: format!("open submodule '{name}'"),
            message: e.message().to_string(),
        })?;
        Ok(Self::from_repo(repo))
    }

    fn pinned_commit(&self, name: &str, at: &CommitId) -> Result<Option<CommitId>> {
        let sm = self.find_submodule(name)?;
        let oid = Self::parse_oid(at)?;
        let commit = self
            .repo
            .find_commit(oid)
            .map_err(|e| backend_err("look up commit", &e))?;
        let tree = commit
            .tree()
            .map_err(|e| backend_err("read commit tree", &e))?;
        match tree.get_path(sm.path()) {
            Ok(entry) if entry.kind() == Some(ObjectType::Commit) => {
                Ok(Some(CommitId::from(entry.id())))
            }
            Ok(_) => Ok(None),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(backend_err("read pinned commit", &e)),
        }
    }

    fn reopen(&self) -> Result<Self> {
        Self::open(&self.location)
    }
}
