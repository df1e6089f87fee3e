//! # Repository Status
//!
//! Change classification and status collection for a single repository.
//!
//! The [`classify`] function maps one raw per-path change record to exactly
//! one [`FileChangeKind`] using a fixed priority chain. The [`collect`]
//! function drives the backend and the classifier to produce a
//! [`RepositoryStatus`], the value object every higher layer (submodule
//! resolver, consistency gate, reporter) consumes.
//!
//! A status is constructed fresh for each query, immutable once returned,
//! and never persisted.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::backend::{CommitId, RawChange, VcsRepo};
use crate::error::{Error, Result};

/// Semantic kind of a single per-path change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileChangeKind {
    Modified,
    Added,
    Removed,
    Conflicted,
    Renamed,
    TypeChanged,
}

/// Classify one raw change record.
///
/// Priority chain, first match wins. A record can carry several flags at
/// once (e.g. new and conflicted); the chain order resolves every overlap.
pub fn classify(change: &RawChange) -> FileChangeKind {
    if change.is_new {
        FileChangeKind::Added
    } else if change.is_deleted {
        FileChangeKind::Removed
    } else if change.is_conflicted {
        FileChangeKind::Conflicted
    } else if change.is_renamed {
        FileChangeKind::Renamed
    } else if change.is_typechange {
        FileChangeKind::TypeChanged
    } else {
        FileChangeKind::Modified
    }
}

/// Predicate deciding whether a path takes part in status collection.
///
/// Rejected paths are skipped entirely. The meta-repository caller uses this
/// to hide its submodule-configuration file; the CLI composes user-supplied
/// glob excludes into the same predicate.
pub type PathFilter = dyn Fn(&Path) -> bool + Sync;

/// Snapshot of one repository's state.
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryStatus {
    /// Checked-out branch; `None` for a detached head.
    pub current_branch: Option<String>,
    /// Head commit; `None` only for a repository with no commits.
    pub head_commit: Option<CommitId>,
    /// Index-vs-head differences.
    pub staged: BTreeMap<PathBuf, FileChangeKind>,
    /// Working-tree-vs-index differences. A path may appear here and in
    /// `staged` at the same time (staged, then modified again).
    pub working_dir: BTreeMap<PathBuf, FileChangeKind>,
    /// Paths present in the working tree but in neither map.
    pub untracked: Vec<PathBuf>,
}

impl RepositoryStatus {
    /// True iff there are no staged and no working-tree changes. Untracked
    /// files never affect cleanliness.
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.working_dir.is_empty()
    }
}

/// Collect the status of one repository.
///
/// Head resolution branches explicitly on [`Error::NoCommits`]: a repository
/// without commits yields a status with `head_commit: None` rather than a
/// failure. Any other backend error aborts the query.
pub fn collect<R: VcsRepo>(repo: &R, filter: Option<&PathFilter>) -> Result<RepositoryStatus> {
    let mut staged = BTreeMap::new();
    let mut working_dir = BTreeMap::new();
    let mut untracked = Vec::new();

    for change in repo.raw_changes()? {
        if let Some(filter) = filter {
            if !filter(&change.path) {
                continue;
            }
        }
        let kind = classify(&change);
        if change.in_index {
            staged.insert(change.path.clone(), kind);
        }
        if change.in_worktree {
            if change.is_new && !change.in_index {
                untracked.push(change.path);
            } else {
                working_dir.insert(change.path, kind);
            }
        }
    }

    let current_branch = repo.current_branch()?;
    let head_commit = match repo.head_commit() {
        Ok(id) => Some(id),
        Err(Error::NoCommits { .. }) => None,
        Err(e) => return Err(e),
    };

    Ok(RepositoryStatus {
        current_branch,
        head_commit,
        staged,
        working_dir,
        untracked,
    })
}
