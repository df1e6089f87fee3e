//! In-memory backend used by unit tests.
//!
//! Mirrors the trait-based design of the production backend: resolver and
//! gate logic run against [`FakeRepo`] without touching disk, the same way
//! the repository-management traits allow mock implementations in tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::backend::{CommitId, RawChange, VcsRepo};
use crate::error::{Error, Result};

#[derive(Clone, Default)]
pub(crate) struct FakeRepo {
    branch: Option<String>,
    head: Option<CommitId>,
    changes: Vec<RawChange>,
    ancestries: Vec<(CommitId, CommitId)>,
    ancestry_calls: Arc<AtomicUsize>,
    submodules: Vec<FakeSubmodule>,
}

#[derive(Clone)]
struct FakeSubmodule {
    name: String,
    /// `None` models a submodule staged but not recorded at head.
    pinned: Option<CommitId>,
    visible: bool,
    broken: bool,
    repo: FakeRepo,
}

impl FakeRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branch = Some(branch.to_string());
        self
    }

    pub fn with_head(mut self, head: &str) -> Self {
        self.head = Some(CommitId::new(head));
        self
    }

    pub fn with_change(mut self, change: RawChange) -> Self {
        self.changes.push(change);
        self
    }

    pub fn with_ancestry(mut self, ancestor: &str, descendant: &str) -> Self {
        self.ancestries
            .push((CommitId::new(ancestor), CommitId::new(descendant)));
        self
    }

    pub fn with_submodule(mut self, name: &str, pinned: &str, repo: FakeRepo) -> Self {
        self.submodules.push(FakeSubmodule {
            name: name.to_string(),
            pinned: Some(CommitId::new(pinned)),
            visible: true,
            broken: false,
            repo,
        });
        self
    }

    pub fn with_hidden_submodule(mut self, name: &str, pinned: &str) -> Self {
        self.submodules.push(FakeSubmodule {
            name: name.to_string(),
            pinned: Some(CommitId::new(pinned)),
            visible: false,
            broken: false,
            repo: FakeRepo::new(),
        });
        self
    }

    pub fn with_broken_submodule(mut self, name: &str, pinned: &str) -> Self {
        self.submodules.push(FakeSubmodule {
            name: name.to_string(),
            pinned: Some(CommitId::new(pinned)),
            visible: true,
            broken: true,
            repo: FakeRepo::new(),
        });
        self
    }

    pub fn with_unrecorded_submodule(mut self, name: &str) -> Self {
        self.submodules.push(FakeSubmodule {
            name: name.to_string(),
            pinned: None,
            visible: true,
            broken: false,
            repo: FakeRepo::new(),
        });
        self
    }

    pub fn ancestry_test_count(&self) -> usize {
        self.ancestry_calls.load(Ordering::SeqCst)
    }

    fn find(&self, name: &str) -> Result<&FakeSubmodule> {
        self.submodules
            .iter()
            .find(|sm| sm.name == name)
            .ok_or_else(|| Error::SubmoduleLookup {
                name: name.to_string(),
                message: "unknown submodule".to_string(),
            })
    }
}

impl VcsRepo for FakeRepo {
    fn raw_changes(&self) -> Result<Vec<RawChange>> {
        Ok(self.changes.clone())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.branch.clone())
    }

    fn head_commit(&self) -> Result<CommitId> {
        self.head.clone().ok_or_else(|| Error::NoCommits {
            repo: "fake".to_string(),
        })
    }

    fn is_ancestor(&self, ancestor: &CommitId, descendant: &CommitId) -> Result<bool> {
        self.ancestry_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .ancestries
            .contains(&(ancestor.clone(), descendant.clone())))
    }

    fn submodule_names(&self) -> Result<Vec<String>> {
        Ok(self.submodules.iter().map(|sm| sm.name.clone()).collect())
    }

    fn submodule_visible(&self, name: &str) -> Result<bool> {
        Ok(self.find(name)?.visible)
    }

    fn open_submodule(&self, name: &str) -> Result<Self> {
        let sm = self.find(name)?;
        if sm.broken {
            return Err(Error::Backend {
                op: format!("open submodule '{name}'"),
                message: "simulated repository corruption".to_string(),
            });
        }
        Ok(sm.repo.clone())
    }

    fn pinned_commit(&self, name: &str, _at: &CommitId) -> Result<Option<CommitId>> {
        Ok(self.find(name)?.pinned.clone())
    }

    fn reopen(&self) -> Result<Self> {
        Ok(self.clone())
    }
}
