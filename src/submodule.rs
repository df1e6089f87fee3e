//! # Submodule Status Resolution
//!
//! For every submodule recorded by the meta-repository this module answers
//! the question *where does the checkout stand relative to its pin*: not
//! checked out at all, exactly at the pinned commit, legitimately advanced
//! beyond it, or diverged from it entirely.
//!
//! [`resolve_one`] handles a single submodule. [`resolve_all`] fans the work
//! out across the rayon thread pool (one task per submodule, each on its own
//! reopened handle) and fans back in preserving the caller-supplied order,
//! so downstream rendering is deterministic regardless of completion order.
//! One submodule's failure is carried in its own report entry; sibling
//! queries are unaffected.

use log::debug;
use rayon::prelude::*;
use serde::Serialize;

use crate::backend::{CommitId, VcsRepo};
use crate::error::Result;
use crate::status::{collect, RepositoryStatus};

/// Relation of a submodule's actual head to its pinned commit.
///
/// Only computed when head and pin differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AncestryVerdict {
    /// The pin is an ancestor of the head: the submodule has new commits.
    Advanced,
    /// The head's history does not contain the pin, typically after a
    /// force-push, a rebase, or a manual checkout of an unrelated ref.
    Diverged,
}

/// What was found for one requested submodule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmoduleSnapshot {
    /// The submodule directory is not populated; no further status is
    /// obtainable.
    NotVisible,
    /// The submodule is checked out. `ancestry` is present iff the head
    /// differs from the pinned commit.
    Present {
        status: RepositoryStatus,
        ancestry: Option<AncestryVerdict>,
    },
}

/// A submodule name together with the commit the meta-repository records
/// for it.
#[derive(Debug, Clone)]
pub struct SubmodulePin {
    pub name: String,
    pub pinned: CommitId,
}

/// Outcome of resolving one pin. A failed query is carried here instead of
/// aborting the whole fan-out.
#[derive(Debug)]
pub struct SubmoduleReport {
    pub pin: SubmodulePin,
    pub result: Result<SubmoduleSnapshot>,
}

/// Resolve the state of a single submodule against its pin.
pub fn resolve_one<R: VcsRepo>(
    meta: &R,
    name: &str,
    pinned: &CommitId,
) -> Result<SubmoduleSnapshot> {
    if !meta.submodule_visible(name)? {
        return Ok(SubmoduleSnapshot::NotVisible);
    }

    let sub = meta.open_submodule(name)?;
    let status = collect(&sub, None)?;

    let ancestry = match &status.head_commit {
        Some(head) if head == pinned => None,
        Some(head) => {
            if sub.is_ancestor(pinned, head)? {
                Some(AncestryVerdict::Advanced)
            } else {
                Some(AncestryVerdict::Diverged)
            }
        }
        // A submodule with no commits cannot contain the pin.
        None => Some(AncestryVerdict::Diverged),
    };

    Ok(SubmoduleSnapshot::Present { status, ancestry })
}

/// Read the recorded pin for every submodule listed by the meta-repository,
/// at its current head.
///
/// Propagates [`Error::NoCommits`] when the meta-repository has no head;
/// callers decide whether that is fatal. Submodules staged but not yet
/// recorded at head are skipped.
pub fn pin_all<R: VcsRepo>(meta: &R) -> Result<Vec<SubmodulePin>> {
    let head = meta.head_commit()?;
    let mut pins = Vec::new();
    for name in meta.submodule_names()? {
        match meta.pinned_commit(&name, &head)? {
            Some(pinned) => pins.push(SubmodulePin { name, pinned }),
            None => debug!("submodule '{name}' is not recorded at {head}; skipping"),
        }
    }
    Ok(pins)
}

/// Resolve every pin, in parallel.
///
/// Each task operates on its own meta-repository handle, obtained through
/// [`VcsRepo::reopen`] before the fan-out, and opens its own submodule
/// handle; both are released when the task completes, on the error path
/// included. Reports come back in the order of `pins`.
pub fn resolve_all<R: VcsRepo>(meta: &R, pins: &[SubmodulePin]) -> Vec<SubmoduleReport> {
    let tasks: Vec<(SubmodulePin, Result<R>)> = pins
        .iter()
        .map(|pin| (pin.clone(), meta.reopen()))
        .collect();

    tasks
        .into_par_iter()
        .map(|(pin, handle)| {
            let result =
                handle.and_then(|meta| resolve_one(&meta, &pin.name, &pin.pinned));
            SubmoduleReport { pin, result }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testutil::FakeRepo;

    fn clean_sub(head: &str) -> FakeRepo {
        FakeRepo::new().with_branch("main").with_head(head)
    }

    #[test]
    fn test_unpopulated_submodule_is_not_visible() {
        let meta = FakeRepo::new()
            .with_head("m1")
            .with_hidden_submodule("lib", "aaaa111");
        let snapshot = resolve_one(&meta, "lib", &CommitId::new("aaaa111")).unwrap();
        assert!(matches!(snapshot, SubmoduleSnapshot::NotVisible));
    }

    #[test]
    fn test_matching_pin_skips_the_ancestry_test() {
        let sub = clean_sub("aaaa111");
        // Clones share the call counter, so this probe observes the handle
        // the resolver opens.
        let probe = sub.clone();
        let meta = FakeRepo::new()
            .with_head("m1")
            .with_submodule("lib", "aaaa111", sub);
        let snapshot = resolve_one(&meta, "lib", &CommitId::new("aaaa111")).unwrap();
        match snapshot {
            SubmoduleSnapshot::Present { ancestry, .. } => assert_eq!(ancestry, None),
            other => panic!("expected Present, got {other:?}"),
        }
        assert_eq!(probe.ancestry_test_count(), 0);
    }

    #[test]
    fn test_fast_forwarded_submodule_has_advanced() {
        let sub = clean_sub("bbbb222").with_ancestry("aaaa111", "bbbb222");
        let meta = FakeRepo::new()
            .with_head("m1")
            .with_submodule("lib", "aaaa111", sub);
        let snapshot = resolve_one(&meta, "lib", &CommitId::new("aaaa111")).unwrap();
        match snapshot {
            SubmoduleSnapshot::Present { ancestry, .. } => {
                assert_eq!(ancestry, Some(AncestryVerdict::Advanced));
            }
            other => panic!("expected Present, got {other:?}"),
        }
    }

    #[test]
    fn test_unrelated_head_has_diverged() {
        let meta = FakeRepo::new()
            .with_head("m1")
            .with_submodule("lib", "aaaa111", clean_sub("cccc333"));
        let snapshot = resolve_one(&meta, "lib", &CommitId::new("aaaa111")).unwrap();
        match snapshot {
            SubmoduleSnapshot::Present { ancestry, .. } => {
                assert_eq!(ancestry, Some(AncestryVerdict::Diverged));
            }
            other => panic!("expected Present, got {other:?}"),
        }
    }

    #[test]
    fn test_submodule_without_commits_has_diverged() {
        let sub = FakeRepo::new().with_branch("main");
        let meta = FakeRepo::new()
            .with_head("m1")
            .with_submodule("lib", "aaaa111", sub);
        let snapshot = resolve_one(&meta, "lib", &CommitId::new("aaaa111")).unwrap();
        match snapshot {
            SubmoduleSnapshot::Present { status, ancestry } => {
                assert_eq!(status.head_commit, None);
                assert_eq!(ancestry, Some(AncestryVerdict::Diverged));
            }
            other => panic!("expected Present, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_all_preserves_requested_order() {
        let meta = FakeRepo::new()
            .with_head("m1")
            .with_submodule("zeta", "a1", clean_sub("a1"))
            .with_submodule("alpha", "b2", clean_sub("b2"))
            .with_submodule("mid", "c3", clean_sub("c3"));
        let pins = pin_all(&meta).unwrap();
        let names: Vec<_> = pins.iter().map(|p| p.name.clone()).collect();
        let reports = resolve_all(&meta, &pins);
        let reported: Vec<_> = reports.iter().map(|r| r.pin.name.clone()).collect();
        assert_eq!(reported, names);
    }

    #[test]
    fn test_one_failing_submodule_does_not_poison_the_others() {
        let meta = FakeRepo::new()
            .with_head("m1")
            .with_submodule("ok", "a1", clean_sub("a1"))
            .with_broken_submodule("broken", "b2");
        let pins = pin_all(&meta).unwrap();
        let reports = resolve_all(&meta, &pins);
        assert_eq!(reports.len(), 2);
        assert!(reports[0].result.is_ok());
        match &reports[1].result {
            Err(Error::Backend { .. }) => {}
            other => panic!("expected backend error, got {other:?}"),
        }
    }

    #[test]
    fn test_pin_all_skips_unrecorded_submodules() {
        let meta = FakeRepo::new()
            .with_head("m1")
            .with_submodule("lib", "a1", clean_sub("a1"))
            .with_unrecorded_submodule("fresh");
        let pins = pin_all(&meta).unwrap();
        let names: Vec<_> = pins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["lib"]);
    }
}
