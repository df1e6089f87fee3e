//! # Consistency Gate
//!
//! Whole-tree checks used to gate destructive or history-rewriting
//! workflows: is everything clean, and is the meta-repository in a
//! structurally sound state to operate on.
//!
//! Each check either returns `Ok(())` or fails with [`Error::Gate`]
//! carrying the *complete* list of violations, collected across the
//! meta-repository and every submodule before reporting. The gate only
//! observes; it never mutates a repository, and it never terminates the
//! process. Mapping a gate failure to an exit code is the binary's job.

use std::path::Path;

use log::debug;

use crate::backend::{VcsRepo, MODULES_FILE};
use crate::error::{Error, Result};
use crate::status::collect;
use crate::submodule::{pin_all, resolve_all, AncestryVerdict, SubmoduleReport, SubmoduleSnapshot};

/// Everything must be clean: the meta-repository working tree, every
/// submodule's working tree, and every submodule's head must sit exactly on
/// its recorded pin.
///
/// Submodules that are not checked out are skipped; there is nothing on
/// disk to inspect. A submodule whose status query fails contributes the
/// failure as a violation so the report stays complete.
pub fn check_clean<R: VcsRepo>(meta: &R) -> Result<()> {
    let mut violations = Vec::new();

    let filter = |path: &Path| path != Path::new(MODULES_FILE);
    let status = collect(meta, Some(&filter))?;
    if !status.is_clean() {
        violations.push("meta repository working tree is not clean".to_string());
    }

    match pin_all(meta) {
        Ok(pins) => {
            for report in resolve_all(meta, &pins) {
                collect_submodule_violations(&report, &mut violations);
            }
        }
        Err(Error::NoCommits { .. }) => {
            debug!("meta repository has no commits; no submodule pins to check");
        }
        Err(e) => return Err(e),
    }

    finish(violations)
}

/// The meta-repository must be on a named branch, have a head commit, and
/// have a clean working tree.
///
/// Deliberately does not compare submodule branch names against the
/// meta-repository's branch; the contract covers meta-repository
/// structural state only.
pub fn check_consistent<R: VcsRepo>(meta: &R) -> Result<()> {
    let mut violations = Vec::new();

    if meta.current_branch()?.is_none() {
        violations.push("meta repository is in detached HEAD state (no branch)".to_string());
    }

    match meta.head_commit() {
        Ok(_) => {}
        Err(Error::NoCommits { .. }) => {
            violations.push("meta repository has no commits (no head)".to_string());
        }
        Err(e) => return Err(e),
    }

    let filter = |path: &Path| path != Path::new(MODULES_FILE);
    let status = collect(meta, Some(&filter))?;
    if !status.is_clean() {
        violations.push("meta repository working tree is not clean".to_string());
    }

    finish(violations)
}

/// Consistency first, then cleanliness; either failure aborts the
/// composite with that set of violations. An inconsistent repository makes
/// cleanliness findings hard to interpret, hence the order.
pub fn check_clean_and_consistent<R: VcsRepo>(meta: &R) -> Result<()> {
    check_consistent(meta)?;
    check_clean(meta)
}

fn collect_submodule_violations(report: &SubmoduleReport, violations: &mut Vec<String>) {
    let name = &report.pin.name;
    match &report.result {
        Err(e) => violations.push(format!("submodule '{name}': status query failed: {e}")),
        Ok(SubmoduleSnapshot::NotVisible) => {
            debug!("submodule '{name}' is not checked out; skipping");
        }
        Ok(SubmoduleSnapshot::Present { status, ancestry }) => {
            match ancestry {
                None => {}
                Some(AncestryVerdict::Advanced) => violations.push(format!(
                    "submodule '{name}' has new commits beyond its recorded {}",
                    report.pin.pinned.short()
                )),
                Some(AncestryVerdict::Diverged) => violations.push(format!(
                    "submodule '{name}' is not a descendant of its recorded commit {}",
                    report.pin.pinned.short()
                )),
            }
            if !status.is_clean() {
                violations.push(format!("submodule '{name}' has uncommitted changes"));
            }
        }
    }
}

fn finish(violations: Vec<String>) -> Result<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::Gate { violations })
    }
}
