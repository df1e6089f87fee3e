//! # Sub-Repository Library
//!
//! This library provides the core functionality for inspecting a
//! meta-repository: a repository whose working tree embeds multiple
//! independently-versioned submodules, each pinned to a specific commit
//! recorded by the meta-repository's own tree. It is designed to be used by
//! the `sub-repo` command-line tool but can also be integrated into other
//! applications that need a trustworthy, aggregated picture of where every
//! repository stands relative to its pin.
//!
//! ## Quick Example
//!
//! ```
//! use sub_repo::backend::RawChange;
//! use sub_repo::status::{classify, FileChangeKind};
//!
//! // A path that appeared in the working tree and is not in the index yet
//! let record = RawChange {
//!     path: "src/new.rs".into(),
//!     is_new: true,
//!     in_worktree: true,
//!     ..Default::default()
//! };
//! assert_eq!(classify(&record), FileChangeKind::Added);
//! ```
//!
//! ## Core Concepts
//!
//! The library is built around a few key concepts:
//!
//! - **Backend (`backend`)**: the `VcsRepo` trait of read-only repository
//!   queries, implemented over `git2` in production and by an in-memory
//!   fake in tests.
//! - **Status (`status`)**: change classification and per-repository status
//!   collection, producing the `RepositoryStatus` value object.
//! - **Submodule Resolution (`submodule`)**: per-submodule visibility,
//!   status, and ancestry verdicts, with parallel fan-out across all
//!   submodules of a meta-repository.
//! - **Consistency Gate (`gate`)**: whole-tree cleanliness and structural
//!   consistency checks that report every violation at once and are used to
//!   gate destructive workflows.
//! - **Reporting (`output`)**: colorized text rendering of statuses and
//!   submodule reports.
//! - **Inclusion Workflow (`git`)**: registering a new submodule through
//!   the system git binary, the tool's only mutating surface.
//!
//! ## Execution Flow
//!
//! A `status` query runs the following high-level steps:
//!
//! 1.  Collect the meta-repository's own status (with the submodule
//!     configuration file filtered out).
//! 2.  Read the commit pinned for every recorded submodule at the
//!     meta-repository head.
//! 3.  Resolve every submodule in parallel: visibility, status, and, when
//!     the head differs from the pin, an ancestry verdict.
//! 4.  Re-impose the recorded submodule order and render the reports.
//!
//! The gate operations compose the same steps into go/no-go answers.

pub mod backend;
pub mod error;
pub mod gate;
pub mod git;
pub mod output;
pub mod status;
pub mod submodule;

#[cfg(test)]
pub(crate) mod testutil;
