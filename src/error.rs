//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `sub-repo` application. It uses the `thiserror` library to create a
//! comprehensive `Error` enum that covers all anticipated failure modes,
//! providing clear and descriptive error messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the application. Each variant corresponds to a specific
//!   type of error and includes contextual information to aid in debugging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the application to simplify function signatures and ensure
//!   type safety.
//!
//! Two variants deserve special attention:
//!
//! - **`NoCommits`** is recoverable. A freshly added submodule has no head
//!   yet, and callers are expected to branch on this variant explicitly
//!   rather than treat it as fatal.
//!
//! - **`Gate`** always carries the complete list of violations found by a
//!   consistency check, never just the first one, so that operators can fix
//!   everything in a single pass. The library never terminates the process
//!   on a gate failure; the binary maps it to an exit code.

use thiserror::Error;

/// Main error type for sub-repo operations
#[derive(Error, Debug)]
pub enum Error {
    /// A query against the version-control backend could not be performed,
    /// e.g. because the repository is corrupted or an I/O failure occurred.
    ///
    /// Backend failures are not retried; they propagate to the caller.
    #[error("backend query failed: {op}: {message}")]
    Backend { op: String, message: String },

    /// The repository has no head commit.
    ///
    /// Expected for brand-new repositories and freshly added submodules.
    #[error("repository '{repo}' has no commits")]
    NoCommits { repo: String },

    /// A named submodule is unknown to the meta-repository or its
    /// configuration could not be loaded.
    #[error("submodule '{name}': {message}")]
    SubmoduleLookup { name: String, message: String },

    /// One or more consistency or cleanliness violations were found.
    ///
    /// Carries every violation discovered by the check, in the order the
    /// repositories were inspected.
    #[error("{} consistency violation(s) found:\n{}", .violations.len(), .violations.join("\n"))]
    Gate { violations: Vec<String> },

    /// An invocation of the system `git` binary failed.
    ///
    /// Only the submodule-inclusion workflow shells out; all status queries
    /// go through the backend.
    #[error("git command failed: {command}: {stderr}")]
    Git { command: String, stderr: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
