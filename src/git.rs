//! # Git Workflow Commands
//!
//! Thin wrappers around the system `git` binary for the submodule-inclusion
//! workflow: registering a new submodule, fetching it, and checking out a
//! branch. A linear sequence of invocations with no algorithmic depth.
//!
//! Using the system git command means authentication works out of the box:
//! SSH keys from `~/.ssh/`, credential helpers, personal access tokens, and
//! anything else configured in `~/.gitconfig`. All read-only status queries
//! go through the `backend` module instead; this module is the tool's only
//! mutating surface.

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Register a new submodule at `path`, cloning it from `url`.
///
/// On success the submodule is cloned, checked out, and staged in the
/// meta-repository's index (together with its configuration entry); it
/// becomes visible to status resolution immediately.
pub fn submodule_add(repo_root: &Path, url: &str, path: &Path) -> Result<()> {
    let mut cmd = Command::new("git");
    cmd.arg("-C")
        .arg(repo_root)
        .args(["submodule", "add"])
        .arg(url)
        .arg(path);
    run(cmd, "submodule add").map(|_| ())
}

/// Fetch `origin` inside the repository at `repo_dir`.
pub fn fetch_origin(repo_dir: &Path) -> Result<()> {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(repo_dir).args(["fetch", "--quiet", "origin"]);
    run(cmd, "fetch").map(|_| ())
}

/// Check out `branch` inside the repository at `repo_dir`, creating it if
/// it does not exist yet.
pub fn checkout_branch(repo_dir: &Path, branch: &str) -> Result<()> {
    let mut existing = Command::new("git");
    existing
        .arg("-C")
        .arg(repo_dir)
        .args(["checkout", "--quiet", branch]);
    if run(existing, "checkout").is_ok() {
        return Ok(());
    }

    let mut create = Command::new("git");
    create
        .arg("-C")
        .arg(repo_dir)
        .args(["checkout", "--quiet", "-b", branch]);
    run(create, "checkout -b").map(|_| ())
}

fn run(mut cmd: Command, description: &str) -> Result<String> {
    let output = cmd.output().map_err(|e| Error::Git {
        command: format!("git {description}"),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stderr = match auth_hint(&stderr) {
            Some(hint) => format!("{stderr}\n  hint: {hint}"),
            None => stderr,
        };
        return Err(Error::Git {
            command: format!("git {description}"),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Provide a helpful hint for common authentication failures.
fn auth_hint(stderr: &str) -> Option<&'static str> {
    let auth_failure = stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository");
    auth_failure.then_some(
        "make sure you have access to the repository: an SSH key added to \
         ssh-agent, git credentials configured, or a personal access token set up",
    )
}
