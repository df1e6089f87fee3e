//! # Add Command Implementation
//!
//! This module implements the `add` subcommand, the submodule-inclusion
//! workflow: register a new submodule with the meta-repository, fetch it,
//! and check out a branch inside it.
//!
//! The workflow is a linear sequence of invocations of the system git
//! binary (see the `git` module); using the real git command means the
//! user's existing authentication setup applies. Once the sequence
//! completes, the new submodule is cloned and staged, and immediately
//! visible to `status`, `ls`, and `check`. Recording the pin is left to the
//! user's next commit of the meta-repository.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use sub_repo::backend::GitRepo;
use sub_repo::git;

/// Register a new submodule and check out a branch inside it
#[derive(Args, Debug)]
pub struct AddArgs {
    /// URL of the repository to embed.
    pub url: String,

    /// Path inside the meta-repository to place the submodule at.
    pub path: PathBuf,

    /// Branch to check out inside the new submodule, created if it does
    /// not exist.
    #[arg(long, value_name = "NAME")]
    pub branch: Option<String>,

    /// The meta-repository to add to.
    ///
    /// If not provided, it is discovered from the current working
    /// directory.
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,
}

/// Execute the `add` command.
pub fn execute(args: AddArgs) -> Result<()> {
    let root = match args.repo {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let meta = GitRepo::discover(&root)?;
    let workdir = meta.location().to_path_buf();

    println!("Adding submodule at '{}' from {}", args.path.display(), args.url);
    git::submodule_add(&workdir, &args.url, &args.path)?;

    let sub_dir = workdir.join(&args.path);
    git::fetch_origin(&sub_dir)?;

    if let Some(branch) = &args.branch {
        git::checkout_branch(&sub_dir, branch)?;
        println!("Checked out branch '{branch}'");
    }

    println!("Submodule registered; commit the meta repository to record its pin");
    Ok(())
}
