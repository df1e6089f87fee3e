//! # Ls Command Implementation
//!
//! This module implements the `ls` subcommand, which lists the submodules
//! recorded by the meta-repository together with their pinned commits and
//! whether each one is checked out.
//!
//! This command is a safe, read-only operation that does not modify any
//! files.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use sub_repo::backend::{GitRepo, VcsRepo};
use sub_repo::error::Error;
use sub_repo::submodule::pin_all;

/// List recorded submodules with their pinned commits
#[derive(Args, Debug)]
pub struct LsArgs {
    /// The meta-repository to inspect.
    ///
    /// If not provided, it is discovered from the current working
    /// directory.
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,
}

/// Execute the `ls` command.
pub fn execute(args: LsArgs) -> Result<()> {
    let root = match args.repo {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let meta = GitRepo::discover(&root)?;

    let pins = match pin_all(&meta) {
        Ok(pins) => pins,
        Err(Error::NoCommits { .. }) => {
            anyhow::bail!("the meta repository has no commits, so no submodules are recorded")
        }
        Err(e) => return Err(e.into()),
    };

    if pins.is_empty() {
        println!("no submodules recorded");
        return Ok(());
    }

    for pin in &pins {
        let marker = if meta.submodule_visible(&pin.name)? {
            ""
        } else {
            "  (not checked out)"
        };
        println!("{} {}{}", pin.pinned.short(), pin.name, marker);
    }

    Ok(())
}
