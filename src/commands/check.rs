//! # Check Command Implementation
//!
//! This module implements the `check` subcommand, the gating entry point
//! used before destructive or history-rewriting workflows.
//!
//! ## Functionality
//!
//! - **Composite Check** (default): structural consistency of the
//!   meta-repository first, then cleanliness of the whole tree.
//! - **`--clean-only`**: every working tree must be clean and every
//!   submodule must sit exactly on its recorded pin.
//! - **`--consistent-only`**: the meta-repository must be on a named
//!   branch, have a head commit, and have a clean working tree.
//!
//! All violations are collected and reported together so everything can be
//! fixed in one pass. A failed check exits with code 2; the check itself
//! never modifies any repository.

use anyhow::Result;
use clap::Args;
use console::Style;
use std::path::PathBuf;

use sub_repo::backend::GitRepo;
use sub_repo::gate;
use sub_repo::output::{paint, OutputConfig};

/// Check cleanliness and consistency of the meta-repository tree
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// The meta-repository to inspect.
    ///
    /// If not provided, it is discovered from the current working
    /// directory.
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Only check that every working tree is clean and every submodule is
    /// on its recorded pin.
    #[arg(long, conflicts_with = "consistent_only")]
    pub clean_only: bool,

    /// Only check the meta-repository's structural consistency.
    #[arg(long)]
    pub consistent_only: bool,
}

/// Execute the `check` command.
///
/// A gate failure propagates to the binary entry point, which prints every
/// violation and maps the failure to exit code 2.
pub fn execute(args: CheckArgs, output: &OutputConfig) -> Result<()> {
    let root = match args.repo {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let meta = GitRepo::discover(&root)?;

    if args.clean_only {
        gate::check_clean(&meta)?;
    } else if args.consistent_only {
        gate::check_consistent(&meta)?;
    } else {
        gate::check_clean_and_consistent(&meta)?;
    }

    println!(
        "{}",
        paint(output, "OK: no violations found", Style::new().green())
    );
    Ok(())
}
