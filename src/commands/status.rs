//! # Status Command Implementation
//!
//! This module implements the `status` subcommand, which shows the
//! aggregated picture of the whole tree: the meta-repository's own staged,
//! unstaged, and untracked changes, and one line per recorded submodule
//! describing where its checkout stands relative to the commit pinned by
//! the meta-repository.
//!
//! ## Functionality
//!
//! - **Meta Status**: The familiar three-section listing, with the
//!   submodule configuration file filtered out (it is an implementation
//!   artifact, not user content).
//! - **Submodule Resolution**: All submodules are resolved in parallel;
//!   output order always follows the recorded submodule order.
//! - **Pattern Filtering**: `--exclude` hides matching meta-repository
//!   paths from the listing.
//! - **Output Formats**: Human-readable text (default) or JSON for
//!   scripting.
//!
//! This command is a safe, read-only operation that does not modify any
//! files.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};

use sub_repo::backend::{CommitId, GitRepo, MODULES_FILE};
use sub_repo::error::Error;
use sub_repo::output::{render_repository_status, render_submodule_report, OutputConfig};
use sub_repo::status::{collect, RepositoryStatus};
use sub_repo::submodule::{pin_all, resolve_all, SubmoduleReport, SubmoduleSnapshot};

/// Show the status of the meta-repository and all submodules
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// The meta-repository to inspect.
    ///
    /// If not provided, it is discovered from the current working
    /// directory.
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Exclude meta-repository paths matching this glob pattern
    /// (e.g. "target/**", "*.lock").
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    pub format: Format,
}

/// Output format for the status report
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    /// Human-readable text
    Text,
    /// Machine-readable JSON
    Json,
}

/// Execute the `status` command.
pub fn execute(args: StatusArgs, output: &OutputConfig) -> Result<()> {
    let root = match args.repo {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let meta = GitRepo::discover(&root)?;

    let exclude = args
        .exclude
        .as_deref()
        .map(glob::Pattern::new)
        .transpose()
        .context("invalid --exclude pattern")?;
    let filter = move |path: &Path| {
        path != Path::new(MODULES_FILE)
            && exclude.as_ref().map_or(true, |pat| !pat.matches_path(path))
    };

    let meta_status = collect(&meta, Some(&filter))?;
    let pins = match pin_all(&meta) {
        Ok(pins) => pins,
        // A brand-new meta-repository records no pins yet.
        Err(Error::NoCommits { .. }) => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    let reports = resolve_all(&meta, &pins);

    match args.format {
        Format::Text => {
            print!("{}", render_repository_status(output, &meta_status));
            if !reports.is_empty() {
                println!("\nSubmodules:");
                for report in &reports {
                    println!(
                        "{}",
                        render_submodule_report(
                            output,
                            report,
                            meta_status.current_branch.as_deref(),
                        )
                    );
                }
            }
        }
        Format::Json => {
            let doc = StatusDocument {
                meta: &meta_status,
                submodules: reports.iter().map(SubmoduleEntry::from_report).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct StatusDocument<'a> {
    meta: &'a RepositoryStatus,
    submodules: Vec<SubmoduleEntry<'a>>,
}

#[derive(Serialize)]
struct SubmoduleEntry<'a> {
    name: &'a str,
    pinned: &'a CommitId,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<&'a SubmoduleSnapshot>,
}

impl<'a> SubmoduleEntry<'a> {
    fn from_report(report: &'a SubmoduleReport) -> Self {
        let (error, snapshot) = match &report.result {
            Ok(snapshot) => (None, Some(snapshot)),
            Err(e) => (Some(e.to_string()), None),
        };
        Self {
            name: &report.pin.name,
            pinned: &report.pin.pinned,
            error,
            snapshot,
        }
    }
}
