//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use sub_repo::output::OutputConfig;

use crate::commands;

/// Sub Repository - Inspect a meta-repository and its pinned submodules
#[derive(Parser, Debug)]
#[command(name = "sub-repo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the meta-repository status and where every submodule stands
    Status(commands::status::StatusArgs),

    /// Check cleanliness and consistency of the whole tree
    Check(commands::check::CheckArgs),

    /// List recorded submodules with their pinned commits
    Ls(commands::ls::LsArgs),

    /// Register a new submodule and check out a branch inside it
    Add(commands::add::AddArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(&self.log_level),
        )
        .format_timestamp(None)
        .try_init()
        .ok();

        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Status(args) => commands::status::execute(args, &output),
            Commands::Check(args) => commands::check::execute(args, &output),
            Commands::Ls(args) => commands::ls::execute(args),
            Commands::Add(args) => commands::add::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
