//! # Sub-Repository CLI
//!
//! This is the binary entry point for the `sub-repo` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Handling top-level application errors and translating them into
//!   user-friendly output and exit codes.
//!
//! The core application logic is defined in the `lib.rs` library crate,
//! ensuring that the binary is a thin wrapper around the reusable library
//! functionality. In particular the library reports gate failures as error
//! values; deciding that they map to exit code 2 happens here and nowhere
//! else.

mod cli;
mod commands;

use clap::Parser;
use std::process::ExitCode;

use sub_repo::error::Error;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // A gate failure is a normal outcome with a dedicated exit
            // code; anything else is an operational error.
            if let Some(Error::Gate { violations }) = err.downcast_ref::<Error>() {
                eprintln!("{} violation(s) found:", violations.len());
                for violation in violations {
                    eprintln!("  - {violation}");
                }
                ExitCode::from(2)
            } else {
                eprintln!("Error: {err:#}");
                ExitCode::FAILURE
            }
        }
    }
}
