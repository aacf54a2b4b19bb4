//! Defines the command-line arguments and subcommands for the svt CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "svt",
    version,
    about = "Validate and inspect svt fixture files."
)]
pub struct SvtArgs {
    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load and normalize fixture files; directories are searched recursively.
    Check {
        /// Fixture files or directories containing them.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print the normalized cases of a fixture file.
    Show {
        /// The fixture file to show.
        #[arg(required = true)]
        file: PathBuf,
        /// Print the cases as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}
