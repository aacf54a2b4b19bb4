//! The svt command-line interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use crate::cli::args::{Command, SvtArgs};
use crate::errors::SvtError;
use crate::fixture::{FixtureSet, FixtureSource, Format, Normalizer};
use clap::Parser;
use log::debug;
use std::path::{Path, PathBuf};
use std::process;
use termcolor::{ColorChoice, StandardStream, WriteColor};
use walkdir::WalkDir;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = SvtArgs::parse();
    let color = if args.no_color || !atty::is(atty::Stream::Stdout) {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let mut stdout = StandardStream::stdout(color);

    // Dispatch to the appropriate subcommand handler.
    let result = match args.command {
        Command::Check { paths } => handle_check(&paths, &mut stdout),
        Command::Show { file, json } => handle_show(&file, json, &mut stdout),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    }
}

/// Loads and normalizes a single fixture file.
pub fn load_fixture(path: &Path) -> Result<FixtureSet, SvtError> {
    let raw = FixtureSource::path(path).load()?;
    Normalizer::new().normalize(&raw)
}

/// Recursively finds fixture files under `root`, sorted for a stable order.
/// A file path is returned as-is.
pub fn discover_fixture_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && Format::from_path(e.path()).is_some())
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Handles the `check` subcommand. Returns whether every file was valid.
pub fn handle_check(paths: &[PathBuf], out: &mut impl WriteColor) -> std::io::Result<bool> {
    let mut all_ok = true;
    for root in paths {
        let files = if root.exists() {
            discover_fixture_files(root)
        } else {
            // Let the loader report the missing path.
            vec![root.clone()]
        };
        debug!("checking {} fixture file(s) under {}", files.len(), root.display());
        for file in files {
            match load_fixture(&file) {
                Ok(fixture) => output::print_check_ok(out, &file, &fixture)?,
                Err(e) => {
                    all_ok = false;
                    output::print_check_error(out, &file, e)?;
                }
            }
        }
    }
    Ok(all_ok)
}

/// Handles the `show` subcommand.
pub fn handle_show(file: &Path, json: bool, out: &mut impl WriteColor) -> std::io::Result<bool> {
    match load_fixture(file) {
        Ok(fixture) if json => output::print_cases_json(out, &fixture).map(|_| true),
        Ok(fixture) => output::print_cases(out, &fixture).map(|_| true),
        Err(e) => output::print_check_error(out, file, e).map(|_| false),
    }
}
