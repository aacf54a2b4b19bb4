//! Handles all user-facing output for the CLI.

use crate::errors::SvtError;
use crate::fixture::FixtureSet;
use std::io::{self, Write};
use std::path::Path;
use termcolor::{Color, ColorSpec, WriteColor};

/// Prints the one-line verdict for a fixture file that normalized cleanly.
pub fn print_check_ok(
    out: &mut impl WriteColor,
    path: &Path,
    fixture: &FixtureSet,
) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    write!(out, "OK")?;
    out.reset()?;
    let count = fixture.len();
    writeln!(
        out,
        "   {} ({} case{})",
        path.display(),
        count,
        if count == 1 { "" } else { "s" }
    )
}

/// Prints the verdict line and the full diagnostic for a file that failed.
pub fn print_check_error(
    out: &mut impl WriteColor,
    path: &Path,
    error: SvtError,
) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(out, "FAIL")?;
    out.reset()?;
    writeln!(out, " {}", path.display())?;
    writeln!(out, "{:?}", miette::Report::new(error))
}

/// Pretty-prints every normalized case.
pub fn print_cases(out: &mut impl WriteColor, fixture: &FixtureSet) -> io::Result<()> {
    for case in fixture {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true))?;
        writeln!(out, "{}", case.name)?;
        out.reset()?;
        let inputs = case
            .inputs
            .as_ref()
            .map_or_else(|| "(none)".to_string(), ToString::to_string);
        writeln!(out, "  {:<15} - {}", "Input", inputs)?;
        writeln!(out, "  {:<15} - {}", "Expected output", case.expected)?;
        writeln!(out, "  {:<15} - {}", "Metadata", case.metadata)?;
        if !case.init.is_empty() {
            let init: Vec<String> = case.init.iter().map(ToString::to_string).collect();
            writeln!(out, "  {:<15} - [{}]", "Init", init.join(", "))?;
        }
    }
    Ok(())
}

/// Prints the normalized cases as pretty JSON.
pub fn print_cases_json(out: &mut impl Write, fixture: &FixtureSet) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, fixture.cases()).map_err(io::Error::from)?;
    writeln!(out)
}
