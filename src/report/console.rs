//! Human-readable, colored console report.

use super::Reporter;
use crate::fixture::{CaseRecord, DEFAULT_METADATA};
use crate::runner::{OutcomeRecord, RunSummary};
use crate::value::Value;
use difference::{Changeset, Difference};
use std::io::{self, Write};
use std::time::Duration;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub struct ConsoleReporter<W: WriteColor> {
    out: W,
    error_only: bool,
    live: bool,
}

impl ConsoleReporter<StandardStream> {
    /// Reports to stdout. `ColorChoice::Auto` turns colors off when stdout is not a terminal.
    pub fn stdout(color: ColorChoice) -> Self {
        let color = match color {
            ColorChoice::Auto if !atty::is(atty::Stream::Stdout) => ColorChoice::Never,
            other => other,
        };
        Self::new(StandardStream::stdout(color))
    }
}

impl<W: WriteColor> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            error_only: false,
            live: false,
        }
    }

    /// Hides the blocks of passing cases.
    pub fn error_only(mut self, error_only: bool) -> Self {
        self.error_only = error_only;
        self
    }

    /// Announces each case before it runs.
    pub fn live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn colored(&mut self, text: &str, color: Color) -> io::Result<()> {
        self.out
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(self.out, "{}", text)?;
        self.out.reset()
    }

    fn field(&mut self, label: &str, value: impl std::fmt::Display) -> io::Result<()> {
        self.out.set_color(ColorSpec::new().set_bold(true))?;
        write!(self.out, "  {:<15}", label)?;
        self.out.reset()?;
        writeln!(self.out, " - {}", value)
    }

    fn diff(&mut self, expected: &Value, actual: &Value) -> io::Result<()> {
        let changeset = Changeset::new(&expected.pretty(), &actual.pretty(), "\n");
        writeln!(self.out, "  Diff (-expected +actual):")?;
        for diff in &changeset.diffs {
            let (prefix, color, text) = match diff {
                Difference::Same(x) => (' ', None, x),
                Difference::Rem(x) => ('-', Some(Color::Green), x),
                Difference::Add(x) => ('+', Some(Color::Red), x),
            };
            for line in text.lines() {
                self.out.set_color(ColorSpec::new().set_fg(color))?;
                write!(self.out, "  {}{}", prefix, line)?;
                self.out.reset()?;
                writeln!(self.out)?;
            }
        }
        Ok(())
    }
}

fn inputs_text(case: &CaseRecord) -> String {
    case.inputs
        .as_ref()
        .map_or_else(|| "(none)".to_string(), Value::to_string)
}

fn is_structured(value: &Value) -> bool {
    matches!(value, Value::List(items) if !items.is_empty()) || matches!(value, Value::Map(_))
}

/// Milliseconds below one second, seconds above.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 1.0 {
        format!("{:.3} ms", secs * 1000.0)
    } else {
        format!("{:.3} s", secs)
    }
}

impl<W: WriteColor> Reporter for ConsoleReporter<W> {
    fn case_started(&mut self, case: &CaseRecord) -> io::Result<()> {
        if !self.live {
            return Ok(());
        }
        self.colored("RUN ", Color::Blue)?;
        writeln!(
            self.out,
            " {}  Input - {}  Expected output - {}",
            case.name,
            inputs_text(case),
            case.expected
        )?;
        self.out.flush()
    }

    fn case_finished(&mut self, case: &CaseRecord, outcome: &OutcomeRecord) -> io::Result<()> {
        if self.error_only && outcome.valid {
            return Ok(());
        }

        if outcome.valid {
            self.colored("PASS", Color::Green)?;
        } else {
            self.colored("FAIL", Color::Red)?;
        }
        self.out.set_color(ColorSpec::new().set_bold(true))?;
        write!(self.out, " {}", case.name)?;
        self.out.reset()?;
        writeln!(self.out, "  (Time taken: {})", format_elapsed(outcome.elapsed))?;

        if case.metadata != DEFAULT_METADATA {
            self.field("Metadata", &case.metadata)?;
        }
        self.field("Input", inputs_text(case))?;
        self.field("Expected output", &case.expected)?;
        match (&outcome.actual, &outcome.error) {
            (Some(actual), _) => self.field("Actual output", actual)?,
            (None, Some(error)) => {
                self.field("Actual output", "(raised)")?;
                self.out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                writeln!(self.out, "  Error - {}", error.message)?;
                if let Some(detail) = &error.detail {
                    for line in detail.lines() {
                        writeln!(self.out, "    {}", line)?;
                    }
                }
                self.out.reset()?;
            }
            (None, None) => self.field("Actual output", "(none)")?,
        }

        if let Some(actual) = &outcome.actual {
            if !outcome.valid && (is_structured(actual) || is_structured(&case.expected)) {
                self.diff(&case.expected, actual)?;
            }
        }

        if let Some(printed) = outcome.printed() {
            writeln!(self.out)?;
            self.out.set_color(ColorSpec::new().set_bold(true))?;
            writeln!(self.out, "  Stdout -")?;
            self.out.reset()?;
            for line in printed.lines() {
                writeln!(self.out, "    {}", line)?;
            }
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
        if summary.has_failures() {
            self.colored("FAILURE", Color::Red)?;
        } else {
            self.colored("SUCCESS", Color::Green)?;
        }
        write!(self.out, " | ")?;
        self.colored(&format!("{} passed", summary.passed()), Color::Green)?;
        write!(self.out, " | ")?;
        self.colored(&format!("{} failed", summary.failures), Color::Red)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}
