//! Outcome classification and run tallies.

use super::call::CaseError;
use super::executor::Execution;
use crate::value::{structurally_equal, Value};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// The classified result of one case.
#[derive(Debug, Clone)]
pub struct OutcomeRecord {
    /// The (post-processed) value the subject returned, if it returned at all.
    pub actual: Option<Value>,
    /// The error or panic raised instead of returning.
    pub error: Option<CaseError>,
    pub stdout: Option<String>,
    pub valid: bool,
    pub elapsed: Duration,
}

impl OutcomeRecord {
    pub fn errored(&self) -> bool {
        self.error.is_some()
    }

    /// Captured output with surrounding whitespace removed, if any was printed.
    pub fn printed(&self) -> Option<&str> {
        self.stdout
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Compares an execution against the expected value.
///
/// `postprocess` is applied to the returned value before the comparison. A
/// subject that raised is never valid.
pub fn classify(
    expected: &Value,
    execution: Execution,
    postprocess: Option<&dyn Fn(Value) -> Value>,
) -> OutcomeRecord {
    let Execution {
        result,
        stdout,
        elapsed,
    } = execution;

    let (actual, error) = match result {
        Ok(value) => match postprocess {
            Some(f) => (Some(f(value)), None),
            None => (Some(value), None),
        },
        Err(e) => (None, Some(e)),
    };
    let valid = actual
        .as_ref()
        .is_some_and(|actual| structurally_equal(actual, expected));

    OutcomeRecord {
        actual,
        error,
        stdout,
        valid,
        elapsed,
    }
}

/// Totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    /// Cases that did not produce the expected value, errored ones included.
    pub failures: usize,
    /// Cases whose subject raised or panicked.
    pub errored: usize,
}

impl RunSummary {
    pub fn passed(&self) -> usize {
        self.total - self.failures
    }

    pub fn has_failures(&self) -> bool {
        self.failures > 0
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.passed() as f64 / self.total as f64) * 100.0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} passed | {} failed", self.passed(), self.failures)
    }
}

/// Running tally kept while cases stream through.
#[derive(Debug, Default)]
pub struct Aggregator {
    summary: RunSummary,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &OutcomeRecord) {
        self.summary.total += 1;
        if !outcome.valid {
            self.summary.failures += 1;
        }
        if outcome.errored() {
            self.summary.errored += 1;
        }
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }
}
