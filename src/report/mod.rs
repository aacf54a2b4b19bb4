//! Result reporting.
//!
//! The harness streams every case through a [`Reporter`]: optionally a
//! `case_started` call before the subject runs (live display), then
//! `case_finished` with the classified outcome, and one `finish` with the
//! totals at the end.

use crate::fixture::{CaseRecord, FixtureSet};
use crate::runner::{OutcomeRecord, RunSummary};
use std::io;

pub mod console;

pub use console::ConsoleReporter;

pub trait Reporter {
    /// Called once before the first case.
    fn begin(&mut self, _fixture: &FixtureSet) -> io::Result<()> {
        Ok(())
    }

    /// Called right before a case executes.
    fn case_started(&mut self, _case: &CaseRecord) -> io::Result<()> {
        Ok(())
    }

    fn case_finished(&mut self, case: &CaseRecord, outcome: &OutcomeRecord) -> io::Result<()>;

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()>;
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn begin(&mut self, fixture: &FixtureSet) -> io::Result<()> {
        (**self).begin(fixture)
    }

    fn case_started(&mut self, case: &CaseRecord) -> io::Result<()> {
        (**self).case_started(case)
    }

    fn case_finished(&mut self, case: &CaseRecord, outcome: &OutcomeRecord) -> io::Result<()> {
        (**self).case_finished(case, outcome)
    }

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
        (**self).finish(summary)
    }
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn case_finished(&mut self, _case: &CaseRecord, _outcome: &OutcomeRecord) -> io::Result<()> {
        Ok(())
    }

    fn finish(&mut self, _summary: &RunSummary) -> io::Result<()> {
        Ok(())
    }
}

/// Keeps every case and outcome for later inspection.
#[derive(Debug, Default)]
pub struct Recorder {
    pub started: Vec<String>,
    pub finished: Vec<(CaseRecord, OutcomeRecord)>,
    pub summary: Option<RunSummary>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &OutcomeRecord> {
        self.finished.iter().map(|(_, outcome)| outcome)
    }
}

impl Reporter for Recorder {
    fn case_started(&mut self, case: &CaseRecord) -> io::Result<()> {
        self.started.push(case.name.clone());
        Ok(())
    }

    fn case_finished(&mut self, case: &CaseRecord, outcome: &OutcomeRecord) -> io::Result<()> {
        self.finished.push((case.clone(), outcome.clone()));
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
        self.summary = Some(*summary);
        Ok(())
    }
}
