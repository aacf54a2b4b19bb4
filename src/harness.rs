//! Binding a subject to a fixture set and running it.
//!
//! # Architecture
//!
//! A [`Harness`] owns one fixture source and its options. Running it
//! 1. loads and normalizes the fixture set,
//! 2. checks the subject can be bound (free function vs. method),
//! 3. executes every case in fixture order, building a fresh receiver per
//!    case in class mode,
//! 4. classifies each result and streams it to the reporter,
//! 5. reports the totals.
//!
//! Schema and binding problems stop the run before any case executes. A case
//! whose subject errors or panics is reported as failed and the run goes on.
//!
//! # Example
//!
//! ```rust,no_run
//! use svt::harness::Harness;
//! use svt::runner::Callable;
//!
//! let add: Callable = Callable::typed(|(a, b): (i64, i64)| a + b);
//! let add = Harness::new("fixtures/add.toml").run_function(add)?;
//! assert!(!add.summary().has_failures());
//! # Ok::<(), svt::SvtError>(())
//! ```

use crate::errors::{Result, SvtError, ValidationError};
use crate::fixture::{CaseRecord, FixtureSet, FixtureSource, Normalizer};
use crate::report::{ConsoleReporter, Reporter};
use crate::runner::executor::contain;
use crate::runner::{
    classify, Aggregator, Args, Callable, CaseError, Execution, Executor, RunSummary,
};
use crate::value::Value;
use log::{debug, info};
use std::ops::{Deref, DerefMut};
use termcolor::ColorChoice;

/// A pure value transform applied to inputs or outputs.
pub type Transform = Box<dyn Fn(Value) -> Value>;

/// A type whose method can be run against a fixture set.
///
/// Every case gets its own receiver built from the case's `init` arguments.
pub trait TestClass: Sized {
    fn construct(init: Args) -> std::result::Result<Self, CaseError>;

    /// Resolves a method by name.
    fn method(name: &str) -> Option<Callable<Self>>;
}

/// Configuration for one harness.
#[derive(Debug, Clone)]
pub struct Options {
    /// Method to run in class mode.
    pub method: Option<String>,
    /// Only show failing cases in the report.
    pub error_only: bool,
    /// Announce each case before it runs.
    pub live_display: bool,
    /// Buffer what subjects print and show it with the case.
    pub capture_stdout: bool,
    pub color: ColorChoice,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            method: None,
            error_only: false,
            live_display: false,
            capture_stdout: true,
            color: ColorChoice::Auto,
        }
    }
}

/// A subject that went through the harness. Dereferences to the subject, so
/// calling it directly behaves exactly as before.
#[derive(Debug)]
pub struct Checked<S> {
    subject: S,
    summary: RunSummary,
}

impl<S> Checked<S> {
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn into_inner(self) -> S {
        self.subject
    }
}

impl<S> Deref for Checked<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.subject
    }
}

impl<S> DerefMut for Checked<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.subject
    }
}

pub struct Harness {
    source: FixtureSource,
    options: Options,
    preprocess: Option<Transform>,
    postprocess: Option<Transform>,
}

impl Harness {
    pub fn new(source: impl Into<FixtureSource>) -> Self {
        Self {
            source: source.into(),
            options: Options::default(),
            preprocess: None,
            postprocess: None,
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.options.method = Some(name.into());
        self
    }

    pub fn error_only(mut self, error_only: bool) -> Self {
        self.options.error_only = error_only;
        self
    }

    pub fn live_display(mut self, live: bool) -> Self {
        self.options.live_display = live;
        self
    }

    pub fn capture_stdout(mut self, capture: bool) -> Self {
        self.options.capture_stdout = capture;
        self
    }

    pub fn color(mut self, color: ColorChoice) -> Self {
        self.options.color = color;
        self
    }

    /// Transforms each case's inputs before they are stored.
    pub fn preprocess(mut self, f: impl Fn(Value) -> Value + 'static) -> Self {
        self.preprocess = Some(Box::new(f));
        self
    }

    /// Transforms each returned value before it is compared.
    pub fn postprocess(mut self, f: impl Fn(Value) -> Value + 'static) -> Self {
        self.postprocess = Some(Box::new(f));
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Loads and normalizes the fixture set.
    pub fn fixture(&self) -> Result<FixtureSet> {
        let raw = self.source.load()?;
        let normalizer = match self.preprocess.as_deref() {
            Some(f) => Normalizer::new().with_preprocess(f),
            None => Normalizer::new(),
        };
        normalizer.normalize(&raw)
    }

    fn console(&self) -> ConsoleReporter<termcolor::StandardStream> {
        ConsoleReporter::stdout(self.options.color)
            .error_only(self.options.error_only)
            .live(self.options.live_display)
    }

    /// Runs a free function against every case, reporting to the console.
    pub fn run_function<T>(&self, callable: Callable<T>) -> Result<Checked<Callable<T>>> {
        self.run_function_with(callable, self.console())
    }

    pub fn run_function_with<T, R: Reporter>(
        &self,
        mut callable: Callable<T>,
        mut reporter: R,
    ) -> Result<Checked<Callable<T>>> {
        let fixture = self.fixture()?;
        if callable.expects_receiver() {
            return Err(ValidationError::ReceiverNotAllowed.into());
        }
        let summary = self.drive(&fixture, &mut callable, &mut reporter, |_| Ok(None))?;
        Ok(Checked {
            subject: callable,
            summary,
        })
    }

    /// Runs `T`'s configured method against every case, reporting to the console.
    pub fn run_class<T: TestClass>(&self) -> Result<RunSummary> {
        self.run_class_with::<T, _>(self.console())
    }

    pub fn run_class_with<T: TestClass, R: Reporter>(&self, mut reporter: R) -> Result<RunSummary> {
        let fixture = self.fixture()?;
        let name = self.options.method.as_deref().ok_or(SvtError::MissingMethod)?;
        let mut method = T::method(name).ok_or_else(|| SvtError::UnknownMethod {
            method: name.to_string(),
        })?;
        if !method.expects_receiver() {
            return Err(ValidationError::ReceiverRequired {
                method: name.to_string(),
            }
            .into());
        }
        debug!("binding method `{}`", name);
        self.drive(&fixture, &mut method, &mut reporter, |case| {
            T::construct(Args::new(case.init.clone())).map(Some)
        })
    }

    /// Executes, classifies and reports every case in fixture order.
    fn drive<T, R: Reporter>(
        &self,
        fixture: &FixtureSet,
        callable: &mut Callable<T>,
        reporter: &mut R,
        mut receiver_for: impl FnMut(&CaseRecord) -> std::result::Result<Option<T>, CaseError>,
    ) -> Result<RunSummary> {
        let executor = Executor::new(self.options.capture_stdout);
        let postprocess = self.postprocess.as_deref();
        let mut tally = Aggregator::new();

        reporter.begin(fixture).map_err(SvtError::Report)?;
        for case in fixture {
            reporter.case_started(case).map_err(SvtError::Report)?;
            let execution = match contain(|| receiver_for(case)) {
                Ok(mut receiver) => executor.execute(case, callable, receiver.as_mut())?,
                Err(e) => Execution::failed(CaseError {
                    message: format!("could not construct receiver: {}", e.message),
                    detail: e.detail,
                }),
            };
            let outcome = classify(&case.expected, execution, postprocess);
            tally.record(&outcome);
            reporter
                .case_finished(case, &outcome)
                .map_err(SvtError::Report)?;
        }

        let summary = tally.summary();
        reporter.finish(&summary).map_err(SvtError::Report)?;
        info!(
            "{}: {} ({:.1}% passed)",
            self.source.describe(),
            summary,
            summary.success_rate()
        );
        Ok(summary)
    }
}
