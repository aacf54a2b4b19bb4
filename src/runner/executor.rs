//! Runs one case against a subject.

use super::call::{Args, Call, CallResult, Callable, CaseError};
use crate::errors::{Result, ValidationError};
use crate::fixture::CaseRecord;
use crate::output::{OutputBuffer, OutputSink, StdoutSink};
use crate::value::Value;
use log::{debug, warn};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// What came out of one invocation, before classification.
#[derive(Debug, Clone)]
pub struct Execution {
    pub result: CallResult,
    /// Captured output; `None` when capture is off.
    pub stdout: Option<String>,
    pub elapsed: Duration,
}

impl Execution {
    /// An execution that never reached the subject, e.g. because the
    /// receiver could not be constructed.
    pub fn failed(error: CaseError) -> Self {
        Self {
            result: Err(error),
            stdout: None,
            elapsed: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Executor {
    capture_stdout: bool,
}

impl Default for Executor {
    fn default() -> Self {
        Self {
            capture_stdout: true,
        }
    }
}

impl Executor {
    pub fn new(capture_stdout: bool) -> Self {
        Self { capture_stdout }
    }

    /// Positional arguments for `case`: a fresh copy of its inputs.
    ///
    /// Fails when the inputs are present but not a sequence.
    pub fn arguments(case: &CaseRecord) -> Result<Args> {
        match &case.inputs {
            None => Ok(Args::default()),
            Some(Value::List(items)) => Ok(Args::new(items.clone())),
            Some(_) => Err(ValidationError::InputsNotSequence {
                case: case.name.clone(),
            }
            .into()),
        }
    }

    /// Invokes `callable` for `case`.
    ///
    /// Errors and panics raised by the subject are contained in the returned
    /// [`Execution`]; only schema problems with the case itself are returned
    /// as `Err`.
    pub fn execute<T>(
        &self,
        case: &CaseRecord,
        callable: &mut Callable<T>,
        receiver: Option<&mut T>,
    ) -> Result<Execution> {
        let args = Self::arguments(case)?;
        debug!("executing {} with {} argument(s)", case.name, args.len());

        let mut buffer = OutputBuffer::new();
        let mut passthrough = StdoutSink;
        let sink: &mut dyn OutputSink = if self.capture_stdout {
            &mut buffer
        } else {
            &mut passthrough
        };

        let mut call = Call::new(args, sink);
        let start = Instant::now();
        let result = contain(|| callable.invoke(receiver, &mut call));
        let elapsed = start.elapsed();
        drop(call);

        if let Err(e) = &result {
            warn!("{} raised: {}", case.name, e.message);
        }
        Ok(Execution {
            result,
            stdout: self.capture_stdout.then(|| buffer.into_string()),
            elapsed,
        })
    }
}

/// Runs `f`, turning a panic into a [`CaseError`].
pub fn contain<R>(
    f: impl FnOnce() -> std::result::Result<R, CaseError>,
) -> std::result::Result<R, CaseError> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(CaseError::new(format!("panicked: {}", panic_message(&*payload)))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
