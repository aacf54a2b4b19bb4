//! Error taxonomy for fixture loading, normalization and subject binding.
//!
//! Everything in here is fatal: an `SvtError` means no case was run (or the run
//! was aborted). Failures raised by the subject while a case executes are
//! [`CaseError`](crate::runner::CaseError)s and never surface as `SvtError`.

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which parallel column disagreed with the output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthField {
    InputOutput,
    InitOutput,
    NameOutput,
    MetadataOutput,
}

impl LengthField {
    pub fn as_str(&self) -> &'static str {
        match self {
            LengthField::InputOutput => "input/output",
            LengthField::InitOutput => "init/output",
            LengthField::NameOutput => "name/output",
            LengthField::MetadataOutput => "metadata/output",
        }
    }
}

impl fmt::Display for LengthField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fixture set or a binding violates one of the schema rules.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ValidationError {
    #[error("no output data given or output key is invalid")]
    #[diagnostic(
        code(svt::validation::missing_output),
        help("provide outputs under one of the keys `o`, `out`, `output` or `outputs`")
    )]
    MissingOutputField,

    #[error("{field} data are not of the same length ({found} vs {expected} outputs)")]
    #[diagnostic(code(svt::validation::length_mismatch))]
    LengthMismatch {
        field: LengthField,
        expected: usize,
        found: usize,
    },

    #[error("inputs must be a sequence (case `{case}`)")]
    #[diagnostic(
        code(svt::validation::inputs_not_sequence),
        help("wrap the positional arguments of each case in a list, e.g. `i = [[1, 2]]`")
    )]
    InputsNotSequence { case: String },

    #[error("malformed cases: {0}")]
    #[diagnostic(code(svt::validation::malformed_cases))]
    MalformedCases(String),

    #[error("the harness cannot run instance methods in function mode")]
    #[diagnostic(
        code(svt::validation::receiver_not_allowed),
        help("bind the type with `run_class` and pass the method name instead")
    )]
    ReceiverNotAllowed,

    #[error("method `{method}` does not take a receiver")]
    #[diagnostic(
        code(svt::validation::receiver_required),
        help("run non-instance functions directly with `run_function`")
    )]
    ReceiverRequired { method: String },
}

/// Unified error type for everything that stops a run before or while it executes.
#[derive(Debug, Error, Diagnostic)]
pub enum SvtError {
    #[error("fixture source not found: {}", path.display())]
    #[diagnostic(code(svt::source::not_found))]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fixture source could not be read: {}", path.display())]
    #[diagnostic(code(svt::source::unreadable))]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {format} fixture `{}`: {message}", path.display())]
    #[diagnostic(code(svt::source::malformed))]
    SourceMalformed {
        path: PathBuf,
        format: &'static str,
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
    },

    #[error("unsupported fixture format: {}", path.display())]
    #[diagnostic(
        code(svt::source::unsupported_format),
        help("fixture files must end in .toml, .json, .yaml or .yml")
    )]
    UnsupportedFormat { path: PathBuf },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error("method argument not provided")]
    #[diagnostic(
        code(svt::binding::missing_method),
        help("class mode needs the name of the method to call, see `Options::method`")
    )]
    MissingMethod,

    #[error("method `{method}` not found")]
    #[diagnostic(code(svt::binding::unknown_method))]
    UnknownMethod { method: String },

    #[error("failed to write report")]
    #[diagnostic(code(svt::report::io))]
    Report(#[source] std::io::Error),
}

impl SvtError {
    /// Returns the validation error this wraps, if any.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            SvtError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T, E = SvtError> = std::result::Result<T, E>;
