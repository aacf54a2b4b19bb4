//! svt: declarative fixture-driven validation.
//!
//! Attach input/output fixtures (a TOML, YAML or JSON file, or an inline
//! mapping) to a function or to a method of a type, run the subject against
//! every case and get a pass/fail report.
//!
//! ```rust,no_run
//! use svt::{Callable, Harness};
//!
//! let add: Callable = Callable::typed(|(a, b): (i64, i64)| a + b);
//! Harness::new("fixtures/add.toml").run_function(add)?;
//! # Ok::<(), svt::SvtError>(())
//! ```

pub use crate::errors::{LengthField, SvtError, ValidationError};
pub use crate::fixture::{CaseRecord, FixtureSet, FixtureSource, Format};
pub use crate::harness::{Checked, Harness, Options, TestClass};
pub use crate::runner::{Args, Call, CallResult, Callable, CaseError, OutcomeRecord, RunSummary};
pub use crate::value::Value;

pub mod cli;
pub mod errors;
pub mod fixture;
pub mod harness;
pub mod output;
pub mod report;
pub mod runner;
pub mod value;
