//! Case execution: calling subjects, containing their failures and
//! classifying what they return.

pub mod call;
pub mod executor;
pub mod outcome;

pub use call::{Args, Call, CallResult, Callable, CaseError, FromArgs};
pub use executor::{Execution, Executor};
pub use outcome::{classify, Aggregator, OutcomeRecord, RunSummary};
