//! Fixture sets: loading, key aliases and normalization into ordered cases.

use crate::value::Value;
use serde::Serialize;

pub mod aliases;
pub mod normalize;
pub mod source;

pub use aliases::Field;
pub use normalize::{normalize, Normalizer};
pub use source::{FixtureSource, Format};

pub const DEFAULT_NAME: &str = "Test case";
pub const DEFAULT_METADATA: &str = "No metadata";

/// One normalized test case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseRecord {
    /// 1-based position in the fixture set.
    pub ordinal: usize,
    /// Display label, always `"{name} {ordinal}"`.
    pub name: String,
    /// Positional arguments; `None` means the subject is called without any.
    pub inputs: Option<Value>,
    pub expected: Value,
    pub metadata: String,
    /// Constructor arguments, only used when running a type's method.
    pub init: Vec<Value>,
}

/// The ordered, validated cases of one fixture source.
///
/// Built once by the [`Normalizer`] and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureSet {
    cases: Vec<CaseRecord>,
}

impl FixtureSet {
    pub(crate) fn new(cases: Vec<CaseRecord>) -> Self {
        Self { cases }
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn cases(&self) -> &[CaseRecord] {
        &self.cases
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CaseRecord> {
        self.cases.iter()
    }
}

impl<'a> IntoIterator for &'a FixtureSet {
    type Item = &'a CaseRecord;
    type IntoIter = std::slice::Iter<'a, CaseRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}
