//! Shared helpers for the svt integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use svt::report::Recorder;
use svt::{Args, CaseError, Callable, Harness, RunSummary, SvtError, TestClass, Value};

/// Path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Decodes an inline JSON document into a raw fixture tree.
pub fn doc(json: &str) -> Value {
    serde_json::from_str(json).unwrap()
}

pub fn add() -> Callable {
    Callable::typed(|(a, b): (i64, i64)| a + b)
}

/// Runs a free function and returns the summary along with everything reported.
pub fn run_recorded(
    harness: &Harness,
    callable: Callable,
) -> Result<(RunSummary, Recorder), SvtError> {
    let mut recorder = Recorder::new();
    let checked = harness.run_function_with(callable, &mut recorder)?;
    Ok((*checked.summary(), recorder))
}

/// `scale(x) = factor * x + offset`, built from `init = [factor, offset]`.
#[derive(Debug)]
pub struct Scale {
    pub factor: i64,
    pub offset: i64,
    pub calls: usize,
}

impl TestClass for Scale {
    fn construct(init: Args) -> Result<Self, CaseError> {
        let (factor, offset): (i64, i64) = init.unpack()?;
        Ok(Scale {
            factor,
            offset,
            calls: 0,
        })
    }

    fn method(name: &str) -> Option<Callable<Self>> {
        match name {
            "scale" => Some(Callable::typed_method(|s: &mut Scale, (x,): (i64,)| {
                s.factor * x + s.offset
            })),
            "calls" => Some(Callable::typed_method(|s: &mut Scale, (): ()| {
                s.calls += 1;
                s.calls
            })),
            "version" => Some(Callable::free(|_| Ok(Value::from("1.0")))),
            _ => None,
        }
    }
}
