//! Fixture normalization.
//!
//! A fixture document comes in one of two shapes:
//!
//! ```toml
//! # column shape: parallel sequences aligned by position
//! name = ["Normal case", "Edge case"]
//! i = [[1, 2], [2, 3]]
//! o = [3, 5]
//!
//! # case-list shape: one table per case
//! [[cases]]
//! i = [1, 2]
//! o = 3
//! ```
//!
//! Both are reduced to the same [`FixtureSet`]. `name`, `metadata` and `init`
//! may be a scalar (broadcast to every case) or a sequence with one entry per
//! output; missing ones fall back to defaults.

use super::aliases::Field;
use super::{CaseRecord, FixtureSet, DEFAULT_METADATA, DEFAULT_NAME};
use crate::errors::{LengthField, Result, SvtError, ValidationError};
use crate::value::Value;
use im::HashMap;
use log::{debug, trace};

/// Top-level key holding the case-list shape.
pub const CASES_KEY: &str = "cases";

/// Converts raw fixture trees into [`FixtureSet`]s.
#[derive(Default)]
pub struct Normalizer<'a> {
    preprocess: Option<&'a dyn Fn(Value) -> Value>,
}

/// Per-field columns, all of equal length once built.
struct Columns {
    outputs: Vec<Value>,
    inputs: Vec<Option<Value>>,
    names: Vec<Value>,
    metadata: Vec<Value>,
    init: Vec<Value>,
}

impl<'a> Normalizer<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `f` to every case's inputs before they are stored.
    pub fn with_preprocess(mut self, f: &'a dyn Fn(Value) -> Value) -> Self {
        self.preprocess = Some(f);
        self
    }

    pub fn normalize(&self, raw: &Value) -> Result<FixtureSet> {
        let Value::Map(map) = raw else {
            return Err(ValidationError::MalformedCases(format!(
                "fixture document must be a mapping, found {}",
                raw.type_name()
            ))
            .into());
        };

        let columns = match map.get(CASES_KEY) {
            Some(cases) => {
                debug!("normalizing case-list fixture");
                from_case_list(cases)?
            }
            None => {
                debug!("normalizing column fixture");
                from_columns(map)?
            }
        };
        self.build(columns)
    }

    fn build(&self, columns: Columns) -> Result<FixtureSet> {
        let Columns {
            outputs,
            inputs,
            names,
            metadata,
            init,
        } = columns;

        let cases = outputs
            .into_iter()
            .zip(inputs)
            .zip(names)
            .zip(metadata)
            .zip(init)
            .enumerate()
            .map(|(index, ((((expected, inputs), name), metadata), init))| {
                let ordinal = index + 1;
                let name = format!("{} {}", text_of(&name), ordinal);
                let inputs = match (inputs, self.preprocess) {
                    (Some(raw), Some(f)) => Some(f(raw)),
                    (inputs, _) => inputs,
                };
                if matches!(&inputs, Some(v) if !v.is_list()) {
                    return Err(SvtError::from(ValidationError::InputsNotSequence {
                        case: name,
                    }));
                }
                let case = CaseRecord {
                    ordinal,
                    name,
                    inputs,
                    expected,
                    metadata: text_of(&metadata),
                    init: init_args(init),
                };
                trace!("case {}: {:?}", ordinal, case);
                Ok(case)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("normalized {} cases", cases.len());
        Ok(FixtureSet::new(cases))
    }
}

/// Normalizes `raw` without any input preprocessing.
pub fn normalize(raw: &Value) -> Result<FixtureSet> {
    Normalizer::new().normalize(raw)
}

// ============================================================================
// SHAPES
// ============================================================================

fn from_columns(map: &HashMap<String, Value>) -> Result<Columns> {
    let outputs = match Field::Output.lookup(map) {
        None => return Err(ValidationError::MissingOutputField.into()),
        Some((_, Value::List(items))) => items.clone(),
        Some((alias, other)) => {
            return Err(not_a_sequence(alias, other).into());
        }
    };
    if outputs.is_empty() {
        return Err(ValidationError::MissingOutputField.into());
    }
    let n = outputs.len();

    let inputs = match Field::Input.lookup(map) {
        None => vec![None; n],
        Some((_, Value::List(items))) if items.is_empty() => vec![None; n],
        Some((_, Value::List(items))) => {
            check_len(LengthField::InputOutput, n, items.len())?;
            items.iter().cloned().map(Some).collect()
        }
        Some((alias, other)) => return Err(not_a_sequence(alias, other).into()),
    };

    Ok(Columns {
        outputs,
        inputs,
        names: broadcast(map, Field::Name, LengthField::NameOutput, n, DEFAULT_NAME.into())?,
        metadata: broadcast(
            map,
            Field::Metadata,
            LengthField::MetadataOutput,
            n,
            DEFAULT_METADATA.into(),
        )?,
        init: broadcast(map, Field::Init, LengthField::InitOutput, n, Value::List(vec![]))?,
    })
}

fn from_case_list(cases: &Value) -> Result<Columns> {
    let Value::List(entries) = cases else {
        return Err(not_a_sequence(CASES_KEY, cases).into());
    };
    if entries.is_empty() {
        return Err(ValidationError::MissingOutputField.into());
    }

    let mut columns = Columns {
        outputs: Vec::with_capacity(entries.len()),
        inputs: Vec::with_capacity(entries.len()),
        names: Vec::with_capacity(entries.len()),
        metadata: Vec::with_capacity(entries.len()),
        init: Vec::with_capacity(entries.len()),
    };

    for (index, entry) in entries.iter().enumerate() {
        let Value::Map(case) = entry else {
            return Err(ValidationError::MalformedCases(format!(
                "case {} must be a mapping, found {}",
                index + 1,
                entry.type_name()
            ))
            .into());
        };
        let (_, output) = Field::Output
            .lookup(case)
            .ok_or(ValidationError::MissingOutputField)?;

        columns.outputs.push(output.clone());
        columns
            .inputs
            .push(Field::Input.lookup(case).map(|(_, v)| v.clone()));
        columns.names.push(field_or(case, Field::Name, DEFAULT_NAME.into()));
        columns
            .metadata
            .push(field_or(case, Field::Metadata, DEFAULT_METADATA.into()));
        columns.init.push(field_or(case, Field::Init, Value::List(vec![])));
    }
    Ok(columns)
}

// ============================================================================
// HELPERS
// ============================================================================

fn field_or(map: &HashMap<String, Value>, field: Field, default: Value) -> Value {
    field
        .lookup(map)
        .map_or(default, |(_, value)| value.clone())
}

/// Expands a scalar-or-sequence column to exactly `n` entries.
fn broadcast(
    map: &HashMap<String, Value>,
    field: Field,
    length_field: LengthField,
    n: usize,
    default: Value,
) -> Result<Vec<Value>> {
    match field.lookup(map).map(|(_, value)| value) {
        None => Ok(vec![default; n]),
        Some(Value::List(items)) if items.is_empty() => Ok(vec![default; n]),
        Some(Value::List(items)) => {
            check_len(length_field, n, items.len())?;
            Ok(items.clone())
        }
        Some(scalar) => Ok(vec![scalar.clone(); n]),
    }
}

fn check_len(field: LengthField, expected: usize, found: usize) -> Result<(), ValidationError> {
    if expected == found {
        Ok(())
    } else {
        Err(ValidationError::LengthMismatch {
            field,
            expected,
            found,
        })
    }
}

fn not_a_sequence(key: &str, found: &Value) -> ValidationError {
    ValidationError::MalformedCases(format!(
        "`{}` must be a sequence, found {}",
        key,
        found.type_name()
    ))
}

/// Free text for names and metadata; strings are taken verbatim.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Constructor arguments: a list is spread, a scalar is a single argument.
fn init_args(value: Value) -> Vec<Value> {
    match value {
        Value::List(items) => items,
        Value::Nil => vec![],
        scalar => vec![scalar],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SvtError;

    fn doc(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    fn validation(err: SvtError) -> ValidationError {
        err.as_validation().cloned().expect("validation error")
    }

    #[test]
    fn column_shape_defaults() {
        let set = normalize(&doc(r#"{"o": [2, 3], "i": [[1, 1], [1, 2]]}"#)).unwrap();
        assert_eq!(set.len(), 2);
        let first = &set.cases()[0];
        assert_eq!(first.name, "Test case 1");
        assert_eq!(first.metadata, "No metadata");
        assert_eq!(first.inputs, Some(Value::from(vec![1, 1])));
        assert_eq!(first.expected, Value::Int(2));
        assert!(first.init.is_empty());
        assert_eq!(set.cases()[1].name, "Test case 2");
    }

    #[test]
    fn scalars_broadcast_and_names_get_ordinals() {
        let set = normalize(&doc(
            r#"{"o": [1, 2, 3], "name": "Sum", "metadata": "basic", "init": 4}"#,
        ))
        .unwrap();
        let names: Vec<_> = set.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Sum 1", "Sum 2", "Sum 3"]);
        assert!(set.iter().all(|c| c.metadata == "basic"));
        assert!(set.iter().all(|c| c.init == vec![Value::Int(4)]));
        assert!(set.iter().all(|c| c.inputs.is_none()));
    }

    #[test]
    fn sequence_columns_must_match_outputs() {
        let cases = [
            (r#"{"o": [1, 2], "i": [[1]]}"#, LengthField::InputOutput),
            (r#"{"o": [1, 2], "init": [[1], [2], [3]]}"#, LengthField::InitOutput),
            (r#"{"o": [1, 2], "name": ["a", "b", "c"]}"#, LengthField::NameOutput),
            (r#"{"o": [1], "metadata": ["a", "b"]}"#, LengthField::MetadataOutput),
        ];
        for (json, expected_field) in cases {
            match validation(normalize(&doc(json)).unwrap_err()) {
                ValidationError::LengthMismatch { field, .. } => assert_eq!(field, expected_field),
                other => panic!("{json}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn missing_or_empty_outputs_are_fatal() {
        for json in [
            r#"{"i": [[1]]}"#,
            r#"{"o": []}"#,
            r#"{"cases": []}"#,
            r#"{"cases": [{"i": [1]}]}"#,
        ] {
            assert_eq!(
                validation(normalize(&doc(json)).unwrap_err()),
                ValidationError::MissingOutputField,
                "{json}"
            );
        }
    }

    #[test]
    fn case_list_entries_are_independent() {
        let set = normalize(&doc(
            r#"{"cases": [
                {"i": [1, 1], "o": 2, "name": "Pair"},
                {"output": 7, "metadata": "no inputs", "init": [3]}
            ]}"#,
        ))
        .unwrap();
        assert_eq!(set.cases()[0].name, "Pair 1");
        assert_eq!(set.cases()[1].name, "Test case 2");
        assert_eq!(set.cases()[1].inputs, None);
        assert_eq!(set.cases()[1].metadata, "no inputs");
        assert_eq!(set.cases()[1].init, vec![Value::Int(3)]);
    }

    #[test]
    fn preprocess_runs_on_present_inputs_only() {
        let wrap = |v: Value| Value::List(vec![v]);
        let set = Normalizer::new()
            .with_preprocess(&wrap)
            .normalize(&doc(r#"{"cases": [{"i": "ab", "o": 1}, {"o": 2}]}"#))
            .unwrap();
        assert_eq!(set.cases()[0].inputs, Some(Value::from(vec!["ab"])));
        assert_eq!(set.cases()[1].inputs, None);
    }

    #[test]
    fn inputs_must_be_sequences_after_preprocessing() {
        let err = validation(normalize(&doc(r#"{"o": [2, 5], "i": [[1, 1], 5]}"#)).unwrap_err());
        assert_eq!(
            err,
            ValidationError::InputsNotSequence {
                case: "Test case 2".to_string()
            }
        );

        let first = |v: Value| {
            v.into_list()
                .and_then(|items| items.into_iter().next())
                .unwrap_or_default()
        };
        let err = Normalizer::new()
            .with_preprocess(&first)
            .normalize(&doc(r#"{"o": [1], "i": [[7]]}"#))
            .unwrap_err();
        assert!(matches!(validation(err), ValidationError::InputsNotSequence { .. }));
    }

    #[test]
    fn non_mapping_documents_are_rejected() {
        let err = validation(normalize(&Value::from(vec![1])).unwrap_err());
        assert!(matches!(err, ValidationError::MalformedCases(_)));
        let err = validation(normalize(&doc(r#"{"cases": [1]}"#)).unwrap_err());
        assert!(matches!(err, ValidationError::MalformedCases(_)));
    }
}
