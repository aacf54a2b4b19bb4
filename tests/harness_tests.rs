mod common;

use common::{add, doc, fixture_path, run_recorded, Scale};
use std::cell::Cell;
use std::rc::Rc;
use svt::report::{ConsoleReporter, NullReporter, Recorder};
use svt::{Callable, Harness, Options, SvtError, ValidationError, Value};
use termcolor::Buffer;

#[test]
fn passing_function_fixture() {
    let harness = Harness::new(doc(r#"{"o": [2, 3], "i": [[1, 1], [1, 2]]}"#));
    let (summary, recorder) = run_recorded(&harness, add()).unwrap();
    assert_eq!(summary.to_string(), "2 passed | 0 failed");
    assert_eq!(recorder.finished.len(), 2);
    assert!(recorder.outcomes().all(|o| o.valid));
}

#[test]
fn failing_case_keeps_actual_and_expected() {
    let harness = Harness::new(fixture_path("fail.toml"));
    let (summary, recorder) = run_recorded(&harness, add()).unwrap();
    assert_eq!(summary.to_string(), "0 passed | 1 failed");
    let (case, outcome) = &recorder.finished[0];
    assert_eq!(case.expected, Value::Int(5));
    assert_eq!(outcome.actual, Some(Value::Int(4)));
    assert!(!outcome.valid);
    assert!(!outcome.errored());
}

#[test]
fn every_fixture_format_runs_the_same() {
    for file in ["add.toml", "add_cases.yaml", "add.json"] {
        let (summary, _) = run_recorded(&Harness::new(fixture_path(file)), add()).unwrap();
        assert_eq!(summary.to_string(), "2 passed | 0 failed", "{file}");
    }
}

#[test]
fn class_mode_builds_a_receiver_per_case() {
    let mut recorder = Recorder::new();
    let summary = Harness::new(fixture_path("scale_class.toml"))
        .method("scale")
        .run_class_with::<Scale, _>(&mut recorder)
        .unwrap();
    assert_eq!(summary.to_string(), "3 passed | 0 failed");
    assert_eq!(recorder.finished[0].0.name, "Scale 1");
}

#[test]
fn receivers_are_not_shared_between_cases() {
    let summary = Harness::new(doc(r#"{"o": [1, 1, 1], "init": [[1, 0], [1, 0], [1, 0]]}"#))
        .method("calls")
        .run_class_with::<Scale, _>(Recorder::new())
        .unwrap();
    assert_eq!(summary.failures, 0);
}

#[test]
fn constructor_failures_fail_only_their_case() {
    let mut recorder = Recorder::new();
    let summary = Harness::new(doc(
        r#"{"cases": [
            {"init": [2, 0], "i": [3], "o": 6},
            {"init": ["two", 0], "i": [3], "o": 6},
            {"init": [1, 1], "i": [3], "o": 4}
        ]}"#,
    ))
    .method("scale")
    .run_class_with::<Scale, _>(&mut recorder)
    .unwrap();
    assert_eq!(summary.failures, 1);
    assert_eq!(summary.errored, 1);
    let error = recorder.finished[1].1.error.as_ref().unwrap();
    assert!(error.message.starts_with("could not construct receiver:"));
}

#[test]
fn missing_output_key_stops_before_any_case() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let spy: Callable = Callable::free(move |_| {
        counter.set(counter.get() + 1);
        Ok(Value::Nil)
    });
    let mut recorder = Recorder::new();
    let err = Harness::new(fixture_path("no_output.toml"))
        .run_function_with(spy, &mut recorder)
        .unwrap_err();
    assert_eq!(err.as_validation(), Some(&ValidationError::MissingOutputField));
    assert_eq!(calls.get(), 0);
    assert!(recorder.started.is_empty());
    assert!(recorder.summary.is_none());
}

#[test]
fn scalar_inputs_stop_the_run_before_any_case() {
    let mut recorder = Recorder::new();
    let err = Harness::new(doc(r#"{"o": [2, 5], "i": [[1, 1], 5]}"#))
        .run_function_with(add(), &mut recorder)
        .unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::InputsNotSequence { case }) if case == "Test case 2"
    ));
    assert!(recorder.started.is_empty());
    assert!(recorder.finished.is_empty());
    assert!(recorder.summary.is_none());
}

#[test]
fn subjects_get_their_own_copy_of_inputs() {
    let harness = Harness::new(doc(
        r#"{"o": [[3, 2, 1], [3, 2, 1]], "i": [[[1, 2, 3]], [[1, 2, 3]]]}"#,
    ));
    let reverse: Callable = Callable::typed(|(mut xs,): (Vec<i64>,)| {
        xs.reverse();
        xs
    });
    let (summary, recorder) = run_recorded(&harness, reverse).unwrap();
    assert_eq!(summary.failures, 0);
    assert_eq!(
        recorder.finished[0].0.inputs,
        Some(Value::from(vec![vec![1, 2, 3]]))
    );
}

#[test]
fn panics_and_errors_count_as_failures() {
    let harness = Harness::new(doc(r#"{"o": [1, 0, 2], "i": [[1], [0], [2]]}"#));
    let picky: Callable = Callable::free(|call| {
        let n: i64 = call.arg(0)?;
        match n {
            0 => Err("zero is not allowed".into()),
            2 => panic!("two is right out"),
            n => Ok(Value::Int(n)),
        }
    });
    let (summary, recorder) = run_recorded(&harness, picky).unwrap();
    assert_eq!(summary.to_string(), "1 passed | 2 failed");
    assert_eq!(summary.errored, 2);
    let messages: Vec<_> = recorder
        .outcomes()
        .filter_map(|o| o.error.as_ref().map(|e| e.message.clone()))
        .collect();
    assert_eq!(messages, ["zero is not allowed", "panicked: two is right out"]);
}

#[test]
fn printed_output_is_captured_per_case() {
    let harness = Harness::new(doc(r#"{"o": [2], "i": [[1, 1]]}"#));
    let chatty: Callable = Callable::free(|call| {
        let (a, b): (i64, i64) = call.unpack()?;
        call.println(format!("adding {} and {}", a, b));
        Ok(Value::Int(a + b))
    });
    let (_, recorder) = run_recorded(&harness, chatty).unwrap();
    assert_eq!(recorder.finished[0].1.printed(), Some("adding 1 and 1"));
}

#[test]
fn pre_and_postprocess_wrap_the_subject() {
    let harness = Harness::new(fixture_path("prepost.toml"))
        .preprocess(|word| {
            let chars: Vec<Value> = word
                .as_str()
                .unwrap_or_default()
                .chars()
                .map(Value::from)
                .collect();
            Value::List(vec![Value::List(chars)])
        })
        .postprocess(|chars| match chars {
            Value::List(items) => Value::String(items.iter().filter_map(Value::as_str).collect()),
            other => other,
        });
    let reverse: Callable = Callable::typed(|(mut chars,): (Vec<char>,)| {
        chars.reverse();
        chars
    });
    let (summary, recorder) = run_recorded(&harness, reverse).unwrap();
    assert_eq!(summary.to_string(), "2 passed | 0 failed");
    assert_eq!(recorder.finished[0].1.actual, Some(Value::from("cba")));
}

#[test]
fn binding_errors() {
    let base = || Harness::new(fixture_path("scale_class.toml"));

    let err = base().run_class_with::<Scale, _>(Recorder::new()).unwrap_err();
    assert!(matches!(err, SvtError::MissingMethod));
    assert_eq!(err.to_string(), "method argument not provided");

    let err = base()
        .method("rotate")
        .run_class_with::<Scale, _>(Recorder::new())
        .unwrap_err();
    assert!(matches!(err, SvtError::UnknownMethod { ref method } if method == "rotate"));

    let err = base()
        .method("version")
        .run_class_with::<Scale, _>(Recorder::new())
        .unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::ReceiverRequired { .. })
    ));
}

#[test]
fn console_report_error_only() {
    let harness =
        Harness::new(doc(r#"{"o": [2, 5], "i": [[1, 1], [2, 2]]}"#)).with_options(Options {
            error_only: true,
            ..Options::default()
        });
    let mut reporter =
        ConsoleReporter::new(Buffer::no_color()).error_only(harness.options().error_only);
    harness.run_function_with(add(), &mut reporter).unwrap();
    let text = String::from_utf8(reporter.into_inner().into_inner()).unwrap();
    assert!(!text.contains("PASS"));
    assert!(text.contains("FAIL Test case 2"));
    assert!(text.contains("Actual output   - 4"));
    assert!(text.ends_with("FAILURE | 1 passed | 1 failed\n"));
}

#[test]
fn console_report_live_display() {
    let harness = Harness::new(doc(r#"{"o": [2], "i": [[1, 1]]}"#));
    let mut reporter = ConsoleReporter::new(Buffer::no_color()).live(true);
    harness.run_function_with(add(), &mut reporter).unwrap();
    let text = String::from_utf8(reporter.into_inner().into_inner()).unwrap();
    let run = text.find("RUN  Test case 1").unwrap();
    let pass = text.find("PASS Test case 1").unwrap();
    assert!(run < pass);
}

#[test]
fn checked_function_still_works_directly() {
    let (summary, _) = run_recorded(&Harness::new(fixture_path("add.toml")), add()).unwrap();
    assert!(!summary.has_failures());
    let mut checked = Harness::new(fixture_path("add.toml"))
        .run_function_with(add(), NullReporter)
        .unwrap();
    assert_eq!(
        checked.call(vec![Value::Int(40), Value::Int(2)]).unwrap(),
        Value::Int(42)
    );
}
