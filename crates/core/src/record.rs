//! Trace records: one row per evaluated node, consumed by report composition.

use serde::{Deserialize, Serialize};

use crate::failure::Failure;
use crate::outcome::{Outcome, State};
use crate::value::Value;

/// What produced a trace record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Leaf,
    Conjunction,
    Disjunction,
    Negation,
    Function,
    /// Mapper stage of a transformation.
    Transform,
    /// Checker stage of a transformation.
    Check,
    Quantifier,
    Curried,
}

impl RecordKind {
    /// Boolean records know their expected output before evaluating.
    pub fn is_boolean(self) -> bool {
        !matches!(self, RecordKind::Function | RecordKind::Transform)
    }

    /// Transform and check records may absorb their first child row.
    pub fn is_squashable(self) -> bool {
        matches!(self, RecordKind::Transform | RecordKind::Check)
    }
}

/// An input or output cell of a trace record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordValue {
    Value(Value),
    Thrown(Failure),
    Skipped,
    /// Expected side of a value-producing record that failed.
    NoFailure,
}

impl RecordValue {
    pub fn from_input(input: Option<&Value>) -> Self {
        match input {
            Some(value) => RecordValue::Value(value.clone()),
            None => RecordValue::Skipped,
        }
    }

    pub fn from_outcome(outcome: &Outcome<Value>) -> Self {
        match outcome.state() {
            State::Returned(value) => RecordValue::Value(value.clone()),
            State::ExceptionThrown(failure) => RecordValue::Thrown(failure.clone()),
            State::Skipped => RecordValue::Skipped,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            RecordValue::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn summarize(&self, max_len: usize) -> String {
        match self {
            RecordValue::Value(value) => value.summarize(max_len),
            RecordValue::Thrown(failure) => failure.kind.clone(),
            RecordValue::Skipped => "(not evaluated)".to_string(),
            RecordValue::NoFailure => "(no failure)".to_string(),
        }
    }
}

/// Expected/actual long-form explanation attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    pub expected: String,
    pub actual: String,
}

impl Detail {
    pub fn new(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Detail {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Explains a check or function that failed on `input`.
    pub fn for_failure(input: &Value, failure: &Failure) -> Self {
        let head = format!("Input: {}\nInput Type: {}", input, input.type_name());
        Detail {
            expected: format!("{}\nNo failure", head),
            actual: format!("{}\n{}", head, failure.excerpt()),
        }
    }
}

/// One finalized row describing a single node's evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub form_name: String,
    pub nesting_level: usize,
    pub kind: RecordKind,
    /// A function record followed by its tail.
    pub continued: bool,
    pub input_for_expected: RecordValue,
    pub input_for_actual: RecordValue,
    pub output_for_expected: RecordValue,
    pub output_for_actual: RecordValue,
    pub detail_expected: Option<String>,
    pub detail_actual: Option<String>,
    pub requires_explanation: bool,
    pub squashable: bool,
    pub ignored: bool,
}

impl TraceRecord {
    /// Whether the actual output differs from what was expected.
    pub fn is_mismatch(&self) -> bool {
        self.output_for_expected != self.output_for_actual
    }
}

/// The ordered, finalized records of one top-level evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    records: Vec<TraceRecord>,
}

impl Trace {
    pub fn new(records: Vec<TraceRecord>) -> Self {
        Trace { records }
    }

    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TraceRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceRecord> {
        self.records.iter()
    }

    /// Looks up the first record with the given form name.
    pub fn find(&self, form_name: &str) -> Option<&TraceRecord> {
        self.records.iter().find(|r| r.form_name == form_name)
    }

    /// The records as a JSON array. Records are plain data, so this cannot
    /// fail.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self.records)
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a TraceRecord;
    type IntoIter = std::slice::Iter<'a, TraceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_value_rendering() {
        assert_eq!(RecordValue::Skipped.summarize(80), "(not evaluated)");
        assert_eq!(RecordValue::NoFailure.summarize(80), "(no failure)");
        let thrown = RecordValue::Thrown(Failure::new("ParseIntError", "bad"));
        assert_eq!(thrown.summarize(80), "ParseIntError");
        assert_eq!(RecordValue::Value(Value::Int(16)).summarize(80), "16");
    }

    #[test]
    fn failure_detail_mentions_input_and_exception() {
        let d = Detail::for_failure(
            &Value::text("abc"),
            &Failure::new("ParseIntError", "invalid digit found in string"),
        );
        assert!(d.expected.starts_with("Input: \"abc\"\nInput Type: Text"));
        assert!(d.actual.contains("Exception Thrown: ParseIntError"));
        assert!(d.actual.contains("Exception Message: invalid digit found in string"));
    }

    #[test]
    fn boolean_and_squashable_kinds() {
        assert!(RecordKind::Leaf.is_boolean());
        assert!(RecordKind::Check.is_boolean());
        assert!(!RecordKind::Function.is_boolean());
        assert!(!RecordKind::Transform.is_boolean());
        assert!(RecordKind::Transform.is_squashable());
        assert!(!RecordKind::Leaf.is_squashable());
    }
}
