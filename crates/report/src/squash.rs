//! Squashing: merging a transform or check row with the single child row
//! that carries its real content, so `transform` + `length` reads as one
//! `transform:length` line.

use pcond_core::{RecordKind, TraceRecord};

/// Merges each squashable record with its immediate successor when the
/// successor's kind is one it may absorb. Merged records are never
/// squashable again, which makes the pass idempotent.
pub fn squash(records: &[TraceRecord]) -> Vec<TraceRecord> {
    let mut out = Vec::with_capacity(records.len());
    let mut iter = records.iter().peekable();
    while let Some(record) = iter.next() {
        match iter.peek() {
            Some(next) if absorbs(record, next) => {
                out.push(merge(record, next));
                iter.next();
            }
            _ => out.push(record.clone()),
        }
    }
    out
}

/// Whether `pred` may swallow `succ`, which must be its direct child.
pub fn absorbs(pred: &TraceRecord, succ: &TraceRecord) -> bool {
    if !pred.squashable || succ.nesting_level != pred.nesting_level + 1 {
        return false;
    }
    match pred.kind {
        RecordKind::Transform => succ.kind == RecordKind::Function && !succ.continued,
        RecordKind::Check => matches!(
            succ.kind,
            RecordKind::Leaf
                | RecordKind::Negation
                | RecordKind::Conjunction
                | RecordKind::Disjunction
                | RecordKind::Transform
        ),
        _ => false,
    }
}

fn merge(first: &TraceRecord, last: &TraceRecord) -> TraceRecord {
    // Details travel as a pair, from whichever record has them.
    let explained = if last.requires_explanation { last } else { first };
    TraceRecord {
        form_name: format!("{}:{}", first.form_name, last.form_name),
        nesting_level: first.nesting_level,
        kind: first.kind,
        continued: first.continued,
        input_for_expected: first.input_for_expected.clone(),
        input_for_actual: first.input_for_actual.clone(),
        output_for_expected: last.output_for_expected.clone(),
        output_for_actual: last.output_for_actual.clone(),
        detail_expected: explained.detail_expected.clone(),
        detail_actual: explained.detail_actual.clone(),
        requires_explanation: first.requires_explanation || last.requires_explanation,
        squashable: false,
        ignored: first.ignored && last.ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcond_core::{RecordValue, Value};

    fn record(kind: RecordKind, name: &str, level: usize) -> TraceRecord {
        TraceRecord {
            form_name: name.to_string(),
            nesting_level: level,
            kind,
            continued: false,
            input_for_expected: RecordValue::Value(Value::Int(level as i64)),
            input_for_actual: RecordValue::Value(Value::Int(level as i64)),
            output_for_expected: RecordValue::Value(Value::Bool(true)),
            output_for_actual: RecordValue::Value(Value::Bool(true)),
            detail_expected: None,
            detail_actual: None,
            requires_explanation: false,
            squashable: kind.is_squashable(),
            ignored: false,
        }
    }

    fn names(records: &[TraceRecord]) -> Vec<&str> {
        records.iter().map(|r| r.form_name.as_str()).collect()
    }

    #[test]
    fn transform_absorbs_tailless_function() {
        let squashed = squash(&[
            record(RecordKind::Transform, "transform", 0),
            record(RecordKind::Function, "length", 1),
            record(RecordKind::Check, "check", 0),
            record(RecordKind::Conjunction, "allOf", 1),
            record(RecordKind::Leaf, "isNotNull", 2),
        ]);
        assert_eq!(names(&squashed), vec!["transform:length", "check:allOf", "isNotNull"]);
        assert_eq!(squashed[1].nesting_level, 0);
        assert!(!squashed[0].squashable);
    }

    #[test]
    fn transform_keeps_continued_function() {
        let mut head = record(RecordKind::Function, "trim", 1);
        head.continued = true;
        let squashed = squash(&[record(RecordKind::Transform, "transform", 0), head]);
        assert_eq!(names(&squashed), vec!["transform", "trim"]);
    }

    #[test]
    fn only_direct_children_are_absorbed() {
        let squashed = squash(&[
            record(RecordKind::Check, "check", 0),
            record(RecordKind::Leaf, "isNull", 0),
        ]);
        assert_eq!(squashed.len(), 2);
    }

    #[test]
    fn merged_record_keeps_first_input_and_last_output() {
        let first = record(RecordKind::Check, "check", 0);
        let mut last = record(RecordKind::Leaf, "isNull", 1);
        last.output_for_actual = RecordValue::Value(Value::Bool(false));
        last.requires_explanation = true;
        last.detail_expected = Some("e".to_string());
        last.detail_actual = Some("a".to_string());

        let squashed = squash(&[first, last]);
        let merged = &squashed[0];
        assert_eq!(merged.input_for_actual, RecordValue::Value(Value::Int(0)));
        assert_eq!(merged.output_for_actual, RecordValue::Value(Value::Bool(false)));
        assert!(merged.requires_explanation);
        assert_eq!(merged.detail_actual.as_deref(), Some("a"));
    }

    #[test]
    fn squash_is_idempotent_on_chains() {
        let records = vec![
            record(RecordKind::Check, "check", 0),
            record(RecordKind::Transform, "transform", 1),
            record(RecordKind::Function, "length", 2),
            record(RecordKind::Check, "check", 1),
            record(RecordKind::Leaf, "isNotNull", 2),
        ];
        let once = squash(&records);
        assert_eq!(names(&once), vec!["check:transform", "length", "check:isNotNull"]);
        assert_eq!(squash(&once), once);
    }
}
