//! Trace recorder: accumulates one record per evaluated node.
//!
//! Records are reserved in pre-order when a node is entered and finalized
//! when it is left, so the finished trace lists every parent before its
//! children. The lineage stack holds the records still open; its depth is
//! the nesting level of the next record.

use std::ops::{Deref, DerefMut};

use pcond_core::{
    Detail, EngineConfig, EngineError, Outcome, RecordKind, RecordValue, State, Trace,
    TraceRecord, Value,
};

/// Identifies an open record; returned by `enter`, consumed by `leave`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHandle(usize);

/// Describes the record a node is about to open.
#[derive(Debug, Clone)]
pub struct Opening {
    kind: RecordKind,
    form_name: String,
    input: RecordValue,
    continued: bool,
    trivial: bool,
}

impl Opening {
    pub fn new(kind: RecordKind, form_name: impl Into<String>, input: Option<&Value>) -> Self {
        Opening {
            kind,
            form_name: form_name.into(),
            input: RecordValue::from_input(input),
            continued: false,
            trivial: false,
        }
    }

    /// The record is a function head followed by a tail.
    pub fn continued(mut self, continued: bool) -> Self {
        self.continued = continued;
        self
    }

    /// The record is hidden from reports unless its node fails.
    pub fn trivial(mut self, trivial: bool) -> Self {
        self.trivial = trivial;
        self
    }
}

#[derive(Debug)]
struct OpenRecord {
    opening: Opening,
    nesting_level: usize,
    /// Known up front for boolean records: what a success looks like.
    expected_output: Option<RecordValue>,
}

#[derive(Debug)]
enum Entry {
    Open(OpenRecord),
    Done(TraceRecord),
}

/// Session state for one top-level evaluation. Not shared between
/// evaluations; each evaluation creates its own.
#[derive(Debug)]
pub struct TraceRecorder {
    config: EngineConfig,
    entries: Vec<Entry>,
    lineage: Vec<usize>,
    expectation_flipped: bool,
}

impl TraceRecorder {
    pub fn new(config: EngineConfig) -> Self {
        TraceRecorder {
            config,
            entries: Vec::new(),
            lineage: Vec::new(),
            expectation_flipped: false,
        }
    }

    /// A separately scoped recorder for a sub-evaluation, inheriting the
    /// config and the current polarity. Its records are merged back with
    /// [`TraceRecorder::import`].
    pub fn child(&self) -> Self {
        TraceRecorder {
            config: self.config.clone(),
            entries: Vec::new(),
            lineage: Vec::new(),
            expectation_flipped: self.expectation_flipped,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn current_nesting_level(&self) -> usize {
        self.lineage.len()
    }

    pub fn is_expectation_flipped(&self) -> bool {
        self.expectation_flipped
    }

    /// Toggles the expectation polarity. Prefer [`TraceRecorder::flip_scope`],
    /// which restores it automatically.
    pub fn flip_expectation(&mut self) {
        self.expectation_flipped = !self.expectation_flipped;
    }

    /// Flips the polarity until the returned guard is dropped.
    pub fn flip_scope(&mut self) -> FlipScope<'_> {
        self.flip_expectation();
        FlipScope { recorder: self }
    }

    /// Opens a record at the current nesting level.
    pub fn enter(&mut self, opening: Opening) -> RecordHandle {
        let expected_output = opening
            .kind
            .is_boolean()
            .then(|| RecordValue::Value(Value::Bool(!self.expectation_flipped)));
        let index = self.entries.len();
        self.entries.push(Entry::Open(OpenRecord {
            opening,
            nesting_level: self.lineage.len(),
            expected_output,
        }));
        self.lineage.push(index);
        RecordHandle(index)
    }

    /// Finalizes the innermost open record with the node's outcome.
    pub fn leave(
        &mut self,
        handle: RecordHandle,
        outcome: &Outcome<Value>,
        detail: Option<Detail>,
    ) -> Result<(), EngineError> {
        let innermost = self.lineage.last().copied();
        if innermost != Some(handle.0) {
            return Err(EngineError::UnbalancedTrace {
                expected: innermost,
                got: handle.0,
            });
        }
        self.lineage.pop();

        let slot = &mut self.entries[handle.0];
        let Entry::Open(open) = slot else {
            return Err(EngineError::UnbalancedTrace {
                expected: None,
                got: handle.0,
            });
        };

        let output_for_expected = open
            .expected_output
            .take()
            .unwrap_or_else(|| match outcome.state() {
                State::Returned(value) => RecordValue::Value(value.clone()),
                State::ExceptionThrown(_) => RecordValue::NoFailure,
                State::Skipped => RecordValue::Skipped,
            });
        let detail = if self.config.suppress_details {
            None
        } else {
            detail
        };
        let kind = open.opening.kind;
        let input = std::mem::replace(&mut open.opening.input, RecordValue::Skipped);
        let mut record = TraceRecord {
            form_name: std::mem::take(&mut open.opening.form_name),
            nesting_level: open.nesting_level,
            kind,
            continued: open.opening.continued,
            input_for_expected: input.clone(),
            input_for_actual: input,
            output_for_expected,
            output_for_actual: RecordValue::from_outcome(outcome),
            requires_explanation: detail.is_some(),
            detail_expected: detail.as_ref().map(|d| d.expected.clone()),
            detail_actual: detail.map(|d| d.actual),
            squashable: kind.is_squashable(),
            ignored: false,
        };
        // Trivial rows stay visible whenever they diverge.
        record.ignored = open.opening.trivial && !outcome.is_thrown() && !record.is_mismatch();

        if self.config.debug {
            let max = self.config.max_snapshot_len;
            tracing::debug!(
                form = %record.form_name,
                level = record.nesting_level,
                input = %record.input_for_actual.summarize(max),
                output = %record.output_for_actual.summarize(max),
                expected = %record.output_for_expected.summarize(max),
                "leave"
            );
        }

        *slot = Entry::Done(record);
        Ok(())
    }

    /// Appends the finalized records of a child recorder, shifting their
    /// nesting levels by `level_offset`.
    pub fn import(&mut self, child: TraceRecorder, level_offset: usize) -> Result<(), EngineError> {
        if !child.lineage.is_empty() {
            return Err(EngineError::OpenRecords {
                count: child.lineage.len(),
            });
        }
        for entry in child.entries {
            match entry {
                Entry::Done(mut record) => {
                    record.nesting_level += level_offset;
                    self.entries.push(Entry::Done(record));
                }
                Entry::Open(_) => return Err(EngineError::OpenRecords { count: 1 }),
            }
        }
        Ok(())
    }

    /// Consumes the recorder, yielding the trace. Every record must be closed.
    pub fn into_trace(self) -> Result<Trace, EngineError> {
        if !self.lineage.is_empty() {
            return Err(EngineError::OpenRecords {
                count: self.lineage.len(),
            });
        }
        let mut records = Vec::with_capacity(self.entries.len());
        for entry in self.entries {
            match entry {
                Entry::Done(record) => records.push(record),
                Entry::Open(_) => return Err(EngineError::OpenRecords { count: 1 }),
            }
        }
        Ok(Trace::new(records))
    }
}

/// Keeps the expectation flipped while alive; flips it back on drop, so an
/// early `?` return cannot leak the polarity into sibling subtrees.
pub struct FlipScope<'a> {
    recorder: &'a mut TraceRecorder,
}

impl Deref for FlipScope<'_> {
    type Target = TraceRecorder;

    fn deref(&self) -> &TraceRecorder {
        self.recorder
    }
}

impl DerefMut for FlipScope<'_> {
    fn deref_mut(&mut self) -> &mut TraceRecorder {
        self.recorder
    }
}

impl Drop for FlipScope<'_> {
    fn drop(&mut self) {
        self.recorder.flip_expectation();
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pcond_core::Failure;

    fn recorder() -> TraceRecorder {
        TraceRecorder::new(EngineConfig::default())
    }

    fn yes() -> Outcome<Value> {
        Outcome::returned(Value::Bool(true))
    }

    #[test]
    fn records_are_in_preorder_with_nesting_levels() {
        let mut rec = recorder();
        let input = Value::Int(1);
        let outer = rec.enter(Opening::new(RecordKind::Conjunction, "allOf", Some(&input)));
        assert_eq!(rec.current_nesting_level(), 1);
        let inner = rec.enter(Opening::new(RecordKind::Leaf, "isNotNull", Some(&input)));
        assert_eq!(rec.current_nesting_level(), 2);
        rec.leave(inner, &yes(), None).unwrap();
        rec.leave(outer, &yes(), None).unwrap();

        let trace = rec.into_trace().unwrap();
        let names: Vec<_> = trace.iter().map(|r| (r.form_name.as_str(), r.nesting_level)).collect();
        assert_eq!(names, vec![("allOf", 0), ("isNotNull", 1)]);
    }

    #[test]
    fn leaving_out_of_order_is_an_error() {
        let mut rec = recorder();
        let outer = rec.enter(Opening::new(RecordKind::Negation, "not", None));
        let _inner = rec.enter(Opening::new(RecordKind::Leaf, "x", None));
        let err = rec.leave(outer, &Outcome::skipped(), None).unwrap_err();
        assert_eq!(
            err,
            EngineError::UnbalancedTrace {
                expected: Some(1),
                got: 0
            }
        );
    }

    #[test]
    fn open_records_block_finalization() {
        let mut rec = recorder();
        rec.enter(Opening::new(RecordKind::Leaf, "x", None));
        assert_eq!(
            rec.into_trace().unwrap_err(),
            EngineError::OpenRecords { count: 1 }
        );
    }

    #[test]
    fn flip_scope_restores_polarity() {
        let mut rec = recorder();
        {
            let mut scope = rec.flip_scope();
            assert!(scope.is_expectation_flipped());
            let h = scope.enter(Opening::new(RecordKind::Leaf, "x", None));
            scope.leave(h, &Outcome::skipped(), None).unwrap();
        }
        assert!(!rec.is_expectation_flipped());
        let trace = rec.into_trace().unwrap();
        assert_eq!(
            trace.records()[0].output_for_expected,
            RecordValue::Value(Value::Bool(false))
        );
    }

    #[test]
    fn value_records_expect_their_own_result() {
        let mut rec = recorder();
        let input = Value::text("abc");
        let ok = rec.enter(Opening::new(RecordKind::Function, "length", Some(&input)));
        rec.leave(ok, &Outcome::returned(Value::Int(3)), None).unwrap();
        let bad = rec.enter(Opening::new(RecordKind::Function, "parseInt", Some(&input)));
        let failure = Failure::new("ParseIntError", "invalid digit found in string");
        rec.leave(
            bad,
            &Outcome::thrown(failure.clone()),
            Some(Detail::for_failure(&input, &failure)),
        )
        .unwrap();

        let trace = rec.into_trace().unwrap();
        let records = trace.records();
        assert_eq!(records[0].output_for_expected, RecordValue::Value(Value::Int(3)));
        assert!(!records[0].is_mismatch());
        assert_eq!(records[1].output_for_expected, RecordValue::NoFailure);
        assert_eq!(records[1].output_for_actual, RecordValue::Thrown(failure));
        assert!(records[1].requires_explanation);
        assert!(records[1].detail_actual.as_deref().unwrap().contains("ParseIntError"));
    }

    #[test]
    fn import_shifts_levels_and_appends_after_parent() {
        let mut rec = recorder();
        let input = Value::text("ab");
        let t = rec.enter(Opening::new(RecordKind::Transform, "transform", Some(&input)));

        let mut child = rec.child();
        let f = child.enter(Opening::new(RecordKind::Function, "length", Some(&input)));
        child.leave(f, &Outcome::returned(Value::Int(2)), None).unwrap();
        let offset = rec.current_nesting_level();
        rec.import(child, offset).unwrap();
        rec.leave(t, &Outcome::returned(Value::Int(2)), None).unwrap();

        let trace = rec.into_trace().unwrap();
        assert_eq!(trace.records()[0].form_name, "transform");
        assert!(trace.records()[0].squashable);
        assert_eq!(trace.records()[1].form_name, "length");
        assert_eq!(trace.records()[1].nesting_level, 1);
    }

    #[test]
    fn trivial_records_are_ignored_unless_thrown_or_diverging() {
        let mut rec = recorder();
        let a = rec.enter(Opening::new(RecordKind::Curried, "curry[0]", None).trivial(true));
        rec.leave(a, &yes(), None).unwrap();
        let b = rec.enter(Opening::new(RecordKind::Curried, "curry[1]", None).trivial(true));
        rec.leave(b, &Outcome::thrown(Failure::new("E", "m")), None).unwrap();
        let c = rec.enter(Opening::new(RecordKind::Leaf, "isPositive", None).trivial(true));
        rec.leave(c, &Outcome::returned(Value::Bool(false)), None).unwrap();

        let trace = rec.into_trace().unwrap();
        assert!(trace.records()[0].ignored);
        assert!(!trace.records()[1].ignored);
        assert!(trace.records()[2].is_mismatch());
        assert!(!trace.records()[2].ignored);
    }

    #[test]
    fn suppressed_details_are_dropped() {
        let mut rec = TraceRecorder::new(EngineConfig::default().with_suppressed_details(true));
        let h = rec.enter(Opening::new(RecordKind::Leaf, "x", None));
        rec.leave(h, &yes(), Some(Detail::new("e", "a"))).unwrap();
        let trace = rec.into_trace().unwrap();
        assert!(!trace.records()[0].requires_explanation);
        assert_eq!(trace.records()[0].detail_actual, None);
    }
}
