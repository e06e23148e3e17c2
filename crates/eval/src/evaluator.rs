//! Node tree evaluator.
//!
//! One evaluation routine per node kind. Each routine opens its record(s)
//! on the recorder, evaluates its children recursively, and closes the
//! record(s) with its outcome.
//!
//! The input is `None` when it was never produced (an ancestor failed or was
//! short-circuited). Such nodes are still recorded, as `Skipped`, but no
//! caller-supplied check or function is invoked.

use pcond_core::node::{conjunction_name, disjunction_name, quantifier_name};
use pcond_core::{
    Check, Detail, EngineError, Failure, Func, Node, Origin, Outcome, RecordKind, State, Value,
};

use crate::recorder::{Opening, TraceRecorder};

/// Evaluate `node` against `input`, recording into `rec`.
pub fn eval_node(
    node: &Node,
    input: Option<&Value>,
    rec: &mut TraceRecorder,
) -> Result<Outcome<Value>, EngineError> {
    match node {
        Node::Leaf { check } => eval_leaf(check, input, rec),
        Node::Conjunction { children, shortcut } => eval_junction(
            Junction::Conjunction,
            children,
            *shortcut,
            input,
            rec,
        ),
        Node::Disjunction { children, shortcut } => eval_junction(
            Junction::Disjunction,
            children,
            *shortcut,
            input,
            rec,
        ),
        Node::Negation { target } => eval_negation(target, input, rec),
        Node::Function { head, tail } => eval_function(head, tail.as_deref(), input, rec),
        Node::Transformation { mapper, checker } => {
            eval_transformation(mapper, checker, input, rec)
        }
        Node::StreamQuantifier {
            cut_predicate,
            cut_on,
            default,
        } => eval_quantifier(cut_predicate, *cut_on, *default, input, rec),
        Node::CurriedContextPredicate {
            enclosed,
            arg_index,
        } => eval_curried(enclosed, *arg_index, input, rec),
    }
}

// ──────────────────────────────────────────────
// Leaves
// ──────────────────────────────────────────────

fn eval_leaf(
    check: &Check,
    input: Option<&Value>,
    rec: &mut TraceRecorder,
) -> Result<Outcome<Value>, EngineError> {
    let handle = rec.enter(
        Opening::new(RecordKind::Leaf, check.name(), input).trivial(check.is_trivial()),
    );
    let (outcome, detail) = match input {
        None => (Outcome::skipped(), None),
        Some(value) => match check.test(value) {
            Ok(result) => {
                let expected = !rec.is_expectation_flipped();
                let detail = if result != expected {
                    check.explain(value, expected)
                } else {
                    None
                };
                (Outcome::returned(Value::Bool(result)), detail)
            }
            Err(failure) => {
                let detail = Detail::for_failure(value, &failure);
                (Outcome::thrown(failure), Some(detail))
            }
        },
    };
    tracing::trace!(form = check.name(), "leaf evaluated");
    rec.leave(handle, &outcome, detail)?;
    Ok(outcome)
}

// ──────────────────────────────────────────────
// Junctions and negation
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Junction {
    Conjunction,
    Disjunction,
}

impl Junction {
    fn kind(self) -> RecordKind {
        match self {
            Junction::Conjunction => RecordKind::Conjunction,
            Junction::Disjunction => RecordKind::Disjunction,
        }
    }

    fn name(self, shortcut: bool) -> &'static str {
        match self {
            Junction::Conjunction => conjunction_name(shortcut),
            Junction::Disjunction => disjunction_name(shortcut),
        }
    }

    /// The operand value that decides the junction on its own.
    fn decisive(self) -> bool {
        matches!(self, Junction::Disjunction)
    }
}

fn eval_junction(
    junction: Junction,
    children: &[Node],
    shortcut: bool,
    input: Option<&Value>,
    rec: &mut TraceRecorder,
) -> Result<Outcome<Value>, EngineError> {
    let name = junction.name(shortcut);
    if children.is_empty() {
        return Err(EngineError::EmptyJunction {
            form: name.to_string(),
        });
    }
    let handle = rec.enter(Opening::new(junction.kind(), name, input));

    let decisive = junction.decisive();
    let mut decided = false;
    let mut tainted = false;
    for child in children {
        let outcome = eval_node(child, input, rec)?;
        match expect_bool(child, &outcome)? {
            Some(b) => decided |= b == decisive,
            None => tainted = true,
        }
        if shortcut && (decided || tainted) {
            break;
        }
    }

    let outcome = match junction {
        // A failed or skipped operand leaves the conjunction undetermined.
        Junction::Conjunction if tainted => Outcome::skipped(),
        Junction::Conjunction => Outcome::returned(Value::Bool(!decided)),
        Junction::Disjunction if decided => Outcome::returned(Value::Bool(true)),
        Junction::Disjunction if tainted => Outcome::skipped(),
        Junction::Disjunction => Outcome::returned(Value::Bool(false)),
    };
    rec.leave(handle, &outcome, None)?;
    Ok(outcome)
}

fn eval_negation(
    target: &Node,
    input: Option<&Value>,
    rec: &mut TraceRecorder,
) -> Result<Outcome<Value>, EngineError> {
    let handle = rec.enter(Opening::new(RecordKind::Negation, "not", input));
    let inner = {
        let mut scope = rec.flip_scope();
        eval_node(target, input, &mut scope)?
    };
    let outcome = match expect_bool(target, &inner)? {
        Some(b) => Outcome::returned(Value::Bool(!b)),
        None => inner,
    };
    rec.leave(handle, &outcome, None)?;
    Ok(outcome)
}

// ──────────────────────────────────────────────
// Functions and transformations
// ──────────────────────────────────────────────

fn eval_function(
    head: &Func,
    tail: Option<&Node>,
    input: Option<&Value>,
    rec: &mut TraceRecorder,
) -> Result<Outcome<Value>, EngineError> {
    let handle = rec.enter(
        Opening::new(RecordKind::Function, head.name(), input)
            .continued(tail.is_some())
            .trivial(head.is_trivial()),
    );
    let (head_outcome, detail) = match input {
        None => (Outcome::skipped(), None),
        Some(value) => match head.apply(value) {
            Ok(out) => (Outcome::returned(out), None),
            Err(failure) => {
                let detail = Detail::for_failure(value, &failure);
                (Outcome::thrown(failure), Some(detail))
            }
        },
    };
    let head_outcome = head_outcome.with_origin(Origin::Head);
    rec.leave(handle, &head_outcome, detail)?;

    let Some(tail) = tail else {
        return Ok(head_outcome);
    };
    match head_outcome.returned_value() {
        Some(value) => Ok(eval_node(tail, Some(value), rec)?.with_origin(Origin::Tail)),
        None => {
            // Record the tail as never evaluated; the head's failure stands.
            eval_node(tail, None, rec)?;
            Ok(head_outcome)
        }
    }
}

fn eval_transformation(
    mapper: &Node,
    checker: &Node,
    input: Option<&Value>,
    rec: &mut TraceRecorder,
) -> Result<Outcome<Value>, EngineError> {
    if mapper.is_identity() {
        return eval_node(checker, input, rec);
    }

    let transform = rec.enter(Opening::new(RecordKind::Transform, "transform", input));
    let mut stage = rec.child();
    let mapped = eval_node(mapper, input, &mut stage)?.with_origin(Origin::Transform);
    let offset = rec.current_nesting_level();
    rec.import(stage, offset)?;
    rec.leave(transform, &mapped, None)?;

    let mapped_value = mapped.returned_value();
    let check = rec.enter(Opening::new(RecordKind::Check, "check", mapped_value));
    let checked = eval_node(checker, mapped_value, rec)?;
    if mapped_value.is_none() {
        // The checker was walked only to show it was never reached.
        rec.leave(check, &Outcome::skipped(), None)?;
        return Ok(mapped);
    }
    rec.leave(check, &checked, None)?;
    Ok(checked)
}

// ──────────────────────────────────────────────
// Stream quantifiers and curried context
// ──────────────────────────────────────────────

fn eval_quantifier(
    cut_predicate: &Node,
    cut_on: bool,
    default: bool,
    input: Option<&Value>,
    rec: &mut TraceRecorder,
) -> Result<Outcome<Value>, EngineError> {
    let name = quantifier_name(cut_on, default);
    let handle = rec.enter(Opening::new(RecordKind::Quantifier, name, input));

    let (outcome, detail) = match input {
        None => {
            // Walk the element check once to show it was never reached.
            eval_element(cut_predicate, cut_on == default, None, rec)?;
            (Outcome::skipped(), None)
        }
        Some(value) => match value.as_list() {
            Ok(elements) => {
                let outcome = scan_elements(cut_predicate, cut_on, default, elements, rec)?;
                (outcome, None)
            }
            Err(failure) => {
                let detail = Detail::for_failure(value, &failure);
                (Outcome::thrown(failure), Some(detail))
            }
        },
    };
    rec.leave(handle, &outcome, detail)?;
    Ok(outcome)
}

/// Stops at the first element whose check equals `cut_on`. Elements are
/// evaluated with the expectation flipped when finding one is the failure
/// case (`cut_on == default`, e.g. noneMatch).
fn scan_elements(
    cut_predicate: &Node,
    cut_on: bool,
    default: bool,
    elements: &[Value],
    rec: &mut TraceRecorder,
) -> Result<Outcome<Value>, EngineError> {
    let flip = cut_on == default;
    for element in elements {
        let outcome = eval_element(cut_predicate, flip, Some(element), rec)?;
        match expect_bool(cut_predicate, &outcome)? {
            Some(b) if b == cut_on => return Ok(Outcome::returned(Value::Bool(!default))),
            Some(_) => {}
            None => return Ok(outcome),
        }
    }
    Ok(Outcome::returned(Value::Bool(default)))
}

fn eval_element(
    cut_predicate: &Node,
    flip: bool,
    element: Option<&Value>,
    rec: &mut TraceRecorder,
) -> Result<Outcome<Value>, EngineError> {
    if flip {
        let mut scope = rec.flip_scope();
        eval_node(cut_predicate, element, &mut scope)
    } else {
        eval_node(cut_predicate, element, rec)
    }
}

fn eval_curried(
    enclosed: &Node,
    arg_index: usize,
    input: Option<&Value>,
    rec: &mut TraceRecorder,
) -> Result<Outcome<Value>, EngineError> {
    let handle = rec.enter(
        Opening::new(RecordKind::Curried, format!("curry[{}]", arg_index), input).trivial(true),
    );
    let (outcome, detail) = match input {
        None => (eval_node(enclosed, None, rec)?, None),
        Some(value) => match project(value, arg_index) {
            Ok(slot) => (eval_node(enclosed, Some(slot), rec)?, None),
            Err(failure) => {
                let detail = Detail::for_failure(value, &failure);
                (Outcome::thrown(failure), Some(detail))
            }
        },
    };
    rec.leave(handle, &outcome, detail)?;
    Ok(outcome)
}

fn project(value: &Value, arg_index: usize) -> Result<&Value, Failure> {
    match value {
        Value::Context(slots) => slots.get(arg_index).ok_or_else(|| {
            Failure::new(
                "IndexOutOfBounds",
                format!(
                    "context slot {} out of bounds for {} slot(s)",
                    arg_index,
                    slots.len()
                ),
            )
        }),
        other => Err(Failure::type_mismatch("Context", other)),
    }
}

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

/// `Some(b)` for a returned boolean, `None` for a failure or skip. A
/// returned non-boolean means the tree was assembled wrongly.
fn expect_bool(node: &Node, outcome: &Outcome<Value>) -> Result<Option<bool>, EngineError> {
    match outcome.state() {
        State::Returned(Value::Bool(b)) => Ok(Some(*b)),
        State::Returned(other) => Err(EngineError::NotBoolean {
            form: form_name(node),
            got: other.type_name().to_string(),
        }),
        State::ExceptionThrown(_) | State::Skipped => Ok(None),
    }
}

fn form_name(node: &Node) -> String {
    match node {
        Node::Leaf { check } => check.name().to_string(),
        Node::Conjunction { shortcut, .. } => conjunction_name(*shortcut).to_string(),
        Node::Disjunction { shortcut, .. } => disjunction_name(*shortcut).to_string(),
        Node::Negation { .. } => "not".to_string(),
        Node::Function { head, .. } => head.name().to_string(),
        Node::Transformation { .. } => "transform".to_string(),
        Node::StreamQuantifier {
            cut_on, default, ..
        } => quantifier_name(*cut_on, *default).to_string(),
        Node::CurriedContextPredicate { arg_index, .. } => format!("curry[{}]", arg_index),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
