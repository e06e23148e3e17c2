//! pcond-eval: evaluates a node tree against one input and records a
//! replayable trace of every sub-evaluation.
//!
//! The trace is consumed by `pcond-report` to build an expected-vs-actual
//! explanation when the evaluation does not pass.

pub mod evaluator;
pub mod recorder;

pub use evaluator::eval_node;
pub use recorder::{FlipScope, Opening, RecordHandle, TraceRecorder};

use pcond_core::{EngineConfig, EngineError, Node, Outcome, Trace, Value};

/// Result of evaluating a tree against one input.
#[derive(Debug)]
pub struct Evaluation {
    pub outcome: Outcome<Value>,
    pub trace: Trace,
}

impl Evaluation {
    /// True only when the tree returned `true`. Failures and skips never pass.
    pub fn passed(&self) -> bool {
        matches!(self.outcome.returned_value(), Some(Value::Bool(true)))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "passed": self.passed(),
            "trace": self.trace.to_json(),
        })
    }
}

/// Evaluate `node` against `input` using the process-wide config.
///
/// Malformed trees (an empty junction, a non-boolean operand) are rejected
/// with an `EngineError`; failures of checks and functions are captured in
/// the outcome and trace instead.
pub fn evaluate(node: &Node, input: &Value) -> Result<Evaluation, EngineError> {
    evaluate_with(EngineConfig::global(), node, input)
}

/// Evaluate `node` against `input` with an explicit config.
pub fn evaluate_with(
    config: &EngineConfig,
    node: &Node,
    input: &Value,
) -> Result<Evaluation, EngineError> {
    node.validate()?;
    let mut recorder = TraceRecorder::new(config.clone());
    let outcome = eval_node(node, Some(input), &mut recorder)?;
    let trace = recorder.into_trace()?;
    Ok(Evaluation { outcome, trace })
}

// ──────────────────────────────────────────────
// Integration tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod integration_tests {
    use super::*;
    use pcond_core::{functions, predicates};

    #[test]
    fn passing_evaluation() {
        let node = Node::transform(
            Node::function(functions::length()),
            predicates::greater_than(2),
        );
        let eval = evaluate_with(&EngineConfig::default(), &node, &Value::text("abcd")).unwrap();
        assert!(eval.passed());
        let json = eval.to_json();
        assert_eq!(json["passed"], serde_json::json!(true));
        assert_eq!(json["trace"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn malformed_tree_is_rejected_before_walking() {
        let node = Node::all_of(vec![predicates::is_not_null(), Node::or(vec![])]);
        let err = evaluate_with(&EngineConfig::default(), &node, &Value::Null).unwrap_err();
        assert_eq!(
            err,
            EngineError::EmptyJunction {
                form: "or".to_string()
            }
        );
    }

    #[test]
    fn debug_logging_does_not_change_results() {
        let node = Node::not(predicates::equals_ignore_case("HELLO"));
        let quiet = evaluate_with(&EngineConfig::default(), &node, &Value::text("hello")).unwrap();
        let loud = evaluate_with(
            &EngineConfig::default().with_debug(true),
            &node,
            &Value::text("hello"),
        )
        .unwrap();
        assert_eq!(quiet.passed(), loud.passed());
        assert_eq!(quiet.trace, loud.trace);
    }
}
