//! Failures raised by caller-supplied checks and functions.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Error raised while applying a check or function to a value.
///
/// Captured by the evaluator as `ExceptionThrown` and surfaced verbatim in
/// the detail section of a report. `causes` is the `source()` chain of the
/// originating error, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Failure {
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl Failure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Failure {
            kind: kind.into(),
            message: message.into(),
            causes: Vec::new(),
        }
    }

    /// Captures an arbitrary error, labelling it with the short name of its type.
    pub fn from_error<E: std::error::Error>(err: &E) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        Failure {
            kind: short_type_name::<E>().to_string(),
            message: err.to_string(),
            causes,
        }
    }

    pub fn type_mismatch(expected: &str, got: &Value) -> Self {
        Failure::new(
            "TypeMismatch",
            format!("expected {}, got {}", expected, got.type_name()),
        )
    }

    /// Multi-line rendering used by detail sections.
    pub fn excerpt(&self) -> String {
        let mut out = format!(
            "Exception Thrown: {}\nException Message: {}",
            self.kind, self.message
        );
        for cause in &self.causes {
            out.push_str("\n  caused by: ");
            out.push_str(cause);
        }
        out
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
