/// Programming errors that abort an evaluation. These never appear in a
/// trace; check and function failures are captured as outcomes instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A conjunction or disjunction was built without operands.
    #[error("{form} requires at least one operand")]
    EmptyJunction { form: String },

    /// A node in a boolean position produced a non-boolean value.
    #[error("'{form}' must produce Bool, got {got}")]
    NotBoolean { form: String, got: String },

    /// `leave` was called for a record that is not the innermost open one.
    #[error("unbalanced trace: expected to leave record {expected:?}, got {got}")]
    UnbalancedTrace { expected: Option<usize>, got: usize },

    /// A trace was finalized or imported while records were still open.
    #[error("{count} trace record(s) still open")]
    OpenRecords { count: usize },
}
