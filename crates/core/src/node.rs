//! The closed set of evaluable tree nodes.
//!
//! Trees are built programmatically and are immutable once built. Checks and
//! functions are shared `Arc` closures, so cloning a tree is cheap and a tree
//! can be evaluated from several threads at once (each evaluation owns its
//! own recorder).

use std::fmt;
use std::sync::Arc;

use crate::error::EngineError;
use crate::failure::Failure;
use crate::record::Detail;
use crate::value::Value;

pub type CheckFn = Arc<dyn Fn(&Value) -> Result<bool, Failure> + Send + Sync>;
pub type ApplyFn = Arc<dyn Fn(&Value) -> Result<Value, Failure> + Send + Sync>;
/// Produces a long-form explanation for a check whose result contradicted
/// the expectation. The flag is the result that was expected.
pub type ExplainFn = Arc<dyn Fn(&Value, bool) -> Detail + Send + Sync>;

// ──────────────────────────────────────────────
// Leaf checks and functions
// ──────────────────────────────────────────────

/// A named boolean test applied by a leaf node.
#[derive(Clone)]
pub struct Check {
    name: String,
    test: CheckFn,
    explain: Option<ExplainFn>,
    trivial: bool,
}

impl Check {
    pub fn new<F>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, Failure> + Send + Sync + 'static,
    {
        Check {
            name: name.into(),
            test: Arc::new(test),
            explain: None,
            trivial: false,
        }
    }

    /// Opts the check into detailed explanation on mismatch.
    pub fn explained_by<F>(mut self, explain: F) -> Self
    where
        F: Fn(&Value, bool) -> Detail + Send + Sync + 'static,
    {
        self.explain = Some(Arc::new(explain));
        self
    }

    /// Marks the check as uninteresting; its rows are hidden from reports
    /// unless it fails.
    pub fn trivial(mut self) -> Self {
        self.trivial = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_trivial(&self) -> bool {
        self.trivial
    }

    pub fn test(&self, value: &Value) -> Result<bool, Failure> {
        (self.test)(value)
    }

    /// Returns the long-form explanation, if the check opted into one.
    pub fn explain(&self, value: &Value, expected: bool) -> Option<Detail> {
        self.explain.as_ref().map(|f| f(value, expected))
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("name", &self.name)
            .field("explained", &self.explain.is_some())
            .field("trivial", &self.trivial)
            .finish()
    }
}

/// A named value transform applied by a function node.
#[derive(Clone)]
pub struct Func {
    name: String,
    apply: ApplyFn,
    identity: bool,
    trivial: bool,
}

impl Func {
    pub fn new<F>(name: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, Failure> + Send + Sync + 'static,
    {
        Func {
            name: name.into(),
            apply: Arc::new(apply),
            identity: false,
            trivial: false,
        }
    }

    /// The identity marker. A transformation whose mapper is this function
    /// is evaluated as its checker alone.
    pub fn identity() -> Self {
        Func {
            name: "identity".to_string(),
            apply: Arc::new(|v: &Value| Ok(v.clone())),
            identity: true,
            trivial: true,
        }
    }

    pub fn trivial(mut self) -> Self {
        self.trivial = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    pub fn is_trivial(&self) -> bool {
        self.trivial
    }

    pub fn apply(&self, value: &Value) -> Result<Value, Failure> {
        (self.apply)(value)
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func")
            .field("name", &self.name)
            .field("identity", &self.identity)
            .finish()
    }
}

// ──────────────────────────────────────────────
// Node tree
// ──────────────────────────────────────────────

/// One element of a composed predicate/function expression tree.
#[derive(Debug, Clone)]
pub enum Node {
    Leaf {
        check: Check,
    },
    /// AND. `shortcut` exits on the first false or tainted child (`&&`);
    /// otherwise every child is visited (`allOf`).
    Conjunction {
        children: Vec<Node>,
        shortcut: bool,
    },
    /// OR, symmetric to `Conjunction`.
    Disjunction {
        children: Vec<Node>,
        shortcut: bool,
    },
    Negation {
        target: Box<Node>,
    },
    /// Applies `head`, feeding its value into `tail` when present.
    Function {
        head: Func,
        tail: Option<Box<Node>>,
    },
    /// Maps the input with `mapper`, then checks the result with `checker`.
    Transformation {
        mapper: Box<Node>,
        checker: Box<Node>,
    },
    /// Finds the first element whose check equals `cut_on`; the result is
    /// `!default` if one is found, `default` otherwise.
    StreamQuantifier {
        cut_predicate: Box<Node>,
        cut_on: bool,
        default: bool,
    },
    /// Projects slot `arg_index` out of a `Value::Context` input.
    CurriedContextPredicate {
        enclosed: Box<Node>,
        arg_index: usize,
    },
}

impl Node {
    pub fn leaf(check: Check) -> Self {
        Node::Leaf { check }
    }

    /// Lazy conjunction (`&&`).
    pub fn and(children: Vec<Node>) -> Self {
        Node::Conjunction {
            children,
            shortcut: true,
        }
    }

    /// Eager conjunction; reports every failing operand at once.
    pub fn all_of(children: Vec<Node>) -> Self {
        Node::Conjunction {
            children,
            shortcut: false,
        }
    }

    pub fn or(children: Vec<Node>) -> Self {
        Node::Disjunction {
            children,
            shortcut: true,
        }
    }

    pub fn any_of(children: Vec<Node>) -> Self {
        Node::Disjunction {
            children,
            shortcut: false,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(target: Node) -> Self {
        Node::Negation {
            target: Box::new(target),
        }
    }

    pub fn function(head: Func) -> Self {
        Node::Function { head, tail: None }
    }

    /// A function node whose result is fed into `tail`.
    pub fn chain(head: Func, tail: Node) -> Self {
        Node::Function {
            head,
            tail: Some(Box::new(tail)),
        }
    }

    pub fn transform(mapper: Node, checker: Node) -> Self {
        Node::Transformation {
            mapper: Box::new(mapper),
            checker: Box::new(checker),
        }
    }

    pub fn quantifier(cut_predicate: Node, cut_on: bool, default: bool) -> Self {
        Node::StreamQuantifier {
            cut_predicate: Box::new(cut_predicate),
            cut_on,
            default,
        }
    }

    pub fn all_match(predicate: Node) -> Self {
        Node::quantifier(predicate, false, true)
    }

    pub fn any_match(predicate: Node) -> Self {
        Node::quantifier(predicate, true, false)
    }

    pub fn none_match(predicate: Node) -> Self {
        Node::quantifier(predicate, true, true)
    }

    pub fn curried(enclosed: Node, arg_index: usize) -> Self {
        Node::CurriedContextPredicate {
            enclosed: Box::new(enclosed),
            arg_index,
        }
    }

    /// True for a tailless function node wrapping the identity marker.
    pub fn is_identity(&self) -> bool {
        matches!(self, Node::Function { head, tail: None } if head.is_identity())
    }

    /// Rejects malformed trees before any node is evaluated.
    pub fn validate(&self) -> Result<(), EngineError> {
        match self {
            Node::Leaf { .. } => Ok(()),
            Node::Conjunction { children, shortcut } => {
                if children.is_empty() {
                    return Err(EngineError::EmptyJunction {
                        form: conjunction_name(*shortcut).to_string(),
                    });
                }
                children.iter().try_for_each(Node::validate)
            }
            Node::Disjunction { children, shortcut } => {
                if children.is_empty() {
                    return Err(EngineError::EmptyJunction {
                        form: disjunction_name(*shortcut).to_string(),
                    });
                }
                children.iter().try_for_each(Node::validate)
            }
            Node::Negation { target } => target.validate(),
            Node::Function { tail, .. } => match tail {
                Some(tail) => tail.validate(),
                None => Ok(()),
            },
            Node::Transformation { mapper, checker } => {
                mapper.validate()?;
                checker.validate()
            }
            Node::StreamQuantifier { cut_predicate, .. } => cut_predicate.validate(),
            Node::CurriedContextPredicate { enclosed, .. } => enclosed.validate(),
        }
    }
}

pub fn conjunction_name(shortcut: bool) -> &'static str {
    if shortcut {
        "and"
    } else {
        "allOf"
    }
}

pub fn disjunction_name(shortcut: bool) -> &'static str {
    if shortcut {
        "or"
    } else {
        "anyOf"
    }
}

/// Report name of a stream quantifier configuration.
pub fn quantifier_name(cut_on: bool, default: bool) -> &'static str {
    match (cut_on, default) {
        (false, true) => "allMatch",
        (true, false) => "anyMatch",
        (true, true) => "noneMatch",
        (false, false) => "notAllMatch",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(result: bool) -> Node {
        Node::leaf(Check::new("always", move |_| Ok(result)))
    }

    #[test]
    fn validate_rejects_empty_junction_anywhere() {
        let tree = Node::not(Node::and(vec![always(true), Node::any_of(vec![])]));
        assert_eq!(
            tree.validate(),
            Err(EngineError::EmptyJunction {
                form: "anyOf".to_string()
            })
        );
    }

    #[test]
    fn validate_accepts_well_formed_tree() {
        let tree = Node::transform(
            Node::function(Func::new("len", |v| Ok(v.clone()))),
            Node::all_of(vec![always(true), always(false)]),
        );
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn identity_marker_detection() {
        assert!(Node::function(Func::identity()).is_identity());
        assert!(!Node::chain(Func::identity(), always(true)).is_identity());
        assert!(!Node::function(Func::new("id", |v| Ok(v.clone()))).is_identity());
    }

    #[test]
    fn quantifier_names() {
        assert_eq!(quantifier_name(false, true), "allMatch");
        assert_eq!(quantifier_name(true, false), "anyMatch");
        assert_eq!(quantifier_name(true, true), "noneMatch");
    }
}
