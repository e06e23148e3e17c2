//! Stock printable leaf checks.
//!
//! Each constructor returns a [`Node::Leaf`] whose form name reads the way
//! the check would be written, e.g. `equalsIgnoreCase["HELLO"]`.

use rust_decimal::Decimal;
use std::cmp::Ordering;

use crate::failure::Failure;
use crate::node::{Check, Node};
use crate::record::Detail;
use crate::value::Value;

pub fn is_not_null() -> Node {
    Node::leaf(Check::new("isNotNull", |v| Ok(!matches!(v, Value::Null))))
}

pub fn is_null() -> Node {
    Node::leaf(Check::new("isNull", |v| Ok(matches!(v, Value::Null))))
}

pub fn is_true() -> Node {
    Node::leaf(Check::new("isTrue", |v| Ok(v.as_bool() == Some(true))))
}

pub fn is_false() -> Node {
    Node::leaf(Check::new("isFalse", |v| Ok(v.as_bool() == Some(false))))
}

/// Tests the value's [`Value::type_name`].
pub fn is_instance_of(type_name: &'static str) -> Node {
    Node::leaf(Check::new(format!("isInstanceOf[{}]", type_name), move |v| {
        Ok(v.type_name() == type_name)
    }))
}

pub fn is_equal_to(expected: impl Into<Value>) -> Node {
    let expected = expected.into();
    let shown = expected.to_string();
    let explain_shown = shown.clone();
    Node::leaf(
        Check::new(format!("isEqualTo[{}]", shown), move |v| Ok(*v == expected))
            .explained_by(move |v, want| explain_against(&explain_shown, v, want)),
    )
}

pub fn equals_ignore_case(expected: impl Into<String>) -> Node {
    let expected = expected.into();
    let shown = format!("{:?}", expected);
    let explain_shown = shown.clone();
    Node::leaf(
        Check::new(format!("equalsIgnoreCase[{}]", shown), move |v| {
            Ok(v.as_text()?.to_lowercase() == expected.to_lowercase())
        })
        .explained_by(move |v, want| explain_against(&explain_shown, v, want)),
    )
}

pub fn starts_with(prefix: impl Into<String>) -> Node {
    let prefix = prefix.into();
    let name = format!("startsWith[{:?}]", prefix);
    let shown = format!("{:?}...", prefix);
    Node::leaf(
        Check::new(name, move |v| Ok(v.as_text()?.starts_with(prefix.as_str())))
            .explained_by(move |v, want| explain_against(&shown, v, want)),
    )
}

pub fn ends_with(suffix: impl Into<String>) -> Node {
    let suffix = suffix.into();
    let name = format!("endsWith[{:?}]", suffix);
    let shown = format!("...{:?}", suffix);
    Node::leaf(
        Check::new(name, move |v| Ok(v.as_text()?.ends_with(suffix.as_str())))
            .explained_by(move |v, want| explain_against(&shown, v, want)),
    )
}

pub fn contains_string(needle: impl Into<String>) -> Node {
    let needle = needle.into();
    let name = format!("containsString[{:?}]", needle);
    let shown = format!("...{:?}...", needle);
    Node::leaf(
        Check::new(name, move |v| Ok(v.as_text()?.contains(needle.as_str())))
            .explained_by(move |v, want| explain_against(&shown, v, want)),
    )
}

pub fn is_empty_string() -> Node {
    Node::leaf(Check::new("isEmptyString", |v| Ok(v.as_text()?.is_empty())))
}

pub fn greater_than(bound: impl Into<Value>) -> Node {
    compare("greaterThan", ">", bound.into(), |o| o == Ordering::Greater)
}

pub fn greater_than_or_equal_to(bound: impl Into<Value>) -> Node {
    compare("greaterThanOrEqualTo", ">=", bound.into(), |o| {
        o != Ordering::Less
    })
}

pub fn less_than(bound: impl Into<Value>) -> Node {
    compare("lessThan", "<", bound.into(), |o| o == Ordering::Less)
}

pub fn less_than_or_equal_to(bound: impl Into<Value>) -> Node {
    compare("lessThanOrEqualTo", "<=", bound.into(), |o| {
        o != Ordering::Greater
    })
}

fn compare(
    name: &str,
    symbol: &'static str,
    bound: Value,
    accept: fn(Ordering) -> bool,
) -> Node {
    let form = format!("{}[{}]", name, bound);
    let bound_for_check = bound.clone();
    Node::leaf(
        Check::new(form, move |v| {
            let lhs: Decimal = v.as_decimal()?;
            let rhs: Decimal = bound_for_check.as_decimal()?;
            Ok(accept(lhs.cmp(&rhs)))
        })
        .explained_by(move |v, want| {
            let relation = format!("{} {}", symbol, bound);
            if want {
                Detail::new(relation, v.to_string())
            } else {
                Detail::new(format!("not {}", relation), v.to_string())
            }
        }),
    )
}

fn explain_against(shown: &str, actual: &Value, want: bool) -> Detail {
    if want {
        Detail::new(shown, actual.to_string())
    } else {
        Detail::new(format!("not {}", shown), actual.to_string())
    }
}

/// A leaf that always fails with the given failure; useful for wiring
/// caller-side errors into a tree.
pub fn failing(name: impl Into<String>, failure: Failure) -> Node {
    Node::leaf(Check::new(name, move |_| Err(failure.clone())))
}
