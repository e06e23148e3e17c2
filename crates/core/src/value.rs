//! Runtime values fed through node trees.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::failure::Failure;

// ──────────────────────────────────────────────
// Runtime values
// ──────────────────────────────────────────────

/// Dynamically typed value checked and transformed by nodes.
/// Numeric comparison goes through `rust_decimal::Decimal` -- never `f64`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Text(String),
    List(Vec<Value>),
    Record(BTreeMap<String, Value>),
    /// Multi-slot context, projected by curried context predicates.
    Context(Vec<Value>),
}

impl Value {
    /// Returns a human-readable type name for reports and failures.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Decimal(_) => "Decimal",
            Value::Text(_) => "Text",
            Value::List(_) => "List",
            Value::Record(_) => "Record",
            Value::Context(_) => "Context",
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Builds a multi-slot context from its slot values.
    pub fn context(slots: impl IntoIterator<Item = Value>) -> Self {
        Value::Context(slots.into_iter().collect())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extracts text or fails with a `TypeMismatch`.
    pub fn as_text(&self) -> Result<&str, Failure> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(Failure::type_mismatch("Text", other)),
        }
    }

    /// Extracts list elements or fails with a `TypeMismatch`.
    pub fn as_list(&self) -> Result<&[Value], Failure> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(Failure::type_mismatch("List", other)),
        }
    }

    /// Widens `Int` and `Decimal` into a `Decimal` for comparison.
    pub fn as_decimal(&self) -> Result<Decimal, Failure> {
        match self {
            Value::Int(i) => Ok(Decimal::from(*i)),
            Value::Decimal(d) => Ok(*d),
            other => Err(Failure::type_mismatch("Int or Decimal", other)),
        }
    }

    /// Renders the value for a report column, clipped to `max_len` characters.
    pub fn summarize(&self, max_len: usize) -> String {
        clip(self.to_string(), max_len)
    }
}

/// Clips `s` to at most `max_len` characters, marking the cut with `...`.
pub fn clip(s: String, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s;
    }
    let keep = max_len.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                write_joined(f, items)?;
                write!(f, "]")
            }
            Value::Record(fields) => {
                write!(f, "{{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}:{}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Context(slots) => {
                write!(f, "context:[")?;
                write_joined(f, slots)?;
                write!(f, "]")
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
