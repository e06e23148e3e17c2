//! Stock printable functions for function and transformation nodes.

use crate::failure::Failure;
use crate::node::Func;
use crate::value::Value;

pub fn identity() -> Func {
    Func::identity()
}

/// Character count of a text value.
pub fn length() -> Func {
    Func::new("length", |v| {
        Ok(Value::Int(v.as_text()?.chars().count() as i64))
    })
}

/// Element count of a list or context.
pub fn size() -> Func {
    Func::new("size", |v| match v {
        Value::List(items) | Value::Context(items) => Ok(Value::Int(items.len() as i64)),
        other => Err(Failure::type_mismatch("List", other)),
    })
}

pub fn to_upper_case() -> Func {
    Func::new("toUpperCase", |v| Ok(Value::Text(v.as_text()?.to_uppercase())))
}

pub fn to_lower_case() -> Func {
    Func::new("toLowerCase", |v| Ok(Value::Text(v.as_text()?.to_lowercase())))
}

pub fn trim() -> Func {
    Func::new("trim", |v| Ok(Value::Text(v.as_text()?.trim().to_string())))
}

/// Parses text as a decimal integer.
pub fn parse_int() -> Func {
    Func::new("parseInt", |v| {
        v.as_text()?
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| Failure::from_error(&e))
    })
}

pub fn element_at(index: usize) -> Func {
    Func::new(format!("elementAt[{}]", index), move |v| {
        v.as_list()?.get(index).cloned().ok_or_else(|| {
            Failure::new(
                "IndexOutOfBounds",
                format!("index {} out of bounds for length {}", index, v_len(v)),
            )
        })
    })
}

/// Renders any value as text.
pub fn stringify() -> Func {
    Func::new("stringify", |v| {
        Ok(Value::Text(match v {
            Value::Text(s) => s.clone(),
            other => other.to_string(),
        }))
    })
}

fn v_len(v: &Value) -> usize {
    match v {
        Value::List(items) | Value::Context(items) => items.len(),
        _ => 0,
    }
}
