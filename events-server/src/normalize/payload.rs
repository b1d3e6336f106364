//! Safe field access over raw webhook JSON.
//!
//! GitHub payloads are never validated against a schema. Lookups walk a
//! dotted path through nested objects, treating a missing key or a `null`
//! at any level as absence. A value of the wrong shape (for example a string
//! where an object was expected) is an [`ExtractError`], which callers turn
//! into an ignored delivery.

use serde_json::Value;
use thiserror::Error;

/// A payload had a field of an unexpected JSON type.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("field `{path}` expected {expected}, found {found}")]
pub struct ExtractError {
    pub path: String,
    pub expected: &'static str,
    pub found: &'static str,
}

impl ExtractError {
    fn new(path: &[&str], expected: &'static str, found: &Value) -> Self {
        let path = if path.is_empty() {
            "$".to_string()
        } else {
            path.join(".")
        };

        Self {
            path,
            expected,
            found: kind_of(found),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Walk `path` from `root`, returning the value at the end if every step exists.
pub fn value_at<'a>(root: &'a Value, path: &[&str]) -> Result<Option<&'a Value>, ExtractError> {
    let mut current = root;

    for (depth, key) in path.iter().enumerate() {
        let object = match current {
            Value::Object(map) => map,
            Value::Null => return Ok(None),
            other => return Err(ExtractError::new(&path[..depth], "object", other)),
        };

        match object.get(*key) {
            Some(Value::Null) | None => return Ok(None),
            Some(next) => current = next,
        }
    }

    Ok(Some(current))
}

/// String at `path`, or `None` if absent.
pub fn str_at<'a>(root: &'a Value, path: &[&str]) -> Result<Option<&'a str>, ExtractError> {
    match value_at(root, path)? {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(ExtractError::new(path, "string", other)),
    }
}

/// String at `path`, or `default` if absent.
pub fn str_or<'a>(root: &'a Value, path: &[&str], default: &'a str) -> Result<&'a str, ExtractError> {
    Ok(str_at(root, path)?.unwrap_or(default))
}

/// Boolean at `path`, or `None` if absent.
pub fn bool_at(root: &Value, path: &[&str]) -> Result<Option<bool>, ExtractError> {
    match value_at(root, path)? {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(ExtractError::new(path, "boolean", other)),
    }
}
