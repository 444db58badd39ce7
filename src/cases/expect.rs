//! Status and JSON-shape checks shared by the cases.

use serde_json::Value;

use crate::client::ApiResponse;
use crate::runner::error::CaseError;

pub fn status(res: &ApiResponse, expected: u16) -> Result<(), CaseError> {
    if res.status == expected {
        Ok(())
    } else {
        Err(CaseError::StatusMismatch {
            status: res.status,
            detail: res.detail(),
        })
    }
}

pub fn json(res: &ApiResponse) -> Result<Value, CaseError> {
    res.json().map_err(|_| CaseError::InvalidJson {
        detail: Value::String(res.body.clone()),
    })
}

/// Resolve a dotted path such as `professional.analytics.profileViews`
pub fn lookup<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    let pointer = format!("/{}", path.replace('.', "/"));
    body.pointer(&pointer)
}

/// Fail with `message` unless every path is present
pub fn keys(body: &Value, paths: &[&str], message: &str) -> Result<(), CaseError> {
    if paths.iter().all(|p| lookup(body, p).is_some()) {
        Ok(())
    } else {
        Err(CaseError::shape(message, body))
    }
}

/// The array at `path`, or a shape failure with `message`
pub fn list<'a>(body: &'a Value, path: &str, message: &str) -> Result<&'a Vec<Value>, CaseError> {
    lookup(body, path)
        .and_then(Value::as_array)
        .ok_or_else(|| CaseError::shape(message, body))
}

/// Value at `path` rendered as text (strings unquoted)
pub fn text(body: &Value, path: &str) -> String {
    match lookup(body, path) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Identifier or token at `path`: a non-empty string or a number. A `null`
/// or blank value fails with `message` so it never reaches the session.
pub fn ident(body: &Value, path: &str, message: &str) -> Result<String, CaseError> {
    match lookup(body, path) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(CaseError::shape(message, body)),
    }
}
