use serde_json::Value;
use thiserror::Error;

use crate::client::TransportFailure;

/// Ways a test case can fail. Every variant ends up as a recorded failure;
/// none of them stops the run.
#[derive(Debug, Error)]
pub enum CaseError {
    /// Server unreachable or the call timed out
    #[error("Request failed")]
    Transport(#[from] TransportFailure),

    /// Response status differs from what the case expects
    #[error("HTTP {status}")]
    StatusMismatch {
        status: u16,
        detail: Value,
    },

    /// Expected status, but the JSON lacks a required key or has the wrong type
    #[error("{message}")]
    ShapeMismatch { message: String, detail: Value },

    /// Expected status, but the body does not parse as JSON
    #[error("Invalid JSON response")]
    InvalidJson { detail: Value },

    /// A dependent case ran before the state it needs was produced
    #[error("{0}")]
    PreconditionMissing(String),

    /// Anything else raised inside a case
    #[error("Exception: {0}")]
    Unhandled(String),
}

impl CaseError {
    pub fn shape(message: &str, detail: &Value) -> Self {
        CaseError::ShapeMismatch {
            message: message.to_string(),
            detail: detail.clone(),
        }
    }

    pub fn missing(what: &str) -> Self {
        CaseError::PreconditionMissing(format!("No {} available", what))
    }

    /// Payload attached to the failure record, if any
    pub fn details(&self) -> Option<Value> {
        match self {
            CaseError::Transport(failure) => Some(Value::String(failure.to_string())),
            CaseError::StatusMismatch { detail, .. }
            | CaseError::ShapeMismatch { detail, .. }
            | CaseError::InvalidJson { detail } => Some(detail.clone()),
            CaseError::PreconditionMissing(_) | CaseError::Unhandled(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CaseError::Transport(_) => "TransportFailure",
            CaseError::StatusMismatch { .. } => "StatusMismatch",
            CaseError::ShapeMismatch { .. } => "ShapeMismatch",
            CaseError::InvalidJson { .. } => "InvalidJson",
            CaseError::PreconditionMissing(_) => "PreconditionMissing",
            CaseError::Unhandled(_) => "UnhandledFault",
        }
    }
}

impl From<serde_json::Error> for CaseError {
    fn from(e: serde_json::Error) -> Self {
        CaseError::Unhandled(e.to_string())
    }
}
