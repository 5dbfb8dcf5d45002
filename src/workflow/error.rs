//! Workflow rule violations.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Forbidden: {message}")]
    #[diagnostic(code(vlogforge::workflow::forbidden))]
    Forbidden { message: String },

    #[error("Cannot move {entity} from '{from}' to '{to}': {reason}")]
    #[diagnostic(code(vlogforge::workflow::invalid_transition))]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    #[diagnostic(code(vlogforge::workflow::validation))]
    Validation { message: String },

    #[error("Conflict: {message}")]
    #[diagnostic(code(vlogforge::workflow::conflict))]
    Conflict { message: String },
}

impl WorkflowError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        WorkflowError::Forbidden {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        WorkflowError::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        WorkflowError::Conflict {
            message: message.into(),
        }
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
