//! HTTP error mapping.
//!
//! Storage and workflow errors are converted into [`ApiError`], which
//! renders as `{"error": "..."}` with the matching status code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::db::DbError;
use crate::workflow::WorkflowError;

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    #[schema(example = "ContentItem 'a1b2c3d4' not found")]
    pub error: String,
}

#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("{0}")]
    #[diagnostic(code(vlogforge::api::unauthorized))]
    Unauthorized(String),

    #[error("{0}")]
    #[diagnostic(code(vlogforge::api::forbidden))]
    Forbidden(String),

    #[error("{0}")]
    #[diagnostic(code(vlogforge::api::not_found))]
    NotFound(String),

    #[error("{0}")]
    #[diagnostic(code(vlogforge::api::validation))]
    Validation(String),

    #[error("{0}")]
    #[diagnostic(code(vlogforge::api::conflict))]
    Conflict(String),

    #[error("{0}")]
    #[diagnostic(code(vlogforge::api::internal))]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        ApiError::NotFound(format!("{} '{}' not found", entity, id))
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{} '{}' not found", entity_type, id))
            }
            DbError::AlreadyExists { .. } | DbError::Constraint { .. } => {
                ApiError::Conflict(e.to_string())
            }
            DbError::Validation { message } => ApiError::Validation(message),
            DbError::InvalidData { message, .. } => ApiError::Validation(message),
            DbError::Database { .. } | DbError::Migration { .. } | DbError::Connection { .. } => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::Forbidden { message } => ApiError::Forbidden(message),
            WorkflowError::Validation { message } => ApiError::Validation(message),
            WorkflowError::Conflict { message } => ApiError::Conflict(message),
            WorkflowError::InvalidTransition { .. } => ApiError::Conflict(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(message) => error!(%message, "request failed"),
            ApiError::Forbidden(message) | ApiError::Unauthorized(message) => {
                warn!(%status, %message, "access denied")
            }
            _ => {}
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_map_to_statuses() {
        let not_found: ApiError = DbError::not_found("Team", "abc12345").into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "Team 'abc12345' not found");

        let exists: ApiError = DbError::AlreadyExists {
            entity_type: "User".to_string(),
            id: "a@b.c".to_string(),
        }
        .into();
        assert_eq!(exists.status(), StatusCode::CONFLICT);

        let internal: ApiError = DbError::Database {
            message: "disk I/O error".to_string(),
        }
        .into();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_workflow_errors_map_to_statuses() {
        let forbidden: ApiError = WorkflowError::forbidden("nope").into();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let invalid: ApiError = WorkflowError::InvalidTransition {
            entity: "content",
            from: "idea".to_string(),
            to: "published".to_string(),
            reason: "transition not allowed".to_string(),
        }
        .into();
        assert_eq!(invalid.status(), StatusCode::CONFLICT);
        assert!(invalid.to_string().contains("'idea' to 'published'"));

        let validation: ApiError = WorkflowError::validation("bad").into();
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);
    }
}
