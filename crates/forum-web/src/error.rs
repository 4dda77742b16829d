//! HTTP error mapping.
//!
//! Every handler returns `Result<_, AppError>`. Store and validation errors
//! convert with `?`; the status code and JSON body are decided here only.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use forum_core::errors::CoreError;
use forum_db::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    /// A form field failed validation.
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0} not found")]
    NotFound(String),

    /// No valid session accompanied a request that needs one.
    #[error("authentication required")]
    Unauthenticated,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, message } => Self::Validation { field, message },
            CoreError::NotFound { entity_type, id } => Self::NotFound(format!("{entity_type} {id}")),
            CoreError::Other(e) => Self::Internal(e),
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, id } => Self::NotFound(format!("{entity} {id}")),
            DatabaseError::NoResult => Self::NotFound("record".to_string()),
            DatabaseError::Conflict(msg) => Self::Conflict(msg),
            DatabaseError::InvalidCredentials => Self::InvalidCredentials,
            DatabaseError::Validation(core) => core.into(),
            other => Self::Internal(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation { field, message } => {
                let errors: BTreeMap<&str, &str> = [(field.as_str(), message.as_str())].into();
                json!({ "errors": errors })
            }
            Self::Internal(err) => {
                error!(error = %format!("{err:#}"), "request failed");
                json!({ "error": "internal server error" })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
