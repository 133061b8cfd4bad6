use crate::middleware::AttachedError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use bugsnag_core::{OpaqueError, Reportable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Error type/code
    pub error_type: String,
    /// Human-readable error message
    pub message: String,
    /// Field-specific validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<HashMap<String, Vec<String>>>,
    /// Timestamp when error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Handler error that renders as JSON and is reported by the middleware
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field_errors: Option<HashMap<String, Vec<String>>>,
    },

    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("Authorization error: {message}")]
    Authorization { message: String },

    #[error("Resource not found: {resource_type}")]
    NotFound { resource_type: String },

    #[error("Resource conflict: {message}")]
    Conflict { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },
}

impl ApiError {
    /// Create a validation error with field-specific errors
    pub fn validation_with_fields(
        message: impl Into<String>,
        field_errors: HashMap<String, Vec<String>>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: Some(field_errors),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    pub fn not_found(resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Authorization { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::Authentication { .. } => "authentication_error",
            ApiError::Authorization { .. } => "authorization_error",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Conflict { .. } => "conflict",
            ApiError::Internal { .. } => "internal_error",
            ApiError::BadRequest { .. } => "bad_request",
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::Validation { message, .. }
            | ApiError::Authentication { message }
            | ApiError::Authorization { message }
            | ApiError::Conflict { message }
            | ApiError::Internal { message }
            | ApiError::BadRequest { message } => message,
            ApiError::NotFound { resource_type } => resource_type,
        }
    }
}

impl Reportable for ApiError {
    fn reason(&self) -> Option<String> {
        Some(self.message().to_string())
    }

    fn status(&self) -> Option<StatusCode> {
        Some(self.status_code())
    }

    fn metadata(&self) -> Option<serde_json::Map<String, serde_json::Value>> {
        let mut metadata = serde_json::Map::new();
        metadata.insert("Error type".to_string(), self.error_type().into());
        if let ApiError::Validation {
            field_errors: Some(fields),
            ..
        } = self
        {
            if let Ok(fields) = serde_json::to_value(fields) {
                metadata.insert("Field errors".to_string(), fields);
            }
        }
        Some(metadata)
    }

    /// Missing resources and rejected credentials are client noise.
    fn should_report(&self) -> Option<bool> {
        match self {
            ApiError::NotFound { .. } | ApiError::Authentication { .. } => Some(false),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        error!(
            error_id = %error_id,
            error_type = %self.error_type(),
            status_code = %status_code.as_u16(),
            error = %self,
            "API error occurred"
        );

        let field_errors = match &self {
            ApiError::Validation { field_errors, .. } => field_errors.clone(),
            _ => None,
        };

        let error_response = ApiErrorResponse {
            error_id,
            error_type: self.error_type().to_string(),
            message: self.to_string(),
            field_errors,
            timestamp: chrono::Utc::now(),
        };

        let mut response = (status_code, Json(error_response)).into_response();
        response.extensions_mut().insert(AttachedError::new(self));
        response
    }
}

/// Convert anyhow errors to API errors
impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Internal {
            message: error.to_string(),
        }
    }
}

/// Response wrapper for any reportable error type.
///
/// Renders the error's status (500 when it has none) with its display text
/// as the body, and attaches the error for the reporting middleware.
#[derive(Debug)]
pub struct Reported<E>(pub E);

impl<E: Reportable + 'static> IntoResponse for Reported<E> {
    fn into_response(self) -> Response {
        let status = self.0.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.0.to_string()).into_response();
        response.extensions_mut().insert(AttachedError::new(self.0));
        response
    }
}

impl From<anyhow::Error> for Reported<OpaqueError> {
    fn from(error: anyhow::Error) -> Self {
        Reported(OpaqueError::from(error))
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
