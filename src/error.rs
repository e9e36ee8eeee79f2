use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Error codes for categorizing errors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum ErrorCode {
    // Identity errors (1xxx)
    #[serde(rename = "AUTH_1001")]
    ActorMissing,
    #[serde(rename = "AUTH_1002")]
    ActorInvalid,

    // Authorization errors (2xxx)
    #[serde(rename = "AUTHZ_2001")]
    RoleNotAuthorized,

    // Validation errors (3xxx)
    #[serde(rename = "VAL_3001")]
    InvalidInput,
    #[serde(rename = "VAL_3002")]
    MissingRequiredField,
    #[serde(rename = "VAL_3003")]
    InvalidFormat,
    #[serde(rename = "VAL_3004")]
    FeeOutOfRange,

    // Resource errors (4xxx)
    #[serde(rename = "RES_4001")]
    NotFound,
    #[serde(rename = "RES_4003")]
    Conflict,

    // Business logic errors (5xxx)
    #[serde(rename = "BIZ_5001")]
    InvalidStateTransition,
    #[serde(rename = "BIZ_5002")]
    UnauthorizedTransition,

    // Database errors (7xxx)
    #[serde(rename = "DB_7001")]
    StoreUnavailable,
    #[serde(rename = "DB_7002")]
    QueryFailed,

    // Internal errors (9xxx)
    #[serde(rename = "INT_9999")]
    InternalServerError,
    #[serde(rename = "INT_9998")]
    ConfigurationError,
}

impl ErrorCode {
    /// Get numeric code
    pub fn code(&self) -> u16 {
        match self {
            ErrorCode::ActorMissing => 1001,
            ErrorCode::ActorInvalid => 1002,

            ErrorCode::RoleNotAuthorized => 2001,

            ErrorCode::InvalidInput => 3001,
            ErrorCode::MissingRequiredField => 3002,
            ErrorCode::InvalidFormat => 3003,
            ErrorCode::FeeOutOfRange => 3004,

            ErrorCode::NotFound => 4001,
            ErrorCode::Conflict => 4003,

            ErrorCode::InvalidStateTransition => 5001,
            ErrorCode::UnauthorizedTransition => 5002,

            ErrorCode::StoreUnavailable => 7001,
            ErrorCode::QueryFailed => 7002,

            ErrorCode::InternalServerError => 9999,
            ErrorCode::ConfigurationError => 9998,
        }
    }

    /// Get user-friendly message
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::ActorMissing => "Actor identity is required for this action",
            ErrorCode::ActorInvalid => "Actor identity could not be understood",

            ErrorCode::RoleNotAuthorized => "Your role is not authorized for this action",

            ErrorCode::InvalidInput => "Invalid input provided",
            ErrorCode::MissingRequiredField => "Required field is missing",
            ErrorCode::InvalidFormat => "Invalid format provided",
            ErrorCode::FeeOutOfRange => "Fee percentage must be between 0 and 100",

            ErrorCode::NotFound => "The requested resource was not found",
            ErrorCode::Conflict => "The record was modified by another request",

            ErrorCode::InvalidStateTransition => {
                "This action is not allowed in the rate's current state"
            }
            ErrorCode::UnauthorizedTransition => {
                "This role may not act on the rate in its current state"
            }

            ErrorCode::StoreUnavailable => "The backing store is currently unavailable",
            ErrorCode::QueryFailed => "Database query failed",

            ErrorCode::InternalServerError => "An internal server error occurred",
            ErrorCode::ConfigurationError => "Server configuration error",
        }
    }
}

/// Structured error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    pub request_id: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub code_number: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation failed: {field}")]
    ValidationWithField {
        code: ErrorCode,
        field: String,
        message: String,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: cannot {action} a rate in state {current}")]
    InvalidTransition { current: String, action: String },

    #[error("Unauthorized transition: {role} may not act on a rate in state {current}")]
    UnauthorizedTransition { role: String, current: String },

    #[error("The record was modified concurrently; retry the operation")]
    ConcurrentModification,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("{1}")]
    WithCode(ErrorCode, String),
}

impl ApiError {
    /// Create error with specific error code
    pub fn with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError::WithCode(code, message.into())
    }

    /// Create validation error for a specific field
    pub fn validation_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::ValidationWithField {
            code: ErrorCode::InvalidInput,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Helper: fee percentage outside [0, 100]
    pub fn fee_out_of_range(field: impl Into<String>) -> Self {
        ApiError::ValidationWithField {
            code: ErrorCode::FeeOutOfRange,
            field: field.into(),
            message: ErrorCode::FeeOutOfRange.message().to_string(),
        }
    }

    /// Helper: resource not found
    pub fn not_found(resource: &str) -> Self {
        ApiError::NotFound(format!("{} not found", resource))
    }

    /// Helper: action not defined for the current state
    pub fn invalid_transition(current: impl Into<String>, action: impl Into<String>) -> Self {
        ApiError::InvalidTransition {
            current: current.into(),
            action: action.into(),
        }
    }

    /// Helper: actor role not allowed to act on the current state
    pub fn unauthorized_transition(role: impl Into<String>, current: impl Into<String>) -> Self {
        ApiError::UnauthorizedTransition {
            role: role.into(),
            current: current.into(),
        }
    }

    /// Get error code
    fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::Validation(_) => ErrorCode::InvalidInput,
            ApiError::ValidationWithField { code, .. } => *code,
            ApiError::Unauthorized(_) => ErrorCode::ActorMissing,
            ApiError::NotFound(_) => ErrorCode::NotFound,
            ApiError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            ApiError::UnauthorizedTransition { .. } => ErrorCode::UnauthorizedTransition,
            ApiError::ConcurrentModification => ErrorCode::Conflict,
            ApiError::Database(_) => ErrorCode::StoreUnavailable,
            ApiError::Configuration(_) => ErrorCode::ConfigurationError,
            ApiError::Internal(_) => ErrorCode::InternalServerError,
            ApiError::WithCode(code, _) => *code,
        }
    }

    /// Get field name for validation errors
    fn error_field(&self) -> Option<String> {
        match self {
            ApiError::ValidationWithField { field, .. } => Some(field.clone()),
            _ => None,
        }
    }

    /// Get status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::ValidationWithField { .. }
            | ApiError::WithCode(ErrorCode::InvalidInput, _)
            | ApiError::WithCode(ErrorCode::InvalidFormat, _)
            | ApiError::WithCode(ErrorCode::FeeOutOfRange, _)
            | ApiError::WithCode(ErrorCode::ActorInvalid, _) => StatusCode::BAD_REQUEST,

            ApiError::Unauthorized(_) | ApiError::WithCode(ErrorCode::ActorMissing, _) => {
                StatusCode::UNAUTHORIZED
            }

            ApiError::UnauthorizedTransition { .. }
            | ApiError::WithCode(ErrorCode::RoleNotAuthorized, _) => StatusCode::FORBIDDEN,

            ApiError::NotFound(_) | ApiError::WithCode(ErrorCode::NotFound, _) => {
                StatusCode::NOT_FOUND
            }

            ApiError::InvalidTransition { .. }
            | ApiError::ConcurrentModification
            | ApiError::WithCode(ErrorCode::Conflict, _) => StatusCode::CONFLICT,

            ApiError::Database(_) | ApiError::WithCode(ErrorCode::StoreUnavailable, _) => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            ApiError::Configuration(_) | ApiError::Internal(_) | ApiError::WithCode(_, _) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Log error with appropriate level
    fn log_error(&self, request_id: &str) {
        match self.status_code() {
            status if status.is_server_error() => {
                error!(
                    request_id = %request_id,
                    error = %self,
                    "Server error occurred"
                );
            }
            status if status.is_client_error() => {
                warn!(
                    request_id = %request_id,
                    error = %self,
                    "Client error occurred"
                );
            }
            _ => {}
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let status = self.status_code();
        let code = self.error_code();

        self.log_error(&request_id);

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code,
                code_number: code.code(),
                message: match &self {
                    ApiError::WithCode(_, msg) => msg.clone(),
                    ApiError::ValidationWithField { message, .. } => message.clone(),
                    ApiError::Validation(msg) => msg.clone(),
                    ApiError::NotFound(msg) => msg.clone(),
                    ApiError::InvalidTransition { .. }
                    | ApiError::UnauthorizedTransition { .. } => self.to_string(),
                    _ => code.message().to_string(),
                },
                details: match &self {
                    ApiError::Database(e) => Some(e.to_string()),
                    _ => None,
                },
                field: self.error_field(),
            },
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Handle Axum JSON rejections and convert to structured API errors
pub fn handle_rejection(err: JsonRejection) -> Response {
    match err {
        JsonRejection::JsonDataError(e) => {
            ApiError::Validation(format!("Invalid input provided: {}", e)).into_response()
        }
        JsonRejection::JsonSyntaxError(_) => {
            ApiError::with_code(ErrorCode::InvalidFormat, "Invalid JSON format").into_response()
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::with_code(ErrorCode::InvalidFormat, "JSON content type required")
                .into_response()
        }
        _ => ApiError::Validation(format!("Invalid request body: {:?}", err)).into_response(),
    }
}
