//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Missing required header: {0}")]
    MissingHeader(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::MissingHeader(header) => {
                (StatusCode::BAD_REQUEST, "missing_header", Some(header.clone()))
            }

            // 401 Unauthorized
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", Some(msg.clone()))
            }

            // 403 Forbidden
            AppError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone()))
            }

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(ref domain_err) => {
                let detail = domain_err.to_string();
                match domain_err {
                    // 409 Conflict: the request lost against existing state
                    DomainError::EventNotOpen(_) => {
                        (StatusCode::CONFLICT, "event_not_open", Some(detail))
                    }
                    DomainError::AlreadyRegistered(_) => {
                        (StatusCode::CONFLICT, "already_registered", Some(detail))
                    }
                    DomainError::CapacityExceeded(_) => {
                        (StatusCode::CONFLICT, "capacity_exceeded", Some(detail))
                    }
                    DomainError::FeedbackAlreadySubmitted(_) => {
                        (StatusCode::CONFLICT, "feedback_already_submitted", Some(detail))
                    }

                    // 404 Not Found
                    DomainError::EventNotFound(_) => {
                        (StatusCode::NOT_FOUND, "event_not_found", Some(detail))
                    }
                    DomainError::RegistrationNotFound(_) => {
                        (StatusCode::NOT_FOUND, "registration_not_found", Some(detail))
                    }
                    // Deliberately carries no detail that distinguishes
                    // "never minted" from "revoked" or similar
                    DomainError::InvalidCredential => {
                        (StatusCode::NOT_FOUND, "invalid_credential", None)
                    }

                    // 400 Bad Request
                    DomainError::InvalidRating(_) => {
                        (StatusCode::BAD_REQUEST, "invalid_rating", Some(detail))
                    }
                    DomainError::InvalidCapacity(_) => {
                        (StatusCode::BAD_REQUEST, "invalid_capacity", Some(detail))
                    }

                    // 403 Forbidden
                    DomainError::FeedbackNotAllowed(_) => {
                        (StatusCode::FORBIDDEN, "feedback_not_allowed", Some(detail))
                    }
                }
            }

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
