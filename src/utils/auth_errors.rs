// Authentication-specific error handling
// Covers the access gate and the register/login flows

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;
use crate::utils::validation::FieldErrors;

/// Authentication-specific errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("The given data was invalid")]
    Validation(FieldErrors),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Token generation failed: {0}")]
    TokenError(String),

    #[error("Internal server error")]
    InternalError,
}

/// Error body shared by every JSON error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: String) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                description: message.clone(),
                retry_after: None,
                fields: None,
            },
            message,
        }
    }
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::TokenError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated => "UNAUTHENTICATED",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::Store(_) => "STORAGE_ERROR",
            AuthError::TokenError(_) => "TOKEN_ERROR",
            AuthError::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show a client. Server-side failures are logged, not
    /// echoed.
    fn public_message(&self) -> String {
        match self {
            AuthError::Store(_) | AuthError::TokenError(_) | AuthError::InternalError => {
                "Internal server error".to_string()
            },
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Authentication request failed");
        }

        let mut body = ErrorResponse::new(self.error_code(), self.public_message());
        if let AuthError::Validation(fields) = self {
            body.error.fields = Some(fields);
        }

        (status, Json(body)).into_response()
    }
}

/// Log an authentication failure with request context
pub fn log_auth_failure(
    user_email: &str,
    ip_address: &str,
    error: &AuthError,
    user_agent: Option<&str>,
) {
    tracing::warn!(
        email = user_email,
        ip = ip_address,
        user_agent = user_agent.unwrap_or("unknown"),
        error_code = error.error_code(),
        "Authentication failure"
    );
}
