// Service error type for routing and resource handlers
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::db::StoreError;
use crate::utils::{auth_errors::ErrorResponse, validation::FieldErrors};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Route not found")]
    RouteNotFound,

    #[error("Resource not found")]
    NotFound,

    #[error("The given data was invalid")]
    ValidationError(FieldErrors),

    #[error("Too many requests")]
    TooManyRequests { retry_after_seconds: u64 },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    InternalError,
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::RouteNotFound | ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::DatabaseError(_) | ServiceError::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::RouteNotFound => "ROUTE_NOT_FOUND",
            ServiceError::NotFound => "NOT_FOUND",
            ServiceError::ValidationError(_) => "VALIDATION_ERROR",
            ServiceError::TooManyRequests { .. } => "RATE_LIMITED",
            ServiceError::DatabaseError(_) => "DATABASE_ERROR",
            ServiceError::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            ServiceError::DatabaseError(detail) => {
                tracing::error!("Database error: {}", detail);
                "Internal server error".to_string()
            },
            other => other.to_string(),
        };

        let mut body = ErrorResponse::new(self.error_code(), message);
        let retry_after = match self {
            ServiceError::ValidationError(fields) => {
                body.error.fields = Some(fields);
                None
            },
            ServiceError::TooManyRequests {
                retry_after_seconds,
            } => {
                body.error.retry_after = Some(retry_after_seconds);
                Some(retry_after_seconds)
            },
            _ => None,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => ServiceError::NotFound,
            other => ServiceError::DatabaseError(other.to_string()),
        }
    }
}
