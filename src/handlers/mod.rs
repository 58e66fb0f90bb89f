// HTTP handlers
// Every handler answers with the ApiResponse envelope or a typed error

pub mod auth;
pub mod health;
pub mod products;

use axum::http::{Method, Uri};
use serde::Serialize;

use crate::utils::service_error::ServiceError;

/// Success envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
        }
    }
}

/// Fallback for requests that match no route
pub async fn route_not_found(method: Method, uri: Uri) -> ServiceError {
    tracing::debug!(method = %method, path = %uri.path(), "No route matched");
    ServiceError::RouteNotFound
}
