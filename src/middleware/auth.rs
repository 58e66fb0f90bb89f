// Authenticated request context

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

use crate::{models::user::UserProfile, utils::auth_errors::AuthError};

/// User behind a validated bearer token, inserted into request extensions by
/// the access gate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    pub user: UserProfile,
    pub token_id: String,
    pub scopes: Vec<String>,
    /// Unix epoch seconds
    pub expires_at: u64,
}

/// Lets gated handlers take `AuthenticatedUser` as a parameter. Outside the
/// gate the extension is missing and the request is rejected as
/// unauthenticated.
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}
