// Access gate for protected routes
// Validates bearer tokens and injects AuthenticatedUser into request extensions

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{app::AppState, routes::RouteName, utils::auth_errors::AuthError};

/// Extract the credential from `Authorization: Bearer <token>`. Any other
/// scheme, or an empty token, counts as no credential.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware function that validates the bearer token and adds
/// AuthenticatedUser to extensions. Rejections never reach the handler.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let route = request
        .extensions()
        .get::<RouteName>()
        .map(|name| name.0.clone())
        .unwrap_or_else(|| request.uri().path().to_string());

    let token = match bearer_token(request.headers()) {
        Some(token) => token.to_string(),
        None => {
            tracing::warn!(route = %route, "Missing or invalid authorization header");
            return AuthError::Unauthenticated.into_response();
        },
    };

    match app_state.auth.validate(&token).await {
        Ok(user) => {
            tracing::debug!(route = %route, user_id = %user.user.id, "Bearer credential accepted");
            request.extensions_mut().insert(user);
            next.run(request).await
        },
        // Storage failures are not the caller's fault; answer 500, not 401
        Err(err @ AuthError::Store(_)) => err.into_response(),
        Err(err) => {
            tracing::warn!(route = %route, error = %err, "Bearer credential rejected");
            AuthError::Unauthenticated.into_response()
        },
    }
}
