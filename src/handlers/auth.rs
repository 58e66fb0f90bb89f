// Authentication Handlers
// Register and login are public; get-user sits behind the access gate

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use axum_extra::{headers::UserAgent, TypedHeader};

use super::ApiResponse;
use crate::{
    app::AppState,
    middleware::{auth::AuthenticatedUser, throttle::ClientIp},
    models::{
        auth::{IssuedToken, LoginRequest, RegisterRequest},
        user::UserProfile,
    },
    utils::{
        auth_errors::{log_auth_failure, AuthError},
        validation::rejection_errors,
    },
};

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(registration) =
        payload.map_err(|rejection| AuthError::Validation(rejection_errors(&rejection)))?;

    let email = registration.email.clone();
    let token = state.auth.register(registration).await.inspect_err(|err| {
        if !err.status_code().is_server_error() {
            tracing::info!(email = %email, ip = %ip, error_code = err.error_code(), "Registration rejected");
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::<IssuedToken>::ok(
            token,
            "User registered successfully",
        )),
    ))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    user_agent: Option<TypedHeader<UserAgent>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(credentials) =
        payload.map_err(|rejection| AuthError::Validation(rejection_errors(&rejection)))?;

    let email = credentials.email.clone();
    match state.auth.login(credentials).await {
        Ok(token) => Ok(Json(ApiResponse::<IssuedToken>::ok(
            token,
            "Login successful",
        ))),
        Err(err) => {
            log_auth_failure(
                &email,
                &ip,
                &err,
                user_agent.as_ref().map(|TypedHeader(agent)| agent.as_str()),
            );
            Err(err)
        },
    }
}

/// GET /get-user
pub async fn user_info(user: AuthenticatedUser) -> Json<ApiResponse<UserProfile>> {
    Json(ApiResponse::ok(user.user, "User retrieved successfully"))
}
