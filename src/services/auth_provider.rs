// Authentication provider
// Registers users, checks credentials and validates bearer tokens for the access gate

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{StoreError, UserRepository},
    middleware::auth::AuthenticatedUser,
    models::{
        auth::{IssuedToken, LoginRequest, RegisterRequest, DEFAULT_SCOPE},
        user::{NewUser, User},
    },
    services::jwt::JwtService,
    utils::{
        auth_errors::AuthError,
        password::{hash_password_with_config, verify_password, PasswordConfig},
        validation::{field_error, field_errors, trim_and_validate_field, FieldErrors},
    },
};

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account and issue its first token
    async fn register(&self, registration: RegisterRequest) -> Result<IssuedToken, AuthError>;

    /// Exchange credentials for a token
    async fn login(&self, credentials: LoginRequest) -> Result<IssuedToken, AuthError>;

    /// Resolve a bearer token to the user it was issued to
    async fn validate(&self, bearer_token: &str) -> Result<AuthenticatedUser, AuthError>;
}

/// Stateless JWT provider backed by a user repository
pub struct TokenAuthProvider {
    jwt: Arc<JwtService>,
    users: Arc<dyn UserRepository>,
    password: PasswordConfig,
}

impl TokenAuthProvider {
    pub fn new(
        jwt: Arc<JwtService>,
        users: Arc<dyn UserRepository>,
        password: PasswordConfig,
    ) -> Self {
        Self {
            jwt,
            users,
            password,
        }
    }

    fn issue_token(&self, user: &User) -> Result<IssuedToken, AuthError> {
        let access_token = self
            .jwt
            .generate_access_token(
                &user.id.to_string(),
                &user.email,
                vec![DEFAULT_SCOPE.to_string()],
            )
            .map_err(|e| AuthError::TokenError(e.to_string()))?;

        Ok(IssuedToken::bearer(
            access_token,
            self.jwt.access_token_expiry(),
        ))
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let config = self.password.clone();
        tokio::task::spawn_blocking(move || hash_password_with_config(&password, &config))
            .await
            .map_err(|e| {
                tracing::error!("Password hashing task failed: {}", e);
                AuthError::InternalError
            })?
            .map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                AuthError::InternalError
            })
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AuthError> {
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| {
                tracing::error!("Password verification task failed: {}", e);
                AuthError::InternalError
            })?
            .map_err(|e| {
                tracing::error!("Password verification failed: {}", e);
                AuthError::InternalError
            })
    }
}

/// Validate and normalise a registration: trimmed name, lower-cased email,
/// matching confirmation
fn normalize_registration(registration: RegisterRequest) -> Result<RegisterRequest, FieldErrors> {
    let mut errors = match registration.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => field_errors(&e),
    };

    let name = match trim_and_validate_field(&registration.name, true) {
        Ok(name) => name,
        Err(message) => {
            errors.entry("name".to_string()).or_insert_with(|| vec![message]);
            String::new()
        },
    };

    if let Some(confirmation) = &registration.password_confirmation {
        if confirmation != &registration.password {
            errors
                .entry("password_confirmation".to_string())
                .or_default()
                .push("Password confirmation does not match".to_string());
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(RegisterRequest {
        name,
        email: registration.email.trim().to_lowercase(),
        ..registration
    })
}

#[async_trait]
impl AuthProvider for TokenAuthProvider {
    async fn register(&self, registration: RegisterRequest) -> Result<IssuedToken, AuthError> {
        // Step 1: Validate input
        let registration = normalize_registration(registration).map_err(AuthError::Validation)?;

        // Step 2: Reject taken emails before paying for a hash
        if self.users.find_by_email(&registration.email).await?.is_some() {
            return Err(AuthError::Validation(field_error(
                "email",
                "The email has already been taken",
            )));
        }

        // Step 3: Hash password
        let password_hash = self.hash_password(registration.password).await?;

        // Step 4: Persist; a concurrent registration can still win the race
        let user = match self
            .users
            .create(NewUser::new(registration.name, registration.email, password_hash))
            .await
        {
            Ok(user) => user,
            Err(StoreError::Conflict(_)) => {
                return Err(AuthError::Validation(field_error(
                    "email",
                    "The email has already been taken",
                )))
            },
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = %user.id, "User registered");

        // Step 5: Issue token
        self.issue_token(&user)
    }

    async fn login(&self, credentials: LoginRequest) -> Result<IssuedToken, AuthError> {
        credentials
            .validate()
            .map_err(|e| AuthError::Validation(field_errors(&e)))?;

        let user = match self.users.find_by_email(credentials.email.trim()).await? {
            Some(user) => user,
            None => {
                // Spend comparable time on unknown emails
                self.hash_password(credentials.password).await?;
                return Err(AuthError::InvalidCredentials);
            },
        };

        if !self
            .verify_password(credentials.password, user.password_hash.clone())
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        self.issue_token(&user)
    }

    async fn validate(&self, bearer_token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self
            .jwt
            .validate_access_token(bearer_token)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {}", e);
                AuthError::Unauthenticated
            })?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::Unauthenticated)?;

        // Tokens of deleted users stop working immediately
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        Ok(AuthenticatedUser {
            user: user.profile(),
            token_id: claims.jti,
            scopes: claims.scope,
            expires_at: claims.exp,
        })
    }
}
