// JWT Token Generation Service
// HS256 access tokens with audience, issuer and strict expiry checks

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

use crate::models::auth::AccessTokenClaims;

// Error types for JWT operations
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(String),

    #[error("Key generation error: {0}")]
    KeyGenerationError(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => JwtError::InvalidToken,
            _ => JwtError::EncodingError(err.to_string()),
        }
    }
}

// Signing keys and validation settings for access tokens
#[derive(Clone)]
pub struct JwtConfig {
    pub access_token_expiry: u64,
    pub algorithm: Algorithm,

    pub audience: String,
    pub issuer: String,

    pub access_encoding_key: EncodingKey,
    pub access_decoding_key: DecodingKey,

    // Sent as `kid` so keys can be rotated
    pub key_version: u32,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("algorithm", &self.algorithm)
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("access_encoding_key", &"<redacted>")
            .field("access_decoding_key", &"<redacted>")
            .field("key_version", &self.key_version)
            .finish()
    }
}

impl JwtConfig {
    fn build_from_params(
        access_secret: &str,
        access_expiry: u64,
        audience: String,
        issuer: String,
        key_version: u32,
    ) -> Self {
        JwtConfig {
            access_token_expiry: access_expiry,
            algorithm: Algorithm::HS256,
            audience,
            issuer,
            access_encoding_key: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding_key: DecodingKey::from_secret(access_secret.as_bytes()),
            key_version,
        }
    }

    /// Create JWT config from the application configuration
    pub fn from_app_config(config: &crate::app_config::JwtConfig) -> Self {
        let crate::app_config::JwtConfig {
            secret,
            expiry,
            audience,
            issuer,
            key_version,
        } = config;

        Self::build_from_params(
            secret,
            *expiry,
            audience.clone(),
            issuer.clone(),
            *key_version,
        )
    }
}

pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }

    /// Generate access token
    pub fn generate_access_token(
        &self,
        user_id: &str,
        email: &str,
        scope: Vec<String>,
    ) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| JwtError::KeyGenerationError(e.to_string()))?
            .as_secs();

        let claims = AccessTokenClaims::new(
            user_id.to_string(),
            Uuid::new_v4().to_string(),
            email.to_string(),
            scope,
            self.config.audience.clone(),
            self.config.issuer.clone(),
            now,
            now.checked_add(self.config.access_token_expiry)
                .ok_or_else(|| JwtError::EncodingError("token expiry overflows".to_string()))?,
        );

        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &AccessTokenClaims) -> Result<String, JwtError> {
        let mut header = Header::new(self.config.algorithm);
        header.kid = Some(self.config.key_version.to_string());

        encode(&header, claims, &self.config.access_encoding_key).map_err(Into::into)
    }

    /// Validates an access token and returns the decoded claims
    ///
    /// # Errors
    /// * `JwtError::TokenExpired` - Token has expired (no leeway)
    /// * `JwtError::InvalidToken` - Malformed token, bad signature, wrong audience or issuer
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let mut validation = Validation::new(self.config.algorithm);
        validation.set_audience(&[self.config.audience.clone()]);
        validation.set_issuer(&[self.config.issuer.clone()]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let token_data =
            decode::<AccessTokenClaims>(token, &self.config.access_decoding_key, &validation)?;

        Ok(token_data.claims)
    }
}
