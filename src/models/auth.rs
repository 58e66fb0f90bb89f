// Authentication models
// Token claims plus the register and login payloads

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Scope granted to every access token issued by register or login
pub const DEFAULT_SCOPE: &str = "api";

/// Access token claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// User ID (subject)
    pub sub: String,

    /// JWT ID (UUID format)
    pub jti: String,

    pub email: String,

    pub scope: Vec<String>,

    pub aud: String,

    pub iss: String,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: u64,

    /// Expires at timestamp (Unix epoch seconds)
    pub exp: u64,
}

impl AccessTokenClaims {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        token_id: String,
        email: String,
        scope: Vec<String>,
        audience: String,
        issuer: String,
        issued_at: u64,
        expires_at: u64,
    ) -> Self {
        Self {
            sub: user_id,
            jti: token_id,
            email,
            scope,
            aud: audience,
            iss: issuer,
            iat: issued_at,
            exp: expires_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 320, message = "Email must be less than 320 characters"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Checked against `password` when present
    pub password_confirmation: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token handed to clients by register and login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: u64,
}

impl IssuedToken {
    pub fn bearer(access_token: String, expires_in: u64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_access_token_claims_structure() {
        let jti = Uuid::new_v4().to_string();
        let claims = AccessTokenClaims::new(
            "user-123".to_string(),
            jti.clone(),
            "user@example.com".to_string(),
            vec![DEFAULT_SCOPE.to_string()],
            "blog-api".to_string(),
            "blog-api".to_string(),
            1640995200,
            1640998800,
        );

        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.jti, jti);
        assert_eq!(claims.scope, vec!["api".to_string()]);
        assert_eq!(claims.aud, "blog-api");
        assert_eq!(claims.exp - claims.iat, 3600);

        let json = serde_json::to_string(&claims).expect("Should serialize");
        let deserialized: AccessTokenClaims =
            serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(claims, deserialized);
    }

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            password: "correct-horse".to_string(),
            password_confirmation: None,
        };
        assert!(valid.validate().is_ok());

        let invalid = RegisterRequest {
            name: String::new(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            password_confirmation: None,
        };
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_issued_token_is_bearer() {
        let token = IssuedToken::bearer("abc".to_string(), 3600);
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);
    }
}
