// Utility modules

pub mod auth_errors;
pub mod password;
pub mod service_error;
pub mod validation;

pub use auth_errors::{log_auth_failure, AuthError, ErrorDetail, ErrorResponse};
pub use password::{hash_password_with_config, verify_password, PasswordConfig, PasswordError};
pub use service_error::ServiceError;
pub use validation::{
    field_error, field_errors, rejection_errors, trim_and_validate_field, trim_optional_field,
    FieldErrors,
};
