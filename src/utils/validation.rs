// Validation utilities for request payloads

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use validator::ValidationErrors;

/// Validation messages keyed by field name
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Flatten validator errors into per-field messages. A rule without an
/// explicit message falls back to its code.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// A single message for a single field
pub fn field_error(field: &str, message: impl Into<String>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![message.into()]);
    errors
}

/// Describe a body that could not be parsed as the expected JSON
pub fn rejection_errors(rejection: &JsonRejection) -> FieldErrors {
    field_error("body", rejection.body_text())
}

/// Trim a string field, rejecting it if required and empty
pub fn trim_and_validate_field(field: &str, required: bool) -> Result<String, String> {
    let trimmed = field.trim().to_string();
    if trimmed.is_empty() && required {
        Err("Field cannot be empty".to_string())
    } else {
        Ok(trimmed)
    }
}

/// Trim an optional field, mapping blank values to None
pub fn trim_optional_field(field: Option<&String>) -> Option<String> {
    field.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "Name is too short"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_field_errors_use_message_or_code() {
        let sample = Sample {
            name: "ab".to_string(),
            email: "nope".to_string(),
        };
        let errors = field_errors(&sample.validate().unwrap_err());

        assert_eq!(errors["name"], vec!["Name is too short".to_string()]);
        assert_eq!(errors["email"], vec!["email".to_string()]);
    }

    #[test]
    fn test_trim_helpers() {
        assert_eq!(trim_and_validate_field("  Ann ", true), Ok("Ann".to_string()));
        assert!(trim_and_validate_field("   ", true).is_err());
        assert_eq!(trim_and_validate_field("   ", false), Ok(String::new()));

        assert_eq!(trim_optional_field(Some(&"  ".to_string())), None);
        assert_eq!(
            trim_optional_field(Some(&" hi ".to_string())),
            Some("hi".to_string())
        );
        assert_eq!(trim_optional_field(None), None);
    }
}
