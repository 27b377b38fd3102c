//! Authentication-related Data Transfer Objects

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::validate::validate_email_format;

/// Register request payload
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Ann", min_length = 1)]
    pub name: String,
    /// Email address, must not be registered yet
    #[validate(custom(function = "validate_email_format"))]
    #[schema(example = "ann@example.com", format = "email")]
    pub email: String,
    /// Plain text password, stored only as an Argon2 hash
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    #[schema(example = "longpass1", format = "password", min_length = 8)]
    pub password: String,
}

/// Login request payload
///
/// No field rules: any mismatch, including a missing field, is reported as
/// invalid credentials.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "ann@example.com", format = "email")]
    pub email: String,
    #[serde(default)]
    #[schema(example = "longpass1", format = "password")]
    pub password: String,
}

/// Login response carrying the bearer token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Send as `Authorization: Bearer <token>`
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_rules() {
        let ok = RegisterRequest {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password: "longpass1".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = RegisterRequest {
            name: String::new(),
            email: "ann@x".to_string(),
            password: "short".to_string(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_login_request_missing_fields_default_to_empty() {
        let request: LoginRequest = serde_json::from_str(r#"{"email":"ann@x.com"}"#).unwrap();
        assert_eq!(request.email, "ann@x.com");
        assert!(request.password.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_password_length_counts_characters() {
        let request = RegisterRequest {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password: "ééééééé".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
