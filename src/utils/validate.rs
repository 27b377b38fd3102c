use std::borrow::Cow;
use std::sync::LazyLock;

use axum::Json;
use axum::extract::{FromRequest, Request, rejection::JsonRejection};
use regex::Regex;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$")
        .expect("email regex is valid")
});

/// Checks `local@domain.tld` shape with a TLD of at least two letters.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// `validator` adapter for [`is_valid_email`]. Empty input reports
/// "Email is required" instead of a format error.
pub fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        Err(ValidationError::new("required").with_message(Cow::Borrowed("Email is required")))
    } else if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message(Cow::Borrowed("Invalid email format")))
    }
}

/// JSON extractor that runs `Validate` on the body before the handler sees it.
///
/// Malformed JSON becomes `AppError::BadRequest`; rule violations become
/// `AppError::ValidationErrors`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest {
                message: rejection.body_text(),
            })?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, header};
    use proptest::prelude::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct TestBody {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(custom(function = "validate_email_format"))]
        email: String,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/test")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("ann@x.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("ann@x"));
        assert!(!is_valid_email("ann.x.com"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("ann@x.c"));
        assert!(!is_valid_email(""));
    }

    #[tokio::test]
    async fn test_valid_body() {
        let request = json_request(r#"{"name":"Ann","email":"ann@x.com"}"#);

        let ValidatedJson(body) = ValidatedJson::<TestBody>::from_request(request, &())
            .await
            .unwrap();
        assert_eq!(body.name, "Ann");
        assert_eq!(body.email, "ann@x.com");
    }

    #[tokio::test]
    async fn test_invalid_email_is_field_error() {
        let request = json_request(r#"{"name":"Ann","email":"nope"}"#);

        match ValidatedJson::<TestBody>::from_request(request, &()).await {
            Err(AppError::ValidationErrors { errors }) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "email");
                assert_eq!(errors[0].message, "Invalid email format");
            }
            other => panic!("Expected ValidationErrors error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_empty_email_is_required_error() {
        let request = json_request(r#"{"name":"Ann","email":""}"#);

        match ValidatedJson::<TestBody>::from_request(request, &()).await {
            Err(AppError::ValidationErrors { errors }) => {
                assert_eq!(errors[0].message, "Email is required");
            }
            other => panic!("Expected ValidationErrors error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let request = json_request(r#"{"name":"Ann""#);

        let result = ValidatedJson::<TestBody>::from_request(request, &()).await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })));
    }

    proptest! {
        #[test]
        fn prop_strings_without_at_sign_are_rejected(s in "[a-zA-Z0-9.]{0,40}") {
            prop_assert!(!is_valid_email(&s));
        }

        #[test]
        fn prop_well_formed_addresses_are_accepted(
            local in "[a-z0-9]{1,12}",
            domain in "[a-z0-9]{1,12}",
            tld in "[a-z]{2,6}",
        ) {
            let email = format!("{}@{}.{}", local, domain, tld);
            prop_assert!(is_valid_email(&email));
        }
    }
}
