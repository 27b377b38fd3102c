//! User-related DTOs for API requests and responses.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{User, UserChanges};
use crate::utils::validate::validate_email_format;

/// Request body for replacing a user's profile.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Annie", min_length = 1)]
    pub name: String,
    #[validate(custom(function = "validate_email_format"))]
    #[schema(example = "annie@example.com", format = "email")]
    pub email: String,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
        }
    }
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "5f0c6d1e-8b55-4c55-9d34-3f1a8c9e2b10")]
    pub id: String,
    #[schema(example = "Ann")]
    pub name: String,
    #[schema(example = "ann@example.com")]
    pub email: String,
    #[schema(value_type = String, format = DateTime, example = "2025-01-01T12:00:00Z")]
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}
