//! Data Transfer Objects for API requests and responses.
//!
//! - `auth` - Registration and login payloads
//! - `user` - User views and update payloads
//! - `health` - Liveness and readiness payloads
//! - `error` - Common error response

mod auth;
mod error;
mod health;
mod user;

pub use auth::{LoginRequest, LoginResponse, RegisterRequest};
pub use error::ErrorResponse;
pub use health::{HealthResponse, HealthStatus, ReadinessResponse};
pub use user::{UpdateUserRequest, UserResponse};
