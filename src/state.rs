//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use crate::repositories::Repositories;
use crate::services::Services;
use crate::utils::jwt::TokenIssuer;

/// Application state containing all shared services and resources.
///
/// Cloning is cheap: services hold `Arc` handles and the token issuer only
/// holds key material.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// Signs tokens at login and verifies them on protected routes
    pub tokens: TokenIssuer,
}

impl AppState {
    /// Creates a new AppState from repositories and the token signing secret.
    ///
    /// # Example
    /// ```ignore
    /// let state = AppState::new(Repositories::in_memory(), &settings.jwt.secret);
    /// ```
    pub fn new(repos: Repositories, jwt_secret: &str) -> Self {
        Self {
            services: Services::new(repos),
            tokens: TokenIssuer::new(jwt_secret),
        }
    }
}
