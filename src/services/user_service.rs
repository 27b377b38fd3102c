//! User service for business logic operations.
//!
//! Owns the registration and login rules: input validation, email
//! uniqueness pre-check, password hashing and credential verification.

use std::sync::Arc;

use jiff::Timestamp;

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User, UserChanges};
use crate::repositories::UserRepository;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validate::{MIN_PASSWORD_LENGTH, is_valid_email};

/// User service for handling user-related business logic.
///
/// Holds nothing but a shared repository handle, so it is cheap to clone
/// and safe to call from many request tasks at once.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    /// Creates a new UserService with the given repository.
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Registers a new user.
    ///
    /// Two concurrent registrations with the same email can both pass the
    /// existence check; the store does not enforce uniqueness.
    ///
    /// # Errors
    /// - `Validation` for empty fields, malformed email or short password
    /// - `DuplicateEmail` if the email is already registered
    /// - `Store` if the lookup or insert fails
    pub async fn register(&self, name: &str, email: &str, password: &str) -> AppResult<User> {
        validate_profile(name, email)?;
        if password.is_empty() {
            return Err(AppError::validation("password", "Password is required"));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::validation(
                "password",
                "Password must be at least 8 characters long",
            ));
        }

        if self.repo.find_by_email(email).await?.is_some() {
            tracing::info!(email = %email, "Registration rejected: email already registered");
            return Err(AppError::DuplicateEmail {
                email: email.to_string(),
            });
        }

        let new_user = NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password: hash_password(password)?,
            created_at: Timestamp::now(),
        };

        let user = self.repo.create(new_user).await?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Verifies an email/password pair.
    ///
    /// Unknown email, wrong password and an unreadable stored hash all yield
    /// the same `InvalidCredentials`.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let Some(user) = self.repo.find_by_email(email).await? else {
            return Err(AppError::InvalidCredentials);
        };

        match verify_password(password, &user.password) {
            Ok(true) => Ok(user),
            Ok(false) => Err(AppError::InvalidCredentials),
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Stored password hash could not be parsed");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    /// Gets a user by their ID.
    ///
    /// # Returns
    /// The user if found, or `NotFound` error
    pub async fn get_user(&self, id: &str) -> AppResult<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::user_not_found("id", id))
    }

    /// Lists all users. No pagination.
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repo.list_all().await
    }

    /// Replaces a user's name and email.
    ///
    /// Does not re-check email uniqueness and never touches the password.
    /// Nothing is written when validation fails.
    pub async fn update_user(&self, id: &str, changes: UserChanges) -> AppResult<()> {
        validate_profile(&changes.name, &changes.email)?;
        self.repo.update(id, changes).await
    }

    /// Deletes a user. Unknown ids succeed silently.
    pub async fn delete_user(&self, id: &str) -> AppResult<()> {
        self.repo.delete(id).await
    }

    /// Number of stored users.
    pub async fn count_users(&self) -> AppResult<i64> {
        self.repo.count().await
    }
}

fn validate_profile(name: &str, email: &str) -> AppResult<()> {
    if name.is_empty() {
        return Err(AppError::validation("name", "Name is required"));
    }
    if email.is_empty() {
        return Err(AppError::validation("email", "Email is required"));
    }
    if !is_valid_email(email) {
        return Err(AppError::validation("email", "Invalid email format"));
    }
    Ok(())
}
