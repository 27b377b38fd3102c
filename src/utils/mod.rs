//! Cross-cutting helpers: password hashing, bearer tokens and input checks.

pub mod jwt;
pub mod password;
pub mod validate;
