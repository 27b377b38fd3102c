//! Repository layer for data access operations.
//!
//! `UserRepository` is the port; `PgUserRepository` and
//! `InMemoryUserRepository` are its adapters.

mod memory;
mod user_repo;

pub use memory::InMemoryUserRepository;
pub use user_repo::{PgUserRepository, UserRepository};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::db::AsyncDbPool;

/// Aggregates all repositories for convenient access.
///
/// Repositories are held as trait objects so services never depend on a
/// concrete store.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Builds the PostgreSQL-backed repositories.
    ///
    /// # Arguments
    /// * `pool` - The async database connection pool
    /// * `shutdown` - Process shutdown token; store calls abort once it fires
    pub fn postgres(pool: AsyncDbPool, shutdown: CancellationToken) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool, shutdown)),
        }
    }

    /// Builds repositories that keep everything in process memory.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
        }
    }
}
