//! In-memory user repository.
//!
//! Backs unit and router tests and can stand in for PostgreSQL when
//! experimenting locally. Records live in insertion order behind an async
//! `RwLock`.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{NewUser, User, UserChanges};
use crate::repositories::UserRepository;

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let user = new_user.into_user(Uuid::new_v4().to_string());
        self.users.write().await.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn update(&self, id: &str, changes: UserChanges) -> AppResult<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.name = changes.name;
            user.email = changes.email;
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.users.write().await.retain(|u| u.id != id);
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.users.read().await.len() as i64)
    }
}
