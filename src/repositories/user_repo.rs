//! User repository port and its PostgreSQL adapter.
//!
//! The service layer only ever sees `dyn UserRepository`; the diesel-async
//! adapter below is the production implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff_diesel::ToDiesel;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User, UserChanges};
use crate::schema::users;

/// Persistence capability for user records.
///
/// Implementations must be safe to share across request tasks. Dropping a
/// returned future aborts the call.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user; the store assigns the id.
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// `Ok(None)` when no user has this id.
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;

    /// `Ok(None)` when no user has this email. Errors are reserved for
    /// store failures.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn list_all(&self) -> AppResult<Vec<User>>;

    /// Overwrites name and email. Unknown ids are a no-op.
    async fn update(&self, id: &str, changes: UserChanges) -> AppResult<()>;

    /// Unknown ids are a no-op.
    async fn delete(&self, id: &str) -> AppResult<()>;

    async fn count(&self) -> AppResult<i64>;
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password: String,
    created_at: jiff_diesel::Timestamp,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id.to_string(),
            name: row.name,
            email: row.email,
            password: row.password,
            created_at: row.created_at.to_jiff(),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
struct NewUserRow {
    name: String,
    email: String,
    password: String,
    created_at: jiff_diesel::Timestamp,
}

impl From<NewUser> for NewUserRow {
    fn from(new_user: NewUser) -> Self {
        Self {
            name: new_user.name,
            email: new_user.email,
            password: new_user.password,
            created_at: new_user.created_at.to_diesel(),
        }
    }
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
struct UserChangesRow {
    name: String,
    email: String,
}

/// PostgreSQL-backed user repository.
///
/// Every query also races the process shutdown token: once shutdown begins,
/// in-flight and new calls resolve with `AppError::Cancelled`.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: AsyncDbPool,
    shutdown: CancellationToken,
}

impl PgUserRepository {
    /// Creates a new PgUserRepository with the given connection pool.
    pub fn new(pool: AsyncDbPool, shutdown: CancellationToken) -> Self {
        Self { pool, shutdown }
    }

    async fn guarded<T, F>(&self, operation: &str, query: F) -> AppResult<T>
    where
        T: Send,
        F: Future<Output = AppResult<T>> + Send,
    {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                tracing::debug!(operation = %operation, "Store call aborted by shutdown");
                Err(AppError::Cancelled { operation: operation.to_string() })
            }
            result = query => result,
        }
    }
}

/// Ids the database could never have generated match nothing.
fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        self.guarded("create user", async {
            let mut conn = self.pool.get().await?;
            diesel::insert_into(users::table)
                .values(NewUserRow::from(new_user))
                .returning(UserRow::as_returning())
                .get_result(&mut conn)
                .await
                .map(User::from)
                .map_err(|e| AppError::store("create user", e))
        })
        .await
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let Some(user_id) = parse_id(id) else {
            return Ok(None);
        };

        self.guarded("find user by id", async {
            let mut conn = self.pool.get().await?;
            users::table
                .filter(users::id.eq(user_id))
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map(|row| row.map(User::from))
                .map_err(|e| AppError::store("find user by id", e))
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.guarded("find user by email", async {
            let mut conn = self.pool.get().await?;
            users::table
                .filter(users::email.eq(email))
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map(|row| row.map(User::from))
                .map_err(|e| AppError::store("find user by email", e))
        })
        .await
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        self.guarded("list users", async {
            let mut conn = self.pool.get().await?;
            users::table
                .order(users::created_at.asc())
                .select(UserRow::as_select())
                .load(&mut conn)
                .await
                .map(|rows| rows.into_iter().map(User::from).collect())
                .map_err(|e| AppError::store("list users", e))
        })
        .await
    }

    async fn update(&self, id: &str, changes: UserChanges) -> AppResult<()> {
        let Some(user_id) = parse_id(id) else {
            return Ok(());
        };

        self.guarded("update user", async {
            let mut conn = self.pool.get().await?;
            let affected = diesel::update(users::table.filter(users::id.eq(user_id)))
                .set(UserChangesRow {
                    name: changes.name,
                    email: changes.email,
                })
                .execute(&mut conn)
                .await
                .map_err(|e| AppError::store("update user", e))?;
            tracing::debug!(user_id = %user_id, affected, "User update applied");
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let Some(user_id) = parse_id(id) else {
            return Ok(());
        };

        self.guarded("delete user", async {
            let mut conn = self.pool.get().await?;
            let affected = diesel::delete(users::table.filter(users::id.eq(user_id)))
                .execute(&mut conn)
                .await
                .map_err(|e| AppError::store("delete user", e))?;
            tracing::debug!(user_id = %user_id, affected, "User delete applied");
            Ok(())
        })
        .await
    }

    async fn count(&self) -> AppResult<i64> {
        self.guarded("count users", async {
            let mut conn = self.pool.get().await?;
            users::table
                .count()
                .get_result(&mut conn)
                .await
                .map_err(|e| AppError::store("count users", e))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_rejects_non_uuid() {
        assert!(parse_id("not-a-uuid").is_none());
        assert!(parse_id("").is_none());
    }

    #[test]
    fn test_parse_id_accepts_generated_ids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()), Some(id));
    }

    #[test]
    fn test_row_conversion_keeps_fields() {
        let id = Uuid::new_v4();
        let created_at = jiff::Timestamp::from_second(1_700_000_000).unwrap();
        let row = UserRow {
            id,
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password: "$argon2id$hash".to_string(),
            created_at: created_at.to_diesel(),
        };

        let user = User::from(row);
        assert_eq!(user.id, id.to_string());
        assert_eq!(user.name, "Ann");
        assert_eq!(user.created_at, created_at);
    }
}
