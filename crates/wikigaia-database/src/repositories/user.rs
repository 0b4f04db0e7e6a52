//! User mirror repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use wikigaia_core::error::{AppError, ErrorKind};
use wikigaia_core::result::AppResult;
use wikigaia_core::types::UserId;
use wikigaia_entity::user::{User, UserRole};

use crate::store::UserStore;

/// Repository for the identity mirror.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn upsert(&self, id: UserId, email: Option<&str>, role: UserRole) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, role) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE \
             SET email = COALESCE(EXCLUDED.email, users.email), role = EXCLUDED.role, \
                 updated_at = NOW() \
             RETURNING *",
        )
        .bind(id)
        .bind(email)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert user", e))
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    async fn find_admins(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE role = 'admin' ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list admins", e))
    }
}
