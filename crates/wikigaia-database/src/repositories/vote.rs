//! Vote repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use wikigaia_core::error::{AppError, ErrorKind};
use wikigaia_core::result::AppResult;
use wikigaia_core::types::{ProblemId, UserId};
use wikigaia_entity::vote::{Vote, VoteType};

use super::{
    DUPLICATE_VOTE_CONSTRAINT, DUPLICATE_VOTE_MESSAGE, SELF_VOTE_CONSTRAINT, SELF_VOTE_MESSAGE,
};
use crate::store::VoteStore;

/// Repository for vote rows.
///
/// Only inserts and deletes are issued; the count on `problems` is kept by
/// the `votes_count_maintenance` trigger.
#[derive(Debug, Clone)]
pub struct VoteRepository {
    pool: PgPool,
}

impl VoteRepository {
    /// Create a new vote repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VoteStore for VoteRepository {
    async fn find_user_votes(
        &self,
        user_id: UserId,
        problem_id: ProblemId,
    ) -> AppResult<Vec<Vote>> {
        sqlx::query_as::<_, Vote>(
            "SELECT * FROM votes WHERE user_id = $1 AND problem_id = $2 ORDER BY created_at",
        )
        .bind(user_id)
        .bind(problem_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find votes", e))
    }

    async fn insert(
        &self,
        user_id: UserId,
        problem_id: ProblemId,
        vote_type: VoteType,
    ) -> AppResult<Vote> {
        sqlx::query_as::<_, Vote>(
            "INSERT INTO votes (user_id, problem_id, vote_type) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(user_id)
        .bind(problem_id)
        .bind(vote_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some(SELF_VOTE_CONSTRAINT) =>
            {
                AppError::rule_violation(SELF_VOTE_MESSAGE)
            }
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some(DUPLICATE_VOTE_CONSTRAINT) =>
            {
                AppError::rule_violation(DUPLICATE_VOTE_MESSAGE)
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to insert vote", e),
        })
    }

    async fn delete(
        &self,
        user_id: UserId,
        problem_id: ProblemId,
        vote_type: VoteType,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM votes WHERE user_id = $1 AND problem_id = $2 AND vote_type = $3",
        )
        .bind(user_id)
        .bind(problem_id)
        .bind(vote_type)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete vote", e))?;
        Ok(result.rows_affected() > 0)
    }
}
