//! Problem repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use wikigaia_core::error::{AppError, ErrorKind};
use wikigaia_core::result::AppResult;
use wikigaia_core::types::ProblemId;
use wikigaia_entity::problem::{CreateProblem, Problem, ProblemStatus};
use wikigaia_entity::vote::VoteType;

use crate::store::{ProblemStore, VoteCountDrift};

/// Repository for problem rows.
#[derive(Debug, Clone)]
pub struct ProblemRepository {
    pool: PgPool,
}

impl ProblemRepository {
    /// Create a new problem repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProblemStore for ProblemRepository {
    async fn create_with_creator_vote(&self, data: &CreateProblem) -> AppResult<Problem> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let id: ProblemId = sqlx::query_scalar(
            "INSERT INTO problems (title, description, category_id, proposer_id) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.category_id)
        .bind(data.proposer_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::validation("Unknown category")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create problem", e),
        })?;

        sqlx::query("INSERT INTO votes (user_id, problem_id, vote_type) VALUES ($1, $2, $3)")
            .bind(data.proposer_id)
            .bind(id)
            .bind(VoteType::CreatorInterest)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to seed creator interest", e)
            })?;

        let problem = sqlx::query_as::<_, Problem>("SELECT * FROM problems WHERE id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read problem", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit problem", e)
        })?;

        Ok(problem)
    }

    async fn find_by_id(&self, id: ProblemId) -> AppResult<Option<Problem>> {
        sqlx::query_as::<_, Problem>("SELECT * FROM problems WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find problem", e))
    }

    async fn vote_counts(&self, ids: &[ProblemId]) -> AppResult<Vec<(ProblemId, i64)>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, (ProblemId, i64)>(
            "SELECT id, vote_count FROM problems WHERE id = ANY($1) AND is_active = TRUE",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read vote counts", e))
    }

    async fn advance_status(
        &self,
        id: ProblemId,
        from: ProblemStatus,
        to: ProblemStatus,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE problems SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to advance status", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_vote_count_drift(&self) -> AppResult<Vec<VoteCountDrift>> {
        sqlx::query_as::<_, VoteCountDrift>(
            "SELECT p.id AS problem_id, p.vote_count AS stored_count, COUNT(v.id) AS actual_count \
             FROM problems p LEFT JOIN votes v ON v.problem_id = p.id \
             GROUP BY p.id, p.vote_count \
             HAVING p.vote_count <> COUNT(v.id)",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to audit vote counts", e))
    }
}
