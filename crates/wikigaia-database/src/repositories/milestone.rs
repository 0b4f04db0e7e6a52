//! Milestone repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use wikigaia_core::error::{AppError, ErrorKind};
use wikigaia_core::result::AppResult;
use wikigaia_core::types::{MilestoneId, ProblemId};
use wikigaia_entity::milestone::MilestoneRecord;

use super::MILESTONE_CONSTRAINT;
use crate::store::{MilestoneClaim, MilestoneStore};

/// Repository for milestone records.
#[derive(Debug, Clone)]
pub struct MilestoneRepository {
    pool: PgPool,
}

impl MilestoneRepository {
    /// Create a new milestone repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MilestoneStore for MilestoneRepository {
    async fn claim(
        &self,
        problem_id: ProblemId,
        threshold: i64,
        stale_before: DateTime<Utc>,
    ) -> AppResult<MilestoneClaim> {
        let insert = format!(
            "INSERT INTO milestones (problem_id, threshold) VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT {MILESTONE_CONSTRAINT} DO NOTHING \
             RETURNING *"
        );
        let inserted = sqlx::query_as::<_, MilestoneRecord>(&insert)
            .bind(problem_id)
            .bind(threshold)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to claim milestone", e)
            })?;

        if let Some(record) = inserted {
            return Ok(MilestoneClaim::Claimed(record));
        }

        // At most one concurrent writer matches the stale claim.
        let taken_over = sqlx::query_as::<_, MilestoneRecord>(
            "UPDATE milestones SET claimed_at = NOW() \
             WHERE problem_id = $1 AND threshold = $2 \
               AND notification_sent = FALSE AND claimed_at < $3 \
             RETURNING *",
        )
        .bind(problem_id)
        .bind(threshold)
        .bind(stale_before)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to reclaim milestone", e)
        })?;

        if let Some(record) = taken_over {
            return Ok(MilestoneClaim::Claimed(record));
        }

        let existing = sqlx::query_as::<_, MilestoneRecord>(
            "SELECT * FROM milestones WHERE problem_id = $1 AND threshold = $2",
        )
        .bind(problem_id)
        .bind(threshold)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read milestone", e))?;

        Ok(MilestoneClaim::from_existing(existing))
    }

    async fn mark_notified(&self, id: MilestoneId) -> AppResult<()> {
        sqlx::query(
            "UPDATE milestones SET notification_sent = TRUE, notified_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark milestone notified", e)
        })?;
        Ok(())
    }

    async fn find_by_problem(&self, problem_id: ProblemId) -> AppResult<Vec<MilestoneRecord>> {
        sqlx::query_as::<_, MilestoneRecord>(
            "SELECT * FROM milestones WHERE problem_id = $1 ORDER BY threshold",
        )
        .bind(problem_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list milestones", e))
    }

    async fn find_unsent(&self, before: DateTime<Utc>) -> AppResult<Vec<MilestoneRecord>> {
        sqlx::query_as::<_, MilestoneRecord>(
            "SELECT * FROM milestones WHERE notification_sent = FALSE AND claimed_at < $1 \
             ORDER BY claimed_at",
        )
        .bind(before)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list unsent milestones", e)
        })
    }
}
