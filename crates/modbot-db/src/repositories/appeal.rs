//! PostgreSQL implementation of AppealRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use modbot_core::entities::{Appeal, EntryStatus};
use modbot_core::traits::{AppealRepository, RepoResult};
use modbot_core::value_objects::UserId;

use crate::mappers::appeal_from_model;
use crate::models::AppealModel;

use super::error::map_db_error;

/// PostgreSQL implementation of AppealRepository
#[derive(Clone)]
pub struct PgAppealRepository {
    pool: PgPool,
}

impl PgAppealRepository {
    /// Create a new PgAppealRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppealRepository for PgAppealRepository {
    #[instrument(skip(self, description))]
    async fn insert(
        &self,
        user_id: UserId,
        description: &str,
        created_at: DateTime<Utc>,
    ) -> RepoResult<Appeal> {
        let model = sqlx::query_as::<_, AppealModel>(
            r"
            INSERT INTO appeals (user_id, description, created_at, status)
            VALUES ($1, $2, $3, 'open')
            RETURNING id, user_id, description, created_at, status
            ",
        )
        .bind(user_id.into_inner())
        .bind(description)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        appeal_from_model(model)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Appeal>> {
        let model = sqlx::query_as::<_, AppealModel>(
            r"
            SELECT id, user_id, description, created_at, status
            FROM appeals
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        model.map(appeal_from_model).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_status(&self, status: EntryStatus) -> RepoResult<Vec<Appeal>> {
        let models = sqlx::query_as::<_, AppealModel>(
            r"
            SELECT id, user_id, description, created_at, status
            FROM appeals
            WHERE status = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        models.into_iter().map(appeal_from_model).collect()
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: i64, status: EntryStatus) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE appeals SET status = $2 WHERE id = $1
            ",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
