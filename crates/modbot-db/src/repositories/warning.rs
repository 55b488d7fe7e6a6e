//! PostgreSQL implementation of WarningRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use modbot_core::entities::Warning;
use modbot_core::traits::{RepoResult, WarningRepository};
use modbot_core::value_objects::{ChatId, UserId};

use crate::models::WarningModel;

use super::error::map_db_error;

/// PostgreSQL implementation of WarningRepository
#[derive(Clone)]
pub struct PgWarningRepository {
    pool: PgPool,
}

impl PgWarningRepository {
    /// Create a new PgWarningRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WarningRepository for PgWarningRepository {
    #[instrument(skip(self))]
    async fn insert(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        admin_id: UserId,
        reason: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> RepoResult<Warning> {
        let model = sqlx::query_as::<_, WarningModel>(
            r"
            INSERT INTO warnings (user_id, chat_id, admin_id, reason, created_at, active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING id, user_id, chat_id, admin_id, reason, created_at, active
            ",
        )
        .bind(user_id.into_inner())
        .bind(chat_id.into_inner())
        .bind(admin_id.into_inner())
        .bind(reason)
        .bind(timestamp)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Warning::from(model))
    }

    #[instrument(skip(self))]
    async fn find_active(&self, chat_id: ChatId, user_id: UserId) -> RepoResult<Vec<Warning>> {
        let results = sqlx::query_as::<_, WarningModel>(
            r"
            SELECT id, user_id, chat_id, admin_id, reason, created_at, active
            FROM warnings
            WHERE chat_id = $1 AND user_id = $2 AND active = TRUE
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(chat_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Warning::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_active(&self, chat_id: ChatId, user_id: UserId) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM warnings
            WHERE chat_id = $1 AND user_id = $2 AND active = TRUE
            ",
        )
        .bind(chat_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(count)
    }

    #[instrument(skip(self))]
    async fn deactivate(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE warnings SET active = FALSE WHERE id = $1 AND active = TRUE
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn deactivate_for_chat(&self, chat_id: ChatId) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE warnings SET active = FALSE WHERE chat_id = $1 AND active = TRUE
            ",
        )
        .bind(chat_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
