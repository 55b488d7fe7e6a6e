//! PostgreSQL implementation of AwardRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use modbot_core::entities::Award;
use modbot_core::traits::{AwardRepository, RepoResult};
use modbot_core::value_objects::{ChatId, UserId};

use crate::models::AwardModel;

use super::error::map_db_error;

/// PostgreSQL implementation of AwardRepository
#[derive(Clone)]
pub struct PgAwardRepository {
    pool: PgPool,
}

impl PgAwardRepository {
    /// Create a new PgAwardRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AwardRepository for PgAwardRepository {
    #[instrument(skip(self, text))]
    async fn insert(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        admin_id: UserId,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> RepoResult<Award> {
        let model = sqlx::query_as::<_, AwardModel>(
            r"
            INSERT INTO awards (chat_id, user_id, admin_id, text, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, chat_id, user_id, admin_id, text, created_at
            ",
        )
        .bind(chat_id.into_inner())
        .bind(user_id.into_inner())
        .bind(admin_id.into_inner())
        .bind(text)
        .bind(timestamp)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Award::from(model))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Award>> {
        let result = sqlx::query_as::<_, AwardModel>(
            r"
            SELECT id, chat_id, user_id, admin_id, text, created_at
            FROM awards
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Award::from))
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, chat_id: ChatId, user_id: UserId) -> RepoResult<Vec<Award>> {
        let results = sqlx::query_as::<_, AwardModel>(
            r"
            SELECT id, chat_id, user_id, admin_id, text, created_at
            FROM awards
            WHERE chat_id = $1 AND user_id = $2
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(chat_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Award::from).collect())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM awards WHERE id = $1
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
