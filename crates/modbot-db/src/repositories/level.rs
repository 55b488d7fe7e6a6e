//! PostgreSQL implementation of LevelRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use modbot_core::entities::UserLevelOverride;
use modbot_core::traits::{LevelRepository, RepoResult};
use modbot_core::value_objects::{ChatId, UserId};

use crate::models::LevelModel;

use super::error::map_db_error;

/// PostgreSQL implementation of LevelRepository
#[derive(Clone)]
pub struct PgLevelRepository {
    pool: PgPool,
}

impl PgLevelRepository {
    /// Create a new PgLevelRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LevelRepository for PgLevelRepository {
    #[instrument(skip(self))]
    async fn get(&self, chat_id: ChatId, user_id: UserId) -> RepoResult<Option<i32>> {
        let level = sqlx::query_scalar::<_, i32>(
            r"
            SELECT level FROM moderation_levels WHERE chat_id = $1 AND user_id = $2
            ",
        )
        .bind(chat_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(level)
    }

    #[instrument(skip(self))]
    async fn set(&self, chat_id: ChatId, user_id: UserId, level: i32) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO moderation_levels (chat_id, user_id, level)
            VALUES ($1, $2, $3)
            ON CONFLICT (chat_id, user_id) DO UPDATE SET level = EXCLUDED.level
            ",
        )
        .bind(chat_id.into_inner())
        .bind(user_id.into_inner())
        .bind(level)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self, chat_id: ChatId, user_id: UserId) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM moderation_levels WHERE chat_id = $1 AND user_id = $2
            ",
        )
        .bind(chat_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn clear_level(&self, chat_id: ChatId, level: i32) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM moderation_levels WHERE chat_id = $1 AND level = $2
            ",
        )
        .bind(chat_id.into_inner())
        .bind(level)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn find_by_chat(&self, chat_id: ChatId) -> RepoResult<Vec<UserLevelOverride>> {
        let results = sqlx::query_as::<_, LevelModel>(
            r"
            SELECT chat_id, user_id, level
            FROM moderation_levels
            WHERE chat_id = $1
            ORDER BY level DESC, user_id ASC
            ",
        )
        .bind(chat_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(UserLevelOverride::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: UserId) -> RepoResult<Vec<UserLevelOverride>> {
        let results = sqlx::query_as::<_, LevelModel>(
            r"
            SELECT chat_id, user_id, level
            FROM moderation_levels
            WHERE user_id = $1
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(UserLevelOverride::from).collect())
    }
}
