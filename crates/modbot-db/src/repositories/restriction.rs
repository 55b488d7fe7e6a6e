//! PostgreSQL implementation of CommandRestrictionRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use modbot_core::entities::CommandRestriction;
use modbot_core::traits::{CommandRestrictionRepository, RepoResult};
use modbot_core::value_objects::ChatId;

use crate::models::CommandLevelModel;

use super::error::map_db_error;

/// PostgreSQL implementation of CommandRestrictionRepository
#[derive(Clone)]
pub struct PgCommandRestrictionRepository {
    pool: PgPool,
}

impl PgCommandRestrictionRepository {
    /// Create a new PgCommandRestrictionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommandRestrictionRepository for PgCommandRestrictionRepository {
    #[instrument(skip(self))]
    async fn get(&self, chat_id: ChatId, command: &str) -> RepoResult<Option<i32>> {
        let level = sqlx::query_scalar::<_, i32>(
            r"
            SELECT level FROM command_levels WHERE chat_id = $1 AND command = $2
            ",
        )
        .bind(chat_id.into_inner())
        .bind(command)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(level)
    }

    #[instrument(skip(self))]
    async fn set(&self, chat_id: ChatId, command: &str, priority: i32) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO command_levels (chat_id, command, level)
            VALUES ($1, $2, $3)
            ON CONFLICT (chat_id, command) DO UPDATE SET level = EXCLUDED.level
            ",
        )
        .bind(chat_id.into_inner())
        .bind(command)
        .bind(priority)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self, chat_id: ChatId, command: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM command_levels WHERE chat_id = $1 AND command = $2
            ",
        )
        .bind(chat_id.into_inner())
        .bind(command)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn find_by_chat(&self, chat_id: ChatId) -> RepoResult<Vec<CommandRestriction>> {
        let results = sqlx::query_as::<_, CommandLevelModel>(
            r"
            SELECT chat_id, command, level
            FROM command_levels
            WHERE chat_id = $1
            ORDER BY command
            ",
        )
        .bind(chat_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(CommandRestriction::from).collect())
    }
}
