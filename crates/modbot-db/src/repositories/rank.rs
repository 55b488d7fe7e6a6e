//! PostgreSQL implementation of RankRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use modbot_core::entities::ModeratorRank;
use modbot_core::error::DomainError;
use modbot_core::traits::{RankRepository, RepoResult};
use modbot_core::value_objects::ChatId;

use crate::models::RankModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of RankRepository
#[derive(Clone)]
pub struct PgRankRepository {
    pool: PgPool,
}

impl PgRankRepository {
    /// Create a new PgRankRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RankRepository for PgRankRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, chat_id: ChatId, id: i64) -> RepoResult<Option<ModeratorRank>> {
        let result = sqlx::query_as::<_, RankModel>(
            r"
            SELECT chat_id, id, name, level, priority
            FROM moderator_ranks
            WHERE chat_id = $1 AND id = $2
            ",
        )
        .bind(chat_id.into_inner())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ModeratorRank::from))
    }

    #[instrument(skip(self))]
    async fn find_by_level(
        &self,
        chat_id: ChatId,
        level: i32,
    ) -> RepoResult<Option<ModeratorRank>> {
        let result = sqlx::query_as::<_, RankModel>(
            r"
            SELECT chat_id, id, name, level, priority
            FROM moderator_ranks
            WHERE chat_id = $1 AND level = $2
            ",
        )
        .bind(chat_id.into_inner())
        .bind(level)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ModeratorRank::from))
    }

    #[instrument(skip(self))]
    async fn find_by_chat(&self, chat_id: ChatId) -> RepoResult<Vec<ModeratorRank>> {
        let results = sqlx::query_as::<_, RankModel>(
            r"
            SELECT chat_id, id, name, level, priority
            FROM moderator_ranks
            WHERE chat_id = $1
            ",
        )
        .bind(chat_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(ModeratorRank::from).collect())
    }

    #[instrument(skip(self))]
    async fn replace_at_level(&self, rank: &ModeratorRank) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            DELETE FROM moderator_ranks
            WHERE chat_id = $1 AND (level = $2 OR id = $3)
            ",
        )
        .bind(rank.chat_id.into_inner())
        .bind(rank.level)
        .bind(rank.id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO moderator_ranks (chat_id, id, name, level, priority)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(rank.chat_id.into_inner())
        .bind(rank.id)
        .bind(&rank.name)
        .bind(rank.level)
        .bind(rank.priority)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_next(
        &self,
        chat_id: ChatId,
        name: &str,
        priority: i32,
    ) -> RepoResult<ModeratorRank> {
        let result = sqlx::query_as::<_, RankModel>(
            r"
            INSERT INTO moderator_ranks (chat_id, id, name, level, priority)
            SELECT $1,
                   COALESCE(MAX(id), 5) + 1,
                   $2,
                   COALESCE(MAX(level), 5) + 1,
                   $3
            FROM moderator_ranks
            WHERE chat_id = $1
            RETURNING chat_id, id, name, level, priority
            ",
        )
        .bind(chat_id.into_inner())
        .bind(name)
        .bind(priority)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::InternalError("concurrent rank creation, retry".to_string())
            })
        })?;

        Ok(ModeratorRank::from(result))
    }

    #[instrument(skip(self))]
    async fn rename(&self, chat_id: ChatId, id: i64, name: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE moderator_ranks SET name = $3
            WHERE chat_id = $1 AND id = $2
            ",
        )
        .bind(chat_id.into_inner())
        .bind(id)
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete(&self, chat_id: ChatId, id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM moderator_ranks WHERE chat_id = $1 AND id = $2
            ",
        )
        .bind(chat_id.into_inner())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
