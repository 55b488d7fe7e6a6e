//! PostgreSQL implementation of ActionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use modbot_core::entities::{ActionType, ModerationAction, NewAction};
use modbot_core::traits::{ActionRepository, RepoResult};
use modbot_core::value_objects::{ChatId, UserId};

use crate::mappers::action_from_model;
use crate::models::ActionModel;

use super::error::{map_db_error, raw_ids};

const ACTION_COLUMNS: &str = "id, action_type, user_id, admin_id, chat_id, duration_seconds, \
                              reason, created_at, expires_at, active";

/// PostgreSQL implementation of ActionRepository
#[derive(Clone)]
pub struct PgActionRepository {
    pool: PgPool,
}

impl PgActionRepository {
    /// Create a new PgActionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn collect(models: Vec<ActionModel>) -> RepoResult<Vec<ModerationAction>> {
    models.into_iter().map(action_from_model).collect()
}

#[async_trait]
impl ActionRepository for PgActionRepository {
    #[instrument(skip(self, action), fields(action_type = %action.action_type, chat_id = %action.chat_id))]
    async fn insert(
        &self,
        action: &NewAction,
        timestamp: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> RepoResult<ModerationAction> {
        let query = format!(
            r"
            INSERT INTO moderation_actions
                (action_type, user_id, admin_id, chat_id, duration_seconds, reason,
                 created_at, expires_at, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ACTION_COLUMNS}
            "
        );
        let model = sqlx::query_as::<_, ActionModel>(&query)
            .bind(action.action_type.as_str())
            .bind(action.user_id.into_inner())
            .bind(action.admin_id.into_inner())
            .bind(action.chat_id.into_inner())
            .bind(action.duration.map(|d| d.num_seconds()))
            .bind(&action.reason)
            .bind(timestamp)
            .bind(expires_at)
            .bind(action.active)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        action_from_model(model)
    }

    #[instrument(skip(self))]
    async fn find_active(
        &self,
        chat_id: ChatId,
        action_type: ActionType,
    ) -> RepoResult<Vec<ModerationAction>> {
        let query = format!(
            r"
            SELECT {ACTION_COLUMNS}
            FROM moderation_actions
            WHERE chat_id = $1 AND action_type = $2 AND active = TRUE
            ORDER BY created_at DESC, id DESC
            "
        );
        let models = sqlx::query_as::<_, ActionModel>(&query)
            .bind(chat_id.into_inner())
            .bind(action_type.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        collect(models)
    }

    #[instrument(skip(self))]
    async fn deactivate_ids(&self, ids: &[i64]) -> RepoResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r"
            UPDATE moderation_actions SET active = FALSE
            WHERE id = ANY($1) AND active = TRUE
            ",
        )
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn deactivate_for_user(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        action_type: ActionType,
    ) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE moderation_actions SET active = FALSE
            WHERE chat_id = $1 AND user_id = $2 AND action_type = $3 AND active = TRUE
            ",
        )
        .bind(chat_id.into_inner())
        .bind(user_id.into_inner())
        .bind(action_type.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn deactivate_for_chat(
        &self,
        chat_id: ChatId,
        action_type: ActionType,
    ) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE moderation_actions SET active = FALSE
            WHERE chat_id = $1 AND action_type = $2 AND active = TRUE
            ",
        )
        .bind(chat_id.into_inner())
        .bind(action_type.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self, chat_ids), fields(chats = chat_ids.len()))]
    async fn find_page(
        &self,
        chat_ids: &[ChatId],
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<ModerationAction>> {
        if chat_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            r"
            SELECT {ACTION_COLUMNS}
            FROM moderation_actions
            WHERE chat_id = ANY($1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "
        );
        let models = sqlx::query_as::<_, ActionModel>(&query)
            .bind(raw_ids(chat_ids))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        collect(models)
    }

    #[instrument(skip(self))]
    async fn user_ids_for_chat(&self, chat_id: ChatId) -> RepoResult<Vec<UserId>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r"
            SELECT DISTINCT user_id FROM moderation_actions WHERE chat_id = $1
            UNION
            SELECT DISTINCT user_id FROM warnings WHERE chat_id = $1
            ",
        )
        .bind(chat_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids.into_iter().map(UserId::new).collect())
    }

    #[instrument(skip(self))]
    async fn known_chat_ids(&self) -> RepoResult<Vec<ChatId>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r"
            SELECT DISTINCT chat_id FROM moderation_actions ORDER BY chat_id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids.into_iter().map(ChatId::new).collect())
    }
}
