//! PostgreSQL-backed user directory
//!
//! Every inbound message records who was seen where; the directory answers
//! username lookups, display names and per-chat user lists from that table.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;

use modbot_core::traits::{GatewayResult, UserDirectory};
use modbot_core::value_objects::{ChatId, UserId};

use crate::models::KnownUserModel;

use super::error::map_db_error;

/// `known_users` table as a [`UserDirectory`]
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    /// Create a new PgUserDirectory
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Most recent sighting of a user, optionally restricted to one chat
    #[instrument(skip(self))]
    async fn latest(
        &self,
        chat_id: Option<ChatId>,
        user_id: UserId,
    ) -> GatewayResult<Option<KnownUserModel>> {
        sqlx::query_as::<_, KnownUserModel>(
            r"
            SELECT chat_id, user_id, username, full_name, last_seen
            FROM known_users
            WHERE user_id = $1 AND ($2::BIGINT IS NULL OR chat_id = $2)
            ORDER BY last_seen DESC
            LIMIT 1
            ",
        )
        .bind(user_id.into_inner())
        .bind(chat_id.map(ChatId::into_inner))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    #[instrument(skip(self))]
    async fn resolve_username(&self, username: &str) -> GatewayResult<Option<UserId>> {
        let name = username.trim().trim_start_matches('@');
        if name.is_empty() {
            return Ok(None);
        }

        let id = sqlx::query_scalar::<_, i64>(
            r"
            SELECT user_id FROM known_users
            WHERE lower(username) = lower($1)
            ORDER BY last_seen DESC
            LIMIT 1
            ",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(id.map(UserId::new))
    }

    async fn username_of(&self, user_id: UserId) -> GatewayResult<Option<String>> {
        Ok(self.latest(None, user_id).await?.and_then(|m| m.username))
    }

    async fn display_name(
        &self,
        chat_id: Option<ChatId>,
        user_id: UserId,
    ) -> GatewayResult<Option<String>> {
        let seen = match self.latest(chat_id, user_id).await? {
            Some(model) => Some(model),
            None if chat_id.is_some() => self.latest(None, user_id).await?,
            None => None,
        };
        Ok(seen.map(|m| m.full_name).filter(|name| !name.trim().is_empty()))
    }

    #[instrument(skip(self))]
    async fn chat_users(&self, chat_id: ChatId) -> GatewayResult<Vec<UserId>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r"
            SELECT user_id FROM known_users WHERE chat_id = $1 ORDER BY user_id
            ",
        )
        .bind(chat_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids.into_iter().map(UserId::new).collect())
    }

    #[instrument(skip(self))]
    async fn record(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        username: Option<&str>,
        full_name: &str,
    ) -> GatewayResult<()> {
        sqlx::query(
            r"
            INSERT INTO known_users (chat_id, user_id, username, full_name, last_seen)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (chat_id, user_id) DO UPDATE
            SET username = EXCLUDED.username,
                full_name = EXCLUDED.full_name,
                last_seen = EXCLUDED.last_seen
            ",
        )
        .bind(chat_id.into_inner())
        .bind(user_id.into_inner())
        .bind(username)
        .bind(full_name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn forget(&self, chat_id: ChatId, user_id: UserId) -> GatewayResult<()> {
        sqlx::query(
            r"
            DELETE FROM known_users WHERE chat_id = $1 AND user_id = $2
            ",
        )
        .bind(chat_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
