//! PostgreSQL implementation of ReportRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use modbot_core::entities::{EntryStatus, NewReport, Report};
use modbot_core::traits::{ReportRepository, RepoResult};
use modbot_core::value_objects::{ChatId, UserId};

use crate::mappers::report_from_model;
use crate::models::ReportModel;

use super::error::{map_db_error, raw_ids};

const REPORT_COLUMNS: &str = "id, chat_id, chat_title, chat_username, message_id, reporter_id, \
                              target_user_id, target_user_name, message_text, has_photo, \
                              has_video, created_at, status, closed_by_user_id, \
                              closed_by_user_name";

/// PostgreSQL implementation of ReportRepository
#[derive(Clone)]
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    /// Create a new PgReportRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn collect(models: Vec<ReportModel>) -> RepoResult<Vec<Report>> {
    models.into_iter().map(report_from_model).collect()
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    #[instrument(skip(self, report), fields(chat_id = %report.chat_id, message_id = report.message_id))]
    async fn insert(&self, report: &NewReport, created_at: DateTime<Utc>) -> RepoResult<Report> {
        let query = format!(
            r"
            INSERT INTO reports
                (chat_id, chat_title, chat_username, message_id, reporter_id, target_user_id,
                 target_user_name, message_text, has_photo, has_video, created_at, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'open')
            RETURNING {REPORT_COLUMNS}
            "
        );
        let model = sqlx::query_as::<_, ReportModel>(&query)
            .bind(report.chat_id.into_inner())
            .bind(&report.chat_title)
            .bind(&report.chat_username)
            .bind(report.message_id)
            .bind(report.reporter_id.into_inner())
            .bind(report.target_user_id.map(UserId::into_inner))
            .bind(&report.target_user_name)
            .bind(&report.message_text)
            .bind(report.has_photo)
            .bind(report.has_video)
            .bind(created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        report_from_model(model)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Report>> {
        let query = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1");
        let model = sqlx::query_as::<_, ReportModel>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        model.map(report_from_model).transpose()
    }

    #[instrument(skip(self, chat_ids))]
    async fn find_by_status(
        &self,
        status: EntryStatus,
        chat_ids: Option<&[ChatId]>,
    ) -> RepoResult<Vec<Report>> {
        let models = match chat_ids {
            Some(ids) => {
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                let query = format!(
                    r"
                    SELECT {REPORT_COLUMNS} FROM reports
                    WHERE status = $1 AND chat_id = ANY($2)
                    ORDER BY created_at DESC, id DESC
                    "
                );
                sqlx::query_as::<_, ReportModel>(&query)
                    .bind(status.as_str())
                    .bind(raw_ids(ids))
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let query = format!(
                    r"
                    SELECT {REPORT_COLUMNS} FROM reports
                    WHERE status = $1
                    ORDER BY created_at DESC, id DESC
                    "
                );
                sqlx::query_as::<_, ReportModel>(&query)
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(map_db_error)?;

        collect(models)
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        id: i64,
        status: EntryStatus,
        closed_by: Option<(UserId, &str)>,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE reports
            SET status = $2, closed_by_user_id = $3, closed_by_user_name = $4
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(closed_by.map(|(user_id, _)| user_id.into_inner()))
        .bind(closed_by.map(|(_, name)| name))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, chat_ids), fields(chats = chat_ids.len()))]
    async fn find_page(
        &self,
        chat_ids: &[ChatId],
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Report>> {
        if chat_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            r"
            SELECT {REPORT_COLUMNS} FROM reports
            WHERE chat_id = ANY($1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "
        );
        let models = sqlx::query_as::<_, ReportModel>(&query)
            .bind(raw_ids(chat_ids))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        collect(models)
    }

    #[instrument(skip(self))]
    async fn known_chat_ids(&self) -> RepoResult<Vec<ChatId>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r"
            SELECT DISTINCT chat_id FROM reports ORDER BY chat_id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids.into_iter().map(ChatId::new).collect())
    }
}
