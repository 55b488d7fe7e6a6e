//! Report database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the reports table
#[derive(Debug, Clone, FromRow)]
pub struct ReportModel {
    pub id: i64,
    pub chat_id: i64,
    pub chat_title: Option<String>,
    pub chat_username: Option<String>,
    pub message_id: i64,
    pub reporter_id: i64,
    pub target_user_id: Option<i64>,
    pub target_user_name: Option<String>,
    pub message_text: Option<String>,
    pub has_photo: bool,
    pub has_video: bool,
    pub created_at: DateTime<Utc>,
    pub status: String,
    pub closed_by_user_id: Option<i64>,
    pub closed_by_user_name: Option<String>,
}
