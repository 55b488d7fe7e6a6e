//! Moderation action database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the moderation_actions table
#[derive(Debug, Clone, FromRow)]
pub struct ActionModel {
    pub id: i64,
    pub action_type: String,
    pub user_id: i64,
    pub admin_id: i64,
    pub chat_id: i64,
    pub duration_seconds: Option<i64>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
}
