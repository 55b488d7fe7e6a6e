//! Warning database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the warnings table
#[derive(Debug, Clone, FromRow)]
pub struct WarningModel {
    pub id: i64,
    pub user_id: i64,
    pub chat_id: i64,
    pub admin_id: i64,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}
