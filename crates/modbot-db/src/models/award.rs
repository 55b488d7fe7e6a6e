//! Award database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the awards table
#[derive(Debug, Clone, FromRow)]
pub struct AwardModel {
    pub id: i64,
    pub chat_id: i64,
    pub user_id: i64,
    pub admin_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
