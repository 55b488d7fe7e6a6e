//! Known user database model (user directory)

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the known_users table
#[derive(Debug, Clone, FromRow)]
pub struct KnownUserModel {
    pub chat_id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub full_name: String,
    pub last_seen: DateTime<Utc>,
}
