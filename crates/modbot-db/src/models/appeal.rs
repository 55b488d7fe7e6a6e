//! Appeal database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the appeals table
#[derive(Debug, Clone, FromRow)]
pub struct AppealModel {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
}
