//! Moderator rank database model

use sqlx::FromRow;

/// Database model for the moderator_ranks table
#[derive(Debug, Clone, FromRow)]
pub struct RankModel {
    pub chat_id: i64,
    pub id: i64,
    pub name: String,
    pub level: i32,
    pub priority: i32,
}
