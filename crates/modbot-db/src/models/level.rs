//! Level override database model

use sqlx::FromRow;

/// Database model for the moderation_levels table
#[derive(Debug, Clone, FromRow)]
pub struct LevelModel {
    pub chat_id: i64,
    pub user_id: i64,
    pub level: i32,
}
