//! Command restriction database model

use sqlx::FromRow;

/// Database model for the command_levels table
#[derive(Debug, Clone, FromRow)]
pub struct CommandLevelModel {
    pub chat_id: i64,
    pub command: String,
    pub level: i32,
}
