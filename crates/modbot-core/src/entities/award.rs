//! Award entity - a free-text commendation

use chrono::{DateTime, Utc};

use crate::value_objects::{ChatId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Award {
    pub id: i64,
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub admin_id: UserId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}
