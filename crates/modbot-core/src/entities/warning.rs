//! Warning entity

use chrono::{DateTime, Utc};

use crate::value_objects::{ChatId, UserId};

/// A warning issued to a chat member; active warnings count toward escalation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub id: i64,
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub admin_id: UserId,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub active: bool,
}
