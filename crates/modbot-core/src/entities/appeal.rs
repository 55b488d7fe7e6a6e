//! Appeal entity - a private request to reconsider a punishment

use chrono::{DateTime, Utc};

use super::report::EntryStatus;
use crate::value_objects::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appeal {
    pub id: i64,
    pub user_id: UserId,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub status: EntryStatus,
}

impl Appeal {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == EntryStatus::Open
    }

    /// Deep link that opens a private conversation with the appellant
    pub fn user_link(&self) -> String {
        format!("tg://user?id={}", self.user_id)
    }
}
