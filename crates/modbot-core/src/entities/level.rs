//! Explicit per-chat level assignment

use crate::value_objects::{ChatId, UserId};

/// A stored level that takes precedence over the membership-derived default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserLevelOverride {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub level: i32,
}
