//! Moderator rank entity - a named authority tier inside one chat

use std::ops::RangeInclusive;

use crate::value_objects::ChatId;

/// Levels seeded into every chat; their ids equal their levels
pub const DEFAULT_RANK_LEVELS: RangeInclusive<i32> = 0..=5;

/// Moderator rank entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeratorRank {
    pub id: i64,
    pub chat_id: ChatId,
    pub name: String,
    pub level: i32,
    pub priority: i32,
}

impl ModeratorRank {
    /// Display name used for a level that has no catalogue entry
    pub fn default_name(level: i32) -> String {
        if level == 0 {
            "Member".to_string()
        } else {
            format!("Level {level}")
        }
    }

    /// The seeded rank for a default level, if `level` is one
    pub fn default_for_level(chat_id: ChatId, level: i32) -> Option<Self> {
        DEFAULT_RANK_LEVELS
            .contains(&level)
            .then(|| Self::synthetic(chat_id, level))
    }

    /// A `Level N` rank whose priority equals its level
    pub fn synthetic(chat_id: ChatId, level: i32) -> Self {
        Self {
            id: i64::from(level),
            chat_id,
            name: Self::default_name(level),
            level,
            priority: level,
        }
    }

    /// The six default ranks of a chat
    pub fn defaults(chat_id: ChatId) -> Vec<Self> {
        DEFAULT_RANK_LEVELS
            .map(|level| Self::synthetic(chat_id, level))
            .collect()
    }

    /// Default ranks cannot be deleted
    pub fn is_default(&self) -> bool {
        DEFAULT_RANK_LEVELS.contains(&self.level) && self.id == i64::from(self.level)
    }

    /// Compare rank priorities for hierarchy (higher priority = more authority)
    #[inline]
    pub fn outranks(&self, other: &ModeratorRank) -> bool {
        self.priority > other.priority
    }
}
