//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. One logical store per concern: ranks,
//! levels, command restrictions, and the moderation ledger tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    ActionType, Appeal, Award, CommandRestriction, EntryStatus, ModerationAction, ModeratorRank,
    NewAction, NewReport, Report, UserLevelOverride, Warning,
};
use crate::error::DomainError;
use crate::value_objects::{ChatId, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Rank Repository
// ============================================================================

#[async_trait]
pub trait RankRepository: Send + Sync {
    /// Find rank by its per-chat id
    async fn find_by_id(&self, chat_id: ChatId, id: i64) -> RepoResult<Option<ModeratorRank>>;

    /// Find the rank occupying a level
    async fn find_by_level(&self, chat_id: ChatId, level: i32)
        -> RepoResult<Option<ModeratorRank>>;

    /// List all ranks of a chat (unordered)
    async fn find_by_chat(&self, chat_id: ChatId) -> RepoResult<Vec<ModeratorRank>>;

    /// Make `rank` the only row at `(chat_id, level)`, replacing whatever held it
    async fn replace_at_level(&self, rank: &ModeratorRank) -> RepoResult<()>;

    /// Insert a custom rank at the next free level (and id) above the current maximum
    async fn create_next(
        &self,
        chat_id: ChatId,
        name: &str,
        priority: i32,
    ) -> RepoResult<ModeratorRank>;

    /// Rename a rank, returns false if it does not exist
    async fn rename(&self, chat_id: ChatId, id: i64, name: &str) -> RepoResult<bool>;

    /// Delete a rank, returns false if it does not exist
    async fn delete(&self, chat_id: ChatId, id: i64) -> RepoResult<bool>;
}

// ============================================================================
// Level Repository
// ============================================================================

#[async_trait]
pub trait LevelRepository: Send + Sync {
    /// Stored level override for a user
    async fn get(&self, chat_id: ChatId, user_id: UserId) -> RepoResult<Option<i32>>;

    /// Insert or update a level override
    async fn set(&self, chat_id: ChatId, user_id: UserId, level: i32) -> RepoResult<()>;

    /// Remove an override, returns false if none was stored
    async fn clear(&self, chat_id: ChatId, user_id: UserId) -> RepoResult<bool>;

    /// Remove every override pointing at a level
    async fn clear_level(&self, chat_id: ChatId, level: i32) -> RepoResult<u64>;

    /// All overrides stored for a chat
    async fn find_by_chat(&self, chat_id: ChatId) -> RepoResult<Vec<UserLevelOverride>>;

    /// All overrides held by a user across chats
    async fn find_by_user(&self, user_id: UserId) -> RepoResult<Vec<UserLevelOverride>>;
}

// ============================================================================
// Command Restriction Repository
// ============================================================================

#[async_trait]
pub trait CommandRestrictionRepository: Send + Sync {
    /// Required priority override for a normalized command name
    async fn get(&self, chat_id: ChatId, command: &str) -> RepoResult<Option<i32>>;

    /// Insert or update an override
    async fn set(&self, chat_id: ChatId, command: &str, priority: i32) -> RepoResult<()>;

    /// Remove an override, returns false if none was stored
    async fn clear(&self, chat_id: ChatId, command: &str) -> RepoResult<bool>;

    /// All overrides of a chat
    async fn find_by_chat(&self, chat_id: ChatId) -> RepoResult<Vec<CommandRestriction>>;
}

// ============================================================================
// Moderation Action Repository
// ============================================================================

#[async_trait]
pub trait ActionRepository: Send + Sync {
    /// Append an action
    async fn insert(
        &self,
        action: &NewAction,
        timestamp: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> RepoResult<ModerationAction>;

    /// Active rows of a type, newest first (timestamp DESC, id DESC)
    async fn find_active(
        &self,
        chat_id: ChatId,
        action_type: ActionType,
    ) -> RepoResult<Vec<ModerationAction>>;

    /// Mark rows inactive by id
    async fn deactivate_ids(&self, ids: &[i64]) -> RepoResult<u64>;

    /// Mark every active row of a type for one user inactive
    async fn deactivate_for_user(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        action_type: ActionType,
    ) -> RepoResult<u64>;

    /// Mark every active row of a type in a chat inactive
    async fn deactivate_for_chat(&self, chat_id: ChatId, action_type: ActionType)
        -> RepoResult<u64>;

    /// History across chats, newest first
    async fn find_page(
        &self,
        chat_ids: &[ChatId],
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<ModerationAction>>;

    /// Distinct users that appear in a chat's ledger
    async fn user_ids_for_chat(&self, chat_id: ChatId) -> RepoResult<Vec<UserId>>;

    /// Distinct chats that have ledger entries
    async fn known_chat_ids(&self) -> RepoResult<Vec<ChatId>>;
}

// ============================================================================
// Warning Repository
// ============================================================================

#[async_trait]
pub trait WarningRepository: Send + Sync {
    /// Store an active warning
    async fn insert(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        admin_id: UserId,
        reason: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> RepoResult<Warning>;

    /// Active warnings of a user, newest first
    async fn find_active(&self, chat_id: ChatId, user_id: UserId) -> RepoResult<Vec<Warning>>;

    /// Number of active warnings of a user
    async fn count_active(&self, chat_id: ChatId, user_id: UserId) -> RepoResult<i64>;

    /// Deactivate a single warning
    async fn deactivate(&self, id: i64) -> RepoResult<bool>;

    /// Deactivate every active warning of a chat
    async fn deactivate_for_chat(&self, chat_id: ChatId) -> RepoResult<u64>;
}

// ============================================================================
// Award Repository
// ============================================================================

#[async_trait]
pub trait AwardRepository: Send + Sync {
    /// Store an award
    async fn insert(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        admin_id: UserId,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> RepoResult<Award>;

    /// Find award by ID
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Award>>;

    /// Awards of a user in a chat, newest first
    async fn find_by_user(&self, chat_id: ChatId, user_id: UserId) -> RepoResult<Vec<Award>>;

    /// Delete an award, returns false if it does not exist
    async fn delete(&self, id: i64) -> RepoResult<bool>;
}

// ============================================================================
// Report Repository
// ============================================================================

#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Store a new open report
    async fn insert(&self, report: &NewReport, created_at: DateTime<Utc>) -> RepoResult<Report>;

    /// Find report by ID
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Report>>;

    /// Reports with a status, optionally limited to chats, newest first
    async fn find_by_status(
        &self,
        status: EntryStatus,
        chat_ids: Option<&[ChatId]>,
    ) -> RepoResult<Vec<Report>>;

    /// Change status; `closed_by` is written as given (None clears it)
    async fn update_status(
        &self,
        id: i64,
        status: EntryStatus,
        closed_by: Option<(UserId, &str)>,
    ) -> RepoResult<bool>;

    /// All reports of the given chats regardless of status, newest first
    async fn find_page(
        &self,
        chat_ids: &[ChatId],
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Report>>;

    /// Distinct chats that have reports
    async fn known_chat_ids(&self) -> RepoResult<Vec<ChatId>>;
}

// ============================================================================
// Appeal Repository
// ============================================================================

#[async_trait]
pub trait AppealRepository: Send + Sync {
    /// Store a new open appeal
    async fn insert(
        &self,
        user_id: UserId,
        description: &str,
        created_at: DateTime<Utc>,
    ) -> RepoResult<Appeal>;

    /// Find appeal by ID
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Appeal>>;

    /// Appeals with a status, newest first
    async fn find_by_status(&self, status: EntryStatus) -> RepoResult<Vec<Appeal>>;

    /// Change status
    async fn update_status(&self, id: i64, status: EntryStatus) -> RepoResult<bool>;
}
