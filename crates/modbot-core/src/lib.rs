//! # modbot-core
//!
//! Domain layer for the moderation engine: ranks, level overrides, command
//! restrictions, the moderation ledger entities, reports and appeals.
//! Repository traits and collaborator ports live here as well; this crate has
//! zero dependencies on infrastructure (database, HTTP, bot transport).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    extract_command_name, normalize_command, shorten, ActionType, Appeal, Award,
    CommandRestriction, EntryStatus, ModerationAction, ModeratorRank, NewAction, NewReport, Report,
    UserLevelOverride, Warning, DEFAULT_RANK_LEVELS,
};
pub use error::DomainError;
pub use traits::{
    ActionRepository, AppealRepository, AwardRepository, ButtonAction, ChatMember,
    CommandRestrictionRepository, GatewayResult, InlineButton, InlineKeyboard, LevelRepository,
    Localizer, MessageRef, MessagingGateway, OutgoingMessage, RankRepository, RepoResult,
    ReportRepository, UserDirectory, WarningRepository,
};
pub use value_objects::{
    format_duration, format_seconds, parse_duration, ChatId, ChatPermissions, DurationToken,
    MemberStatus, UserId,
};
