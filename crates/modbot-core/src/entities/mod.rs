//! Domain entities - core business objects

mod action;
mod appeal;
mod award;
mod level;
mod rank;
mod report;
mod restriction;
mod warning;

pub use action::{ActionType, ModerationAction, NewAction};
pub use appeal::Appeal;
pub use award::Award;
pub use level::UserLevelOverride;
pub use rank::{ModeratorRank, DEFAULT_RANK_LEVELS};
pub use report::{shorten, EntryStatus, NewReport, Report};
pub use restriction::{extract_command_name, normalize_command, CommandRestriction};
pub use warning::Warning;
