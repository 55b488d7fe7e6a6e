//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in modbot-core.
//! Each repository handles database operations for one store.

mod action;
mod appeal;
mod award;
mod directory;
mod error;
mod level;
mod rank;
mod report;
mod restriction;
mod warning;

pub use action::PgActionRepository;
pub use appeal::PgAppealRepository;
pub use award::PgAwardRepository;
pub use directory::PgUserDirectory;
pub use level::PgLevelRepository;
pub use rank::PgRankRepository;
pub use report::PgReportRepository;
pub use restriction::PgCommandRestrictionRepository;
pub use warning::PgWarningRepository;
