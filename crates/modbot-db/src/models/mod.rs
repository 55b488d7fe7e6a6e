//! Database models - SQLx-compatible structs for PostgreSQL tables

mod action;
mod appeal;
mod award;
mod known_user;
mod level;
mod rank;
mod report;
mod restriction;
mod warning;

pub use action::ActionModel;
pub use appeal::AppealModel;
pub use award::AwardModel;
pub use known_user::KnownUserModel;
pub use level::LevelModel;
pub use rank::RankModel;
pub use report::ReportModel;
pub use restriction::CommandLevelModel;
pub use warning::WarningModel;
