//! Moderation services
//!
//! Each service is a thin borrow of the [`ServiceContext`]: construct it per
//! command, call one operation, drop it.

pub mod args;
pub mod award;
pub mod commands;
pub mod context;
pub mod enforcement;
pub mod error;
pub mod format;
pub mod i18n;
pub mod invocation;
pub mod ledger;
pub mod level;
pub mod modlogs;
pub mod permission;
pub mod rank;
pub mod report;
pub mod restriction;
pub mod session;
pub mod staff;
pub mod sweep;

// Re-export all services for convenience
pub use args::{parse_user_id, ArgParser, ParsedArgs};
pub use award::AwardService;
pub use commands::CommandSpec;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use enforcement::EnforcementService;
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use i18n::FallbackLocalizer;
pub use invocation::Invocation;
pub use ledger::{ActionPage, ModerationLedger, WarnOutcome, ESCALATION_REASON};
pub use level::LevelResolver;
pub use modlogs::{ModLogPage, ModLogReply, ModLogService};
pub use permission::{Clearance, PermissionChecker};
pub use rank::RankRegistry;
pub use report::{RenderedPage, ReportWorkflow, ReportedMessage, ReviewCallback, ReviewView};
pub use restriction::CommandRestrictionTable;
pub use session::{EntryKey, ReviewEntry, ReviewSession, SessionState, SessionStore};
pub use staff::StaffService;
pub use sweep::{LostMemberSweep, SweepReport};
