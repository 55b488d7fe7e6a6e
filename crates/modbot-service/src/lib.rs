//! # modbot-service
//!
//! Application layer: the rank registry, level resolution, command gates,
//! the moderation ledger, enforcement, awards, the report/appeal review
//! workflow, argument parsing and the lost-member sweep.
//!
//! Every component borrows a [`ServiceContext`] for the duration of one
//! command; the context is built once at startup and owns all stores and
//! collaborators.

pub mod dto;
pub mod services;

pub use services::{
    ArgParser, AwardService, CommandRestrictionTable, CommandSpec, EnforcementService, EntryKey,
    ErrorKind, FallbackLocalizer, Invocation, LevelResolver, LostMemberSweep, ModLogReply,
    ModLogService, ModerationLedger, ParsedArgs, PermissionChecker, RankRegistry, ReportWorkflow,
    ReportedMessage, ReviewCallback, ReviewEntry, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult, SessionState, SessionStore, StaffService,
};
