//! Data transfer objects for command inputs
//!
//! Free-text command arguments are copied into these request types and
//! validated before the services act on them.

pub mod requests;

pub use requests::{AddRankRequest, AppealRequest, AwardRequest, RenameRankRequest};
