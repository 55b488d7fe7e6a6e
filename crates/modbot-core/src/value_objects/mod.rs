//! Value objects - immutable types that represent domain concepts

mod chat_permissions;
mod duration;
mod ids;
mod member_status;

pub use chat_permissions::ChatPermissions;
pub use duration::{format_duration, format_seconds, parse_duration, DurationToken};
pub use ids::{ChatId, IdParseError, UserId};
pub use member_status::MemberStatus;
