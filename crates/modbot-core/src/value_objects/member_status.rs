//! Chat membership status as reported by the messaging platform

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Membership status of a user in a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MemberStatus {
    /// Level granted when no explicit override is stored
    pub const fn default_level(self) -> i32 {
        match self {
            Self::Creator => 5,
            Self::Administrator => 3,
            Self::Member | Self::Restricted | Self::Left | Self::Kicked => 0,
        }
    }

    /// Whether the user is still part of the chat
    pub const fn is_present(self) -> bool {
        !matches!(self, Self::Left | Self::Kicked)
    }

    /// Platform-level administrators (owner included)
    pub const fn is_chat_admin(self) -> bool {
        matches!(self, Self::Creator | Self::Administrator)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Administrator => "administrator",
            Self::Member => "member",
            Self::Restricted => "restricted",
            Self::Left => "left",
            Self::Kicked => "kicked",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "creator" | "owner" => Ok(Self::Creator),
            "administrator" => Ok(Self::Administrator),
            "member" => Ok(Self::Member),
            "restricted" | "limited" => Ok(Self::Restricted),
            "left" => Ok(Self::Left),
            "kicked" | "banned" => Ok(Self::Kicked),
            other => Err(format!("unknown member status: {other}")),
        }
    }
}
