//! Chat and user identifiers
//!
//! Both are signed 64-bit integers as handed out by the messaging platform.
//! Group chats have negative ids; supergroups and channels carry a `-100` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when an identifier cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier: {0}")]
pub struct IdParseError(pub String);

macro_rules! platform_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new id from a raw i64 value
            #[inline]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the inner i64 value
            #[inline]
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| IdParseError(s.to_string()))
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

platform_id!(
    /// Identifier of a chat (group, supergroup or private conversation)
    ChatId
);

platform_id!(
    /// Identifier of a platform user
    UserId
);

impl ChatId {
    /// Private conversations use the user's own (positive) id
    #[inline]
    pub const fn is_private(&self) -> bool {
        self.0 > 0
    }

    /// Supergroups and channels are encoded as `-100<internal id>`
    pub fn is_supergroup(&self) -> bool {
        self.0.to_string().starts_with("-100")
    }

    /// Internal id used by `t.me/c/<id>/<message>` links
    pub fn internal_link_id(&self) -> Option<String> {
        self.0
            .to_string()
            .strip_prefix("-100")
            .map(ToString::to_string)
    }
}

impl UserId {
    /// The private chat with a user shares the user's id
    #[inline]
    pub const fn private_chat(&self) -> ChatId {
        ChatId(self.0)
    }
}
