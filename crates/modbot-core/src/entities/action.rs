//! Moderation action entity - one row of the moderation ledger

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::value_objects::{ChatId, UserId};

/// Kind of moderation action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Ban,
    Unban,
    Mute,
    MediaMute,
    Unmute,
    Warn,
    Unwarn,
    Kick,
    Award,
    DelReward,
}

impl ActionType {
    /// Stored name of the action type
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ban => "ban",
            Self::Unban => "unban",
            Self::Mute => "mute",
            Self::MediaMute => "mediamute",
            Self::Unmute => "unmute",
            Self::Warn => "warn",
            Self::Unwarn => "unwarn",
            Self::Kick => "kick",
            Self::Award => "award",
            Self::DelReward => "delreward",
        }
    }

    /// Ban, mute and media-mute carry live state with an expiry
    pub const fn is_timed(self) -> bool {
        matches!(self, Self::Ban | Self::Mute | Self::MediaMute)
    }

    /// Verb used in moderator log lines
    pub fn log_verb(self) -> &'static str {
        match self {
            Self::Ban => "Banned",
            Self::Unban => "Unbanned",
            Self::Mute => "Muted",
            Self::MediaMute => "Media-muted",
            Self::Unmute => "Unmuted",
            Self::Warn => "Warned",
            Self::Unwarn => "Removed warning from",
            Self::Kick => "Kicked",
            Self::Award => "Awarded",
            Self::DelReward => "Removed award from",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ban" => Ok(Self::Ban),
            "unban" => Ok(Self::Unban),
            "mute" => Ok(Self::Mute),
            "mediamute" => Ok(Self::MediaMute),
            "unmute" => Ok(Self::Unmute),
            "warn" => Ok(Self::Warn),
            "unwarn" => Ok(Self::Unwarn),
            "kick" => Ok(Self::Kick),
            "award" => Ok(Self::Award),
            "delreward" => Ok(Self::DelReward),
            other => Err(format!("unknown action type: {other}")),
        }
    }
}

/// Action to be appended to the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAction {
    pub action_type: ActionType,
    pub user_id: UserId,
    pub admin_id: UserId,
    pub chat_id: ChatId,
    pub duration: Option<Duration>,
    pub reason: Option<String>,
    pub active: bool,
}

impl NewAction {
    /// Live action (ban/mute/mediamute) that may expire
    pub fn live(
        action_type: ActionType,
        chat_id: ChatId,
        user_id: UserId,
        admin_id: UserId,
        duration: Option<Duration>,
        reason: Option<String>,
    ) -> Self {
        Self {
            action_type,
            user_id,
            admin_id,
            chat_id,
            duration,
            reason,
            active: true,
        }
    }

    /// History-only entry (kick, warn, award, unban, ...)
    pub fn history(
        action_type: ActionType,
        chat_id: ChatId,
        user_id: UserId,
        admin_id: UserId,
        reason: Option<String>,
    ) -> Self {
        Self {
            action_type,
            user_id,
            admin_id,
            chat_id,
            duration: None,
            reason,
            active: false,
        }
    }

    /// Expiry instant for timed actions; `None` means permanent or not applicable
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !self.action_type.is_timed() {
            return None;
        }
        self.duration.and_then(|d| now.checked_add_signed(d))
    }
}

/// Stored moderation action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationAction {
    pub id: i64,
    pub action_type: ActionType,
    pub user_id: UserId,
    pub admin_id: UserId,
    pub chat_id: ChatId,
    pub duration_seconds: Option<i64>,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl ModerationAction {
    /// Whether the expiry instant has been reached
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Time left until expiry; `None` for permanent actions
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expires_at
            .map(|at| (at - now).max(Duration::zero()))
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration_seconds.and_then(Duration::try_seconds)
    }
}
