//! Report entity - a member's complaint about a message in a group

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::value_objects::{ChatId, UserId};

/// Review status shared by reports and appeals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Open,
    Closed,
}

impl EntryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

/// Report data captured at submission time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub chat_id: ChatId,
    pub chat_title: Option<String>,
    pub chat_username: Option<String>,
    pub message_id: i64,
    pub reporter_id: UserId,
    pub target_user_id: Option<UserId>,
    pub target_user_name: Option<String>,
    pub message_text: Option<String>,
    pub has_photo: bool,
    pub has_video: bool,
}

/// Stored report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub id: i64,
    pub chat_id: ChatId,
    pub chat_title: Option<String>,
    pub chat_username: Option<String>,
    pub message_id: i64,
    pub reporter_id: UserId,
    pub target_user_id: Option<UserId>,
    pub target_user_name: Option<String>,
    pub message_text: Option<String>,
    pub has_photo: bool,
    pub has_video: bool,
    pub created_at: DateTime<Utc>,
    pub status: EntryStatus,
    pub closed_by_user_id: Option<UserId>,
    pub closed_by_user_name: Option<String>,
}

impl Report {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == EntryStatus::Open
    }

    /// Link that opens the reported message
    pub fn message_link(&self) -> String {
        if let Some(username) = self.chat_username.as_deref().filter(|u| !u.is_empty()) {
            return format!("https://t.me/{username}/{}", self.message_id);
        }
        if let Some(internal) = self.chat_id.internal_link_id() {
            return format!("https://t.me/c/{internal}/{}", self.message_id);
        }
        format!(
            "tg://openmessage?chat_id={}&message_id={}",
            self.chat_id, self.message_id
        )
    }

    /// Chat title, falling back to the numeric id
    pub fn chat_label(&self) -> String {
        self.chat_title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.chat_id.to_string())
    }

    /// Compact one-line summary with media markers, cut to `max_chars`
    pub fn summary(&self, max_chars: usize) -> String {
        let mut out = String::new();
        if self.has_photo {
            out.push_str("🖼️ ");
        }
        if self.has_video {
            out.push_str("🎞️ ");
        }
        let text = self.message_text.as_deref().unwrap_or_default();
        out.push_str(&shorten(text, max_chars));
        out.trim_end().to_string()
    }
}

/// Collapse whitespace and cut to `max_chars` characters, appending `…`
pub fn shorten(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}
