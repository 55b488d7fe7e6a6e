//! Who invoked a command, where and when

use chrono::{DateTime, Utc};

use modbot_core::value_objects::{ChatId, UserId};

use super::error::{ServiceError, ServiceResult};

/// Identity of one command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub chat_id: ChatId,
    pub actor_id: UserId,
    pub language: Option<String>,
    pub now: DateTime<Utc>,
}

impl Invocation {
    pub fn new(chat_id: ChatId, actor_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            chat_id,
            actor_id,
            language: None,
            now,
        }
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn lang(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn is_private(&self) -> bool {
        self.chat_id.is_private()
    }

    /// Group-only commands refuse private chats
    pub fn require_group(&self) -> ServiceResult<()> {
        if self.is_private() {
            return Err(ServiceError::validation("This command works only inside group chats."));
        }
        Ok(())
    }

    /// Private-only commands refuse groups
    pub fn require_private(&self) -> ServiceResult<()> {
        if !self.is_private() {
            return Err(ServiceError::validation("This command works only in private messages."));
        }
        Ok(())
    }
}
