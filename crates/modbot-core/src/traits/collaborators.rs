//! External collaborator ports
//!
//! The moderation engine talks to the chat platform, the user directory and
//! the string catalogue only through these traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{ChatId, ChatPermissions, MemberStatus, UserId};

/// Result type for messaging gateway calls
pub type GatewayResult<T> = Result<T, DomainError>;

// ============================================================================
// Messaging Gateway
// ============================================================================

/// A user's membership in a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMember {
    pub user_id: UserId,
    pub status: MemberStatus,
    pub display_name: String,
    pub username: Option<String>,
    pub is_bot: bool,
}

/// What an inline button does when pressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    Callback(String),
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    pub action: ButtonAction,
}

impl InlineButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }

    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url(url.into()),
        }
    }
}

/// Rows of inline buttons attached to a message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row, skipping empty ones
    pub fn row(mut self, buttons: Vec<InlineButton>) -> Self {
        if !buttons.is_empty() {
            self.rows.push(buttons);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every button in reading order
    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}

/// A message to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub keyboard: Option<InlineKeyboard>,
    pub reply_to: Option<i64>,
    /// Render `text` as HTML
    pub html: bool,
}

impl OutgoingMessage {
    /// HTML message without keyboard
    pub fn html(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            keyboard: None,
            reply_to: None,
            html: true,
        }
    }

    /// Plain text message without keyboard
    pub fn plain(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            html: false,
            ..Self::html(chat_id, text)
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        self.keyboard = (!keyboard.is_empty()).then_some(keyboard);
        self
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to = Some(message_id);
        self
    }
}

/// Address of a sent message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: i64,
}

#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Send a message
    async fn send_message(&self, message: OutgoingMessage) -> GatewayResult<MessageRef>;

    /// Replace text and keyboard of a sent message
    async fn edit_message(
        &self,
        target: MessageRef,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> GatewayResult<()>;

    /// Delete a message
    async fn delete_message(&self, target: MessageRef) -> GatewayResult<()>;

    /// Membership of a user in a chat
    async fn get_chat_member(&self, chat_id: ChatId, user_id: UserId) -> GatewayResult<ChatMember>;

    /// Platform-level administrators of a chat
    async fn get_chat_administrators(&self, chat_id: ChatId) -> GatewayResult<Vec<ChatMember>>;

    /// Ban a member; `None` bans permanently
    async fn ban_member(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        until: Option<DateTime<Utc>>,
    ) -> GatewayResult<()>;

    /// Restrict a member to the given permissions; `None` restricts permanently
    async fn restrict_member(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        permissions: ChatPermissions,
        until: Option<DateTime<Utc>>,
    ) -> GatewayResult<()>;

    /// Lift a ban
    async fn unban_member(&self, chat_id: ChatId, user_id: UserId) -> GatewayResult<()>;

    /// Acknowledge a button press
    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> GatewayResult<()>;
}

// ============================================================================
// User Directory
// ============================================================================

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve `@name` or `name` to a user id
    async fn resolve_username(&self, username: &str) -> GatewayResult<Option<UserId>>;

    /// Username of a user, without `@`
    async fn username_of(&self, user_id: UserId) -> GatewayResult<Option<String>>;

    /// Best display name of a user, optionally as seen in one chat
    async fn display_name(
        &self,
        chat_id: Option<ChatId>,
        user_id: UserId,
    ) -> GatewayResult<Option<String>>;

    /// Users seen in a chat
    async fn chat_users(&self, chat_id: ChatId) -> GatewayResult<Vec<UserId>>;

    /// Record a sighting of a user in a chat
    async fn record(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        username: Option<&str>,
        full_name: &str,
    ) -> GatewayResult<()>;

    /// Forget a user's membership of a chat
    async fn forget(&self, chat_id: ChatId, user_id: UserId) -> GatewayResult<()>;
}

// ============================================================================
// Localizer
// ============================================================================

/// String catalogue lookup
pub trait Localizer: Send + Sync {
    /// Translate `key` into `language`, falling back to `default`.
    /// `{name}` placeholders are filled from `args`.
    fn translate(
        &self,
        key: &str,
        language: Option<&str>,
        default: &str,
        args: &[(&str, String)],
    ) -> String;
}
