//! Inbound update model
//!
//! The subset of the Bot API `Update` object the moderation modules read.

mod command;
mod entities;

pub use command::Command;
pub use entities::expand_text_links;

use modbot_core::value_objects::{ChatId, UserId};
use modbot_core::MessageRef;
use modbot_service::ReportedMessage;
use serde::Deserialize;

/// One webhook delivery
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub edited_message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

impl Update {
    /// Short name of the payload kind, for logs
    pub fn kind(&self) -> &'static str {
        if self.message.is_some() {
            "message"
        } else if self.edited_message.is_some() {
            "edited_message"
        } else if self.callback_query.is_some() {
            "callback_query"
        } else {
            "other"
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

impl User {
    pub fn user_id(&self) -> UserId {
        UserId::new(self.id)
    }

    /// First and last name joined
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref().filter(|l| !l.is_empty()) {
            Some(last) => format!("{} {last}", self.first_name),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl Chat {
    pub fn chat_id(&self) -> ChatId {
        ChatId::new(self.id)
    }

    pub fn is_private(&self) -> bool {
        self.kind == "private"
    }
}

/// Formatting span inside a text or caption. Offsets count UTF-16 code units.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: usize,
    pub length: usize,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileRef {
    pub file_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub entities: Vec<MessageEntity>,
    #[serde(default)]
    pub caption_entities: Vec<MessageEntity>,
    #[serde(default)]
    pub photo: Vec<FileRef>,
    #[serde(default)]
    pub video: Option<FileRef>,
    #[serde(default)]
    pub reply_to_message: Option<Box<Message>>,
}

impl Message {
    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            chat_id: self.chat.chat_id(),
            message_id: self.message_id,
        }
    }

    /// Text, or the caption of a media message
    pub fn text_or_caption(&self) -> Option<&str> {
        self.text.as_deref().or(self.caption.as_deref())
    }

    /// Text or caption with `text_link` entities spelled out as `label (url)`
    pub fn expanded_text(&self) -> Option<String> {
        match (&self.text, &self.caption) {
            (Some(text), _) => Some(expand_text_links(text, &self.entities)),
            (None, Some(caption)) => Some(expand_text_links(caption, &self.caption_entities)),
            (None, None) => None,
        }
    }

    /// Leading `/command`, if any
    pub fn command(&self, bot_username: &str) -> Option<Command> {
        Command::parse(self.text.as_deref()?, bot_username)
    }

    /// Author of the replied-to message
    pub fn reply_author(&self) -> Option<&User> {
        self.reply_to_message.as_ref()?.from.as_ref()
    }

    /// Snapshot of the replied-to message for `/report`
    pub fn reported_message(&self) -> Option<ReportedMessage> {
        let target = self.reply_to_message.as_deref()?;
        let author = target.from.as_ref();
        Some(ReportedMessage {
            chat_title: self.chat.title.clone(),
            chat_username: self.chat.username.clone(),
            message_id: target.message_id,
            author_id: author.map(User::user_id),
            author_name: author.map(User::full_name),
            author_is_bot: author.is_some_and(|a| a.is_bot),
            text: target.expanded_text(),
            has_photo: !target.photo.is_empty(),
            has_video: target.video.is_some(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}
