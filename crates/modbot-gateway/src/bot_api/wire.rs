//! Bot API request and response shapes

use modbot_core::{ButtonAction, ChatMember, InlineKeyboard, MemberStatus};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::update::User;

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ApiChatMember {
    pub status: String,
    pub user: User,
}

impl From<ApiChatMember> for ChatMember {
    fn from(member: ApiChatMember) -> Self {
        let status = member.status.parse().unwrap_or_else(|e| {
            warn!(error = %e, "Unknown member status, treating as member");
            MemberStatus::Member
        });
        Self {
            user_id: member.user.user_id(),
            status,
            display_name: member.user.full_name(),
            username: member.user.username.clone(),
            is_bot: member.user.is_bot,
        }
    }
}

/// `reply_markup` object for an inline keyboard
pub fn inline_markup(keyboard: &InlineKeyboard) -> Value {
    let rows: Vec<Vec<Value>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| match &button.action {
                    ButtonAction::Callback(data) => json!({"text": button.text, "callback_data": data}),
                    ButtonAction::Url(url) => json!({"text": button.text, "url": url}),
                })
                .collect()
        })
        .collect();
    json!({ "inline_keyboard": rows })
}
