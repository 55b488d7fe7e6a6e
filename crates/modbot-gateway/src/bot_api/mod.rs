//! Bot API client
//!
//! [`MessagingGateway`] over the HTTPS Bot API. Every call is a JSON `POST`
//! to `{api_url}/bot{token}/{method}`; API failures surface as
//! `DomainError::TransportError` carrying the API's description.

mod wire;

pub use wire::inline_markup;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use modbot_common::{AppError, BotConfig};
use modbot_core::value_objects::{ChatId, ChatPermissions, UserId};
use modbot_core::{
    ChatMember, DomainError, GatewayResult, InlineKeyboard, MessageRef, MessagingGateway,
    OutgoingMessage,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use wire::{ApiChatMember, ApiResponse, SentMessage};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct BotApiGateway {
    client: Client,
    /// `{api_url}/bot{token}`
    base_url: String,
}

impl BotApiGateway {
    pub fn new(config: &BotConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::ExternalService(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", config.api_url.trim_end_matches('/'), config.token),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, payload: Value) -> GatewayResult<T> {
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| DomainError::transport(format!("{method}: {}", e.without_url())))?;

        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| DomainError::transport(format!("{method}: malformed response: {}", e.without_url())))?;

        match body {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                description, error_code, ..
            } => {
                let description = description.unwrap_or_else(|| "unknown error".to_string());
                debug!(method, ?error_code, %description, "Bot API call failed");
                Err(DomainError::transport(description))
            }
        }
    }
}

fn unix_until(until: Option<DateTime<Utc>>) -> Value {
    until.map_or(Value::Null, |at| json!(at.timestamp()))
}

#[async_trait]
impl MessagingGateway for BotApiGateway {
    #[instrument(skip(self, message), fields(chat_id = %message.chat_id))]
    async fn send_message(&self, message: OutgoingMessage) -> GatewayResult<MessageRef> {
        let mut payload = json!({
            "chat_id": message.chat_id.into_inner(),
            "text": message.text,
            "link_preview_options": {"is_disabled": true},
        });
        if message.html {
            payload["parse_mode"] = json!("HTML");
        }
        if let Some(keyboard) = &message.keyboard {
            payload["reply_markup"] = inline_markup(keyboard);
        }
        if let Some(reply_to) = message.reply_to {
            payload["reply_parameters"] = json!({
                "message_id": reply_to,
                "allow_sending_without_reply": true,
            });
        }

        let sent: SentMessage = self.call("sendMessage", payload).await?;
        Ok(MessageRef {
            chat_id: message.chat_id,
            message_id: sent.message_id,
        })
    }

    #[instrument(skip(self, text, keyboard))]
    async fn edit_message(
        &self,
        target: MessageRef,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> GatewayResult<()> {
        let mut payload = json!({
            "chat_id": target.chat_id.into_inner(),
            "message_id": target.message_id,
            "text": text,
            "parse_mode": "HTML",
            "link_preview_options": {"is_disabled": true},
        });
        if let Some(keyboard) = keyboard.filter(|k| !k.is_empty()) {
            payload["reply_markup"] = inline_markup(&keyboard);
        }

        match self.call::<Value>("editMessageText", payload).await {
            Ok(_) => Ok(()),
            Err(DomainError::TransportError(description))
                if description.contains("message is not modified") =>
            {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn delete_message(&self, target: MessageRef) -> GatewayResult<()> {
        let payload = json!({
            "chat_id": target.chat_id.into_inner(),
            "message_id": target.message_id,
        });
        self.call::<bool>("deleteMessage", payload).await.map(|_| ())
    }

    async fn get_chat_member(&self, chat_id: ChatId, user_id: UserId) -> GatewayResult<ChatMember> {
        let payload = json!({
            "chat_id": chat_id.into_inner(),
            "user_id": user_id.into_inner(),
        });
        let member: ApiChatMember = self.call("getChatMember", payload).await?;
        Ok(member.into())
    }

    async fn get_chat_administrators(&self, chat_id: ChatId) -> GatewayResult<Vec<ChatMember>> {
        let payload = json!({ "chat_id": chat_id.into_inner() });
        let admins: Vec<ApiChatMember> = self.call("getChatAdministrators", payload).await?;
        Ok(admins.into_iter().map(ChatMember::from).collect())
    }

    #[instrument(skip(self))]
    async fn ban_member(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        until: Option<DateTime<Utc>>,
    ) -> GatewayResult<()> {
        let mut payload = json!({
            "chat_id": chat_id.into_inner(),
            "user_id": user_id.into_inner(),
        });
        if until.is_some() {
            payload["until_date"] = unix_until(until);
        }
        self.call::<bool>("banChatMember", payload).await.map(|_| ())
    }

    #[instrument(skip(self, permissions))]
    async fn restrict_member(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        permissions: ChatPermissions,
        until: Option<DateTime<Utc>>,
    ) -> GatewayResult<()> {
        let mut payload = json!({
            "chat_id": chat_id.into_inner(),
            "user_id": user_id.into_inner(),
            "permissions": permissions.to_api_object(),
            "use_independent_chat_permissions": true,
        });
        if until.is_some() {
            payload["until_date"] = unix_until(until);
        }
        self.call::<bool>("restrictChatMember", payload).await.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn unban_member(&self, chat_id: ChatId, user_id: UserId) -> GatewayResult<()> {
        let payload = json!({
            "chat_id": chat_id.into_inner(),
            "user_id": user_id.into_inner(),
            "only_if_banned": true,
        });
        self.call::<bool>("unbanChatMember", payload).await.map(|_| ())
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> GatewayResult<()> {
        let mut payload = json!({ "callback_query_id": callback_id });
        if let Some(text) = text {
            payload["text"] = json!(text);
        }
        self.call::<bool>("answerCallbackQuery", payload).await.map(|_| ())
    }
}

impl std::fmt::Debug for BotApiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotApiGateway").field("base_url", &"<redacted>").finish()
    }
}
