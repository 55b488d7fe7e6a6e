//! Chat platform doubles
//!
//! [`RecordingGateway`] stands in for the Bot API: it remembers every call,
//! answers membership lookups from a configurable table and can refuse the
//! next enforcement call the way the platform does. [`MemoryDirectory`] is
//! the user directory fed by the dispatcher's sightings.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use modbot_core::traits::{
    ChatMember, GatewayResult, InlineKeyboard, MessageRef, MessagingGateway, OutgoingMessage,
    UserDirectory,
};
use modbot_core::value_objects::{ChatId, ChatPermissions, MemberStatus, UserId};
use modbot_core::DomainError;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A `restrictChatMember` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub permissions: ChatPermissions,
    pub until: Option<DateTime<Utc>>,
}

/// A `banChatMember` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanCall {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub until: Option<DateTime<Utc>>,
}

/// An `editMessageText` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCall {
    pub target: MessageRef,
    pub text: String,
    pub keyboard: Option<InlineKeyboard>,
}

#[derive(Debug, Default)]
struct Calls {
    next_message_id: i64,
    sent: Vec<(MessageRef, OutgoingMessage)>,
    edits: Vec<EditCall>,
    deleted: Vec<MessageRef>,
    bans: Vec<BanCall>,
    unbans: Vec<(ChatId, UserId)>,
    restrictions: Vec<Restriction>,
    answers: Vec<(String, Option<String>)>,
}

/// Messaging gateway that records instead of talking to the platform
#[derive(Debug, Default)]
pub struct RecordingGateway {
    calls: Mutex<Calls>,
    members: Mutex<HashMap<(ChatId, UserId), ChatMember>>,
    refusal: Mutex<Option<String>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chat member; unknown users read as plain members
    pub fn set_member(&self, chat_id: ChatId, user_id: UserId, status: MemberStatus, name: &str) {
        lock(&self.members).insert(
            (chat_id, user_id),
            ChatMember {
                user_id,
                status,
                display_name: name.to_string(),
                username: None,
                is_bot: false,
            },
        );
    }

    /// Fail the next ban, restrict or unban with the platform's description
    pub fn refuse_next(&self, description: &str) {
        *lock(&self.refusal) = Some(description.to_string());
    }

    fn take_refusal(&self) -> GatewayResult<()> {
        match lock(&self.refusal).take() {
            Some(description) => Err(DomainError::transport(description)),
            None => Ok(()),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        lock(&self.calls).sent.iter().map(|(_, m)| m.clone()).collect()
    }

    /// Last message sent to a chat with the reference it was given
    pub fn last_sent_to(&self, chat_id: ChatId) -> Option<(MessageRef, OutgoingMessage)> {
        lock(&self.calls)
            .sent
            .iter()
            .rev()
            .find(|(at, _)| at.chat_id == chat_id)
            .cloned()
    }

    pub fn edits(&self) -> Vec<EditCall> {
        lock(&self.calls).edits.clone()
    }

    pub fn bans(&self) -> Vec<BanCall> {
        lock(&self.calls).bans.clone()
    }

    pub fn unbans(&self) -> Vec<(ChatId, UserId)> {
        lock(&self.calls).unbans.clone()
    }

    pub fn restrictions(&self) -> Vec<Restriction> {
        lock(&self.calls).restrictions.clone()
    }

    /// Callback answers as `(callback_id, text)`
    pub fn answers(&self) -> Vec<(String, Option<String>)> {
        lock(&self.calls).answers.clone()
    }
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn send_message(&self, message: OutgoingMessage) -> GatewayResult<MessageRef> {
        let mut calls = lock(&self.calls);
        calls.next_message_id += 1;
        let at = MessageRef {
            chat_id: message.chat_id,
            message_id: 1000 + calls.next_message_id,
        };
        calls.sent.push((at, message));
        Ok(at)
    }

    async fn edit_message(
        &self,
        target: MessageRef,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> GatewayResult<()> {
        lock(&self.calls).edits.push(EditCall {
            target,
            text: text.to_string(),
            keyboard,
        });
        Ok(())
    }

    async fn delete_message(&self, target: MessageRef) -> GatewayResult<()> {
        lock(&self.calls).deleted.push(target);
        Ok(())
    }

    async fn get_chat_member(&self, chat_id: ChatId, user_id: UserId) -> GatewayResult<ChatMember> {
        Ok(lock(&self.members)
            .get(&(chat_id, user_id))
            .cloned()
            .unwrap_or_else(|| ChatMember {
                user_id,
                status: MemberStatus::Member,
                display_name: user_id.to_string(),
                username: None,
                is_bot: false,
            }))
    }

    async fn get_chat_administrators(&self, chat_id: ChatId) -> GatewayResult<Vec<ChatMember>> {
        let mut admins: Vec<ChatMember> = lock(&self.members)
            .iter()
            .filter(|((chat, _), member)| *chat == chat_id && member.status.is_chat_admin())
            .map(|(_, member)| member.clone())
            .collect();
        admins.sort_by_key(|m| m.user_id);
        Ok(admins)
    }

    async fn ban_member(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        until: Option<DateTime<Utc>>,
    ) -> GatewayResult<()> {
        self.take_refusal()?;
        lock(&self.calls).bans.push(BanCall {
            chat_id,
            user_id,
            until,
        });
        Ok(())
    }

    async fn restrict_member(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        permissions: ChatPermissions,
        until: Option<DateTime<Utc>>,
    ) -> GatewayResult<()> {
        self.take_refusal()?;
        lock(&self.calls).restrictions.push(Restriction {
            chat_id,
            user_id,
            permissions,
            until,
        });
        Ok(())
    }

    async fn unban_member(&self, chat_id: ChatId, user_id: UserId) -> GatewayResult<()> {
        self.take_refusal()?;
        lock(&self.calls).unbans.push((chat_id, user_id));
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> GatewayResult<()> {
        lock(&self.calls)
            .answers
            .push((callback_id.to_string(), text.map(str::to_string)));
        Ok(())
    }
}

// ============================================================================
// User directory
// ============================================================================

#[derive(Debug, Clone)]
struct Sighting {
    chat_id: ChatId,
    user_id: UserId,
    username: Option<String>,
    full_name: String,
}

/// User directory over recorded sightings, latest first
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    sightings: Mutex<Vec<Sighting>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn latest(&self, chat_id: Option<ChatId>, user_id: UserId) -> Option<Sighting> {
        lock(&self.sightings)
            .iter()
            .rev()
            .find(|s| s.user_id == user_id && chat_id.is_none_or(|c| c == s.chat_id))
            .cloned()
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn resolve_username(&self, username: &str) -> GatewayResult<Option<UserId>> {
        let name = username.trim().trim_start_matches('@');
        if name.is_empty() {
            return Ok(None);
        }
        Ok(lock(&self.sightings)
            .iter()
            .rev()
            .find(|s| s.username.as_deref().is_some_and(|u| u.eq_ignore_ascii_case(name)))
            .map(|s| s.user_id))
    }

    async fn username_of(&self, user_id: UserId) -> GatewayResult<Option<String>> {
        Ok(self.latest(None, user_id).and_then(|s| s.username))
    }

    async fn display_name(&self, chat_id: Option<ChatId>, user_id: UserId) -> GatewayResult<Option<String>> {
        Ok(self
            .latest(chat_id, user_id)
            .or_else(|| self.latest(None, user_id))
            .map(|s| s.full_name)
            .filter(|n| !n.trim().is_empty()))
    }

    async fn chat_users(&self, chat_id: ChatId) -> GatewayResult<Vec<UserId>> {
        let mut users: Vec<UserId> = lock(&self.sightings)
            .iter()
            .filter(|s| s.chat_id == chat_id)
            .map(|s| s.user_id)
            .collect();
        users.sort();
        users.dedup();
        Ok(users)
    }

    async fn record(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        username: Option<&str>,
        full_name: &str,
    ) -> GatewayResult<()> {
        let mut sightings = lock(&self.sightings);
        sightings.retain(|s| s.chat_id != chat_id || s.user_id != user_id);
        sightings.push(Sighting {
            chat_id,
            user_id,
            username: username.map(str::to_string),
            full_name: full_name.to_string(),
        });
        Ok(())
    }

    async fn forget(&self, chat_id: ChatId, user_id: UserId) -> GatewayResult<()> {
        lock(&self.sightings).retain(|s| s.chat_id != chat_id || s.user_id != user_id);
        Ok(())
    }
}
