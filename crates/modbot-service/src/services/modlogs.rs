//! Moderator logs
//!
//! `/modlogs` shows the action history of every chat where the requester
//! holds priority 5 or more, newest first, six entries per page. Only
//! available in private chats with the bot.

use std::collections::BTreeSet;

use modbot_core::entities::{ActionType, ModerationAction};
use modbot_core::traits::{InlineButton, InlineKeyboard};
use modbot_core::value_objects::{format_duration, ChatId, UserId};
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::format::{escape_html, format_timestamp, linked_user};
use super::invocation::Invocation;
use super::ledger::ModerationLedger;
use super::level::LevelResolver;

pub const MODLOGS_PAGE_SIZE: i64 = 6;
pub const MODLOGS_MIN_PRIORITY: i32 = 5;
const CALLBACK_PREFIX: &str = "modlogs";

/// A rendered page of the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModLogPage {
    pub text: String,
    pub keyboard: InlineKeyboard,
}

/// Outcome of a pagination button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModLogReply {
    Page(ModLogPage),
    /// The button belongs to somebody else's menu
    NotOwner,
    /// Requester lost access since the menu was opened
    NoAccess,
    /// Nothing on the requested page
    Empty,
}

/// `modlogs:{requester}:{page}`
pub fn callback_data(requester: UserId, page: i64) -> String {
    format!("{CALLBACK_PREFIX}:{requester}:{page}")
}

/// Inverse of [`callback_data`]; negative pages clamp to 0
pub fn parse_callback(data: &str) -> Option<(UserId, i64)> {
    let mut parts = data.splitn(3, ':');
    if parts.next()? != CALLBACK_PREFIX {
        return None;
    }
    let requester = parts.next()?.parse::<UserId>().ok()?;
    let page = parts.next()?.parse::<i64>().ok()?;
    Some((requester, page.max(0)))
}

pub struct ModLogService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ModLogService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Chats where the user holds priority 5+, among chats with ledger rows
    /// and chats where the user has a stored level
    #[instrument(skip(self))]
    pub async fn eligible_chats(&self, user_id: UserId) -> ServiceResult<Vec<ChatId>> {
        let mut candidates: BTreeSet<ChatId> =
            self.ctx.action_repo().known_chat_ids().await?.into_iter().collect();
        candidates.extend(
            self.ctx
                .level_repo()
                .find_by_user(user_id)
                .await?
                .into_iter()
                .map(|o| o.chat_id),
        );

        let resolver = LevelResolver::new(self.ctx);
        let mut eligible = Vec::new();
        for chat_id in candidates {
            if resolver.effective_priority(chat_id, user_id).await? >= MODLOGS_MIN_PRIORITY {
                eligible.push(chat_id);
            }
        }
        debug!(count = eligible.len(), "Moderator log chats resolved");
        Ok(eligible)
    }

    /// `/modlogs`: first page
    #[instrument(skip(self, inv), fields(user_id = %inv.actor_id))]
    pub async fn open(&self, inv: &Invocation) -> ServiceResult<ModLogPage> {
        inv.require_private()?;
        let chats = self.eligible_chats(inv.actor_id).await?;
        if chats.is_empty() {
            return Err(ServiceError::validation(self.ctx.tr(
                "moderation.modlogs.permission",
                inv.lang(),
                "Only level 5 moderators can view the moderation logs.",
                &[],
            )));
        }

        match self.render(inv, &chats, 0).await? {
            Some(page) => Ok(page),
            None => Ok(ModLogPage {
                text: self.ctx.tr(
                    "moderation.modlogs.empty",
                    inv.lang(),
                    "No moderation actions have been logged yet.",
                    &[],
                ),
                keyboard: InlineKeyboard::new(),
            }),
        }
    }

    /// Pagination button press
    #[instrument(skip(self, inv), fields(user_id = %inv.actor_id))]
    pub async fn turn_page(&self, inv: &Invocation, data: &str) -> ServiceResult<ModLogReply> {
        let Some((requester, page)) = parse_callback(data) else {
            return Ok(ModLogReply::Empty);
        };
        if requester != inv.actor_id {
            return Ok(ModLogReply::NotOwner);
        }

        let chats = self.eligible_chats(inv.actor_id).await?;
        if chats.is_empty() {
            return Ok(ModLogReply::NoAccess);
        }

        Ok(self
            .render(inv, &chats, page)
            .await?
            .map_or(ModLogReply::Empty, ModLogReply::Page))
    }

    async fn render(
        &self,
        inv: &Invocation,
        chats: &[ChatId],
        page: i64,
    ) -> ServiceResult<Option<ModLogPage>> {
        let Some(offset) = page.checked_mul(MODLOGS_PAGE_SIZE) else {
            return Ok(None);
        };
        let result = ModerationLedger::new(self.ctx)
            .get_actions_page(chats, MODLOGS_PAGE_SIZE, offset)
            .await?;
        if result.actions.is_empty() {
            return Ok(None);
        }

        let header = self
            .ctx
            .tr("moderation.modlogs.header", inv.lang(), "<b>Moderator actions</b>", &[]);
        let mut lines = vec![header, format!("<i>Page {}</i>", page + 1), String::new()];
        for (index, action) in result.actions.iter().enumerate() {
            let admin = linked_user(self.ctx, Some(action.chat_id), action.admin_id).await;
            let target = linked_user(self.ctx, Some(action.chat_id), action.user_id).await;
            lines.push(format!(
                "{}. {}",
                offset + index as i64 + 1,
                log_line(action, &admin, &target)
            ));
        }

        let mut nav = Vec::new();
        if page > 0 {
            nav.push(InlineButton::callback(
                "⬅️ Previous",
                callback_data(inv.actor_id, page - 1),
            ));
        }
        if result.has_next {
            nav.push(InlineButton::callback(
                "Next ➡️",
                callback_data(inv.actor_id, page + 1),
            ));
        }

        Ok(Some(ModLogPage {
            text: lines.join("\n"),
            keyboard: InlineKeyboard::new().row(nav),
        }))
    }
}

/// `admin - Banned target for 1 day for reason: spam (chat: -100, at ...)`
pub fn log_line(action: &ModerationAction, admin: &str, target: &str) -> String {
    let mut line = format!("{admin} - {} {target}", action.action_type.log_verb());
    if action.action_type.is_timed() {
        line.push_str(&format!(" for {}", format_duration(action.duration())));
    }
    match (action.action_type, action.reason.as_deref().filter(|r| !r.is_empty())) {
        (ActionType::Award, Some(text)) => {
            line.push_str(&format!(" — <i>Award:</i> {}", escape_html(text)));
        }
        (ActionType::DelReward, Some(text)) => {
            line.push_str(&format!(" — <i>Removed award:</i> {}", escape_html(text)));
        }
        (_, Some(reason)) => line.push_str(&format!(" for reason: {}", escape_html(reason))),
        (_, None) => {}
    }
    line.push_str(&format!(
        " (chat: {}, at {})",
        action.chat_id,
        format_timestamp(action.timestamp)
    ));
    line
}
