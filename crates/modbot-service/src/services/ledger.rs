//! Moderation action ledger
//!
//! Durable record of bans, mutes, media-mutes, kicks, warnings and awards.
//! Ban/mute/media-mute rows are *live* while `active`; they expire lazily when
//! a read path observes `expires_at <= now`. There is no background timer.

use chrono::{DateTime, Duration, Utc};
use modbot_core::entities::{ActionType, ModerationAction, NewAction, Warning};
use modbot_core::value_objects::{ChatId, ChatPermissions, UserId};
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Reason recorded on the synthesized escalation mute
pub const ESCALATION_REASON: &str = "Automatic mute after reaching 3 warnings.";

/// Result of issuing a warning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarnOutcome {
    pub warning: Warning,
    /// Active warnings after this one
    pub count: i64,
    /// Whether this warning crossed the threshold and synthesized a mute
    pub escalated: bool,
}

/// One page of history plus a look-ahead flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPage {
    pub actions: Vec<ModerationAction>,
    pub has_next: bool,
}

pub struct ModerationLedger<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ModerationLedger<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Append an action; timed live actions get `expires_at = now + duration`
    #[instrument(skip(self, action), fields(action_type = %action.action_type, chat_id = %action.chat_id))]
    pub async fn add_action(
        &self,
        action: &NewAction,
        now: DateTime<Utc>,
    ) -> ServiceResult<ModerationAction> {
        let expires_at = if action.active {
            action.expires_at(now)
        } else {
            None
        };
        let stored = self.ctx.action_repo().insert(action, now, expires_at).await?;
        debug!(id = stored.id, active = stored.active, "Action recorded");
        Ok(stored)
    }

    /// Active rows of a type, newest first. Rows found expired are dropped
    /// from the result and deactivated; a failed deactivation is only logged.
    #[instrument(skip(self))]
    pub async fn list_active(
        &self,
        chat_id: ChatId,
        action_type: ActionType,
        now: DateTime<Utc>,
    ) -> ServiceResult<Vec<ModerationAction>> {
        let rows = self.ctx.action_repo().find_active(chat_id, action_type).await?;

        let (expired, live): (Vec<_>, Vec<_>) = rows.into_iter().partition(|a| a.is_expired(now));
        if !expired.is_empty() {
            let ids: Vec<i64> = expired.iter().map(|a| a.id).collect();
            match self.ctx.action_repo().deactivate_ids(&ids).await {
                Ok(count) => debug!(count, "Expired actions deactivated"),
                Err(e) => warn!(error = %e, "Failed to deactivate expired actions"),
            }
        }
        Ok(live)
    }

    #[instrument(skip(self))]
    pub async fn deactivate_for_user(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        action_type: ActionType,
    ) -> ServiceResult<u64> {
        Ok(self
            .ctx
            .action_repo()
            .deactivate_for_user(chat_id, user_id, action_type)
            .await?)
    }

    /// Bulk-deactivate every live row of a type, returns the count
    #[instrument(skip(self))]
    pub async fn clean_for_chat(&self, chat_id: ChatId, action_type: ActionType) -> ServiceResult<u64> {
        let count = self
            .ctx
            .action_repo()
            .deactivate_for_chat(chat_id, action_type)
            .await?;
        info!(chat_id = %chat_id, action_type = %action_type, count, "Ledger cleaned");
        Ok(count)
    }

    /// History across chats, newest first. Fetches `limit + 1` rows to learn
    /// whether another page exists.
    #[instrument(skip(self, chat_ids))]
    pub async fn get_actions_page(
        &self,
        chat_ids: &[ChatId],
        limit: i64,
        offset: i64,
    ) -> ServiceResult<ActionPage> {
        let limit = limit.max(1);
        let mut actions = self
            .ctx
            .action_repo()
            .find_page(chat_ids, limit + 1, offset.max(0))
            .await?;
        let has_next = actions.len() as i64 > limit;
        actions.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(ActionPage { actions, has_next })
    }

    // =========================================================================
    // Warnings
    // =========================================================================

    /// Store a warning and its history row. Exactly when the active count
    /// reaches the threshold a live mute is synthesized and applied; failures
    /// of that escalation are logged and never surface.
    #[instrument(skip(self, reason))]
    pub async fn warn_user(
        &self,
        chat_id: ChatId,
        actor_id: UserId,
        target_id: UserId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<WarnOutcome> {
        let warning = self
            .ctx
            .warning_repo()
            .insert(chat_id, target_id, actor_id, Some(reason), now)
            .await?;
        let count = self.ctx.warning_repo().count_active(chat_id, target_id).await?;

        let history = NewAction::history(
            ActionType::Warn,
            chat_id,
            target_id,
            actor_id,
            Some(reason.to_string()),
        );
        if let Err(e) = self.add_action(&history, now).await {
            warn!(error = %e, "Failed to log warn action");
        }

        let escalated = count == self.ctx.settings().warn_threshold;
        if escalated {
            self.escalate(chat_id, actor_id, target_id, now).await;
        }

        info!(chat_id = %chat_id, user_id = %target_id, count, escalated, "Warning issued");
        Ok(WarnOutcome {
            warning,
            count,
            escalated,
        })
    }

    async fn escalate(&self, chat_id: ChatId, actor_id: UserId, target_id: UserId, now: DateTime<Utc>) {
        let duration = Duration::try_seconds(self.ctx.settings().escalation_mute_secs)
            .unwrap_or_else(|| Duration::hours(1));

        let mute = NewAction::live(
            ActionType::Mute,
            chat_id,
            target_id,
            actor_id,
            Some(duration),
            Some(ESCALATION_REASON.to_string()),
        );
        if let Err(e) = self.add_action(&mute, now).await {
            warn!(chat_id = %chat_id, user_id = %target_id, error = %e, "Failed to record escalation mute");
        }

        if let Err(e) = self
            .ctx
            .gateway()
            .restrict_member(chat_id, target_id, ChatPermissions::MUTED, Some(now + duration))
            .await
        {
            warn!(chat_id = %chat_id, user_id = %target_id, error = %e, "Failed to apply escalation mute");
        }
    }

    /// Deactivate the newest active warning; returns the remaining count
    /// and whether anything was removed
    #[instrument(skip(self))]
    pub async fn unwarn(
        &self,
        chat_id: ChatId,
        actor_id: UserId,
        target_id: UserId,
        now: DateTime<Utc>,
    ) -> ServiceResult<(bool, i64)> {
        let newest = self
            .ctx
            .warning_repo()
            .find_active(chat_id, target_id)
            .await?
            .into_iter()
            .next();

        let removed = match newest {
            Some(w) => self.ctx.warning_repo().deactivate(w.id).await?,
            None => false,
        };

        let history = NewAction::history(ActionType::Unwarn, chat_id, target_id, actor_id, None);
        if let Err(e) = self.add_action(&history, now).await {
            warn!(error = %e, "Failed to log unwarn action");
        }

        let remaining = self.ctx.warning_repo().count_active(chat_id, target_id).await?;
        Ok((removed, remaining))
    }

    pub async fn active_warnings(&self, chat_id: ChatId, user_id: UserId) -> ServiceResult<Vec<Warning>> {
        Ok(self.ctx.warning_repo().find_active(chat_id, user_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn clean_warnings(&self, chat_id: ChatId) -> ServiceResult<u64> {
        let count = self.ctx.warning_repo().deactivate_for_chat(chat_id).await?;
        info!(chat_id = %chat_id, count, "Warnings cleaned");
        Ok(count)
    }
}
