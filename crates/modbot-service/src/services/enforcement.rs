//! Enforcement commands
//!
//! Ban, mute, media-mute, kick and warn plus their inverses and the list and
//! cleanup commands. Every mutating action passes the command gate and
//! [`PermissionChecker::can_moderate`] before the gateway or ledger is touched.
//! Methods return the HTML reply for the invoking chat.

use chrono::{DateTime, Duration, Utc};
use modbot_core::entities::{ActionType, ModerationAction, NewAction};
use modbot_core::value_objects::{format_duration, format_seconds, ChatPermissions, UserId};
use tracing::{info, instrument};

use super::args::ParsedArgs;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::format::{escape_html, format_timestamp, linked_user};
use super::invocation::Invocation;
use super::ledger::ModerationLedger;
use super::permission::PermissionChecker;

/// Shortest ban the platform accepts
const MIN_BAN_SECS: i64 = 30;
/// Longer bans are treated as permanent by the platform
const MAX_BAN_DAYS: i64 = 366;

/// Transport `until` for a ban of the requested length
pub fn ban_until(duration: Option<Duration>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let duration = duration?;
    if duration > Duration::days(MAX_BAN_DAYS) {
        return None;
    }
    let duration = duration.max(Duration::seconds(MIN_BAN_SECS));
    now.checked_add_signed(duration)
}

pub struct EnforcementService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> EnforcementService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn ledger(&self) -> ModerationLedger<'a> {
        ModerationLedger::new(self.ctx)
    }

    /// Command gate plus the outrank check
    async fn authorize(&self, inv: &Invocation, command: &str, target: UserId) -> ServiceResult<()> {
        inv.require_group()?;
        let checker = PermissionChecker::new(self.ctx);
        checker.require_command(inv.chat_id, inv.actor_id, command).await?;
        checker.can_moderate(inv.chat_id, inv.actor_id, target).await
    }

    async fn gate(&self, inv: &Invocation, command: &str) -> ServiceResult<()> {
        inv.require_group()?;
        PermissionChecker::new(self.ctx)
            .require_command(inv.chat_id, inv.actor_id, command)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Punitive actions
    // =========================================================================

    #[instrument(skip(self, inv, args), fields(chat_id = %inv.chat_id, target = %args.user_id))]
    pub async fn ban(&self, inv: &Invocation, args: &ParsedArgs) -> ServiceResult<String> {
        self.authorize(inv, "ban", args.user_id).await?;

        let duration = args.span();
        self.ctx
            .gateway()
            .ban_member(inv.chat_id, args.user_id, ban_until(duration, inv.now))
            .await
            .map_err(|e| ServiceError::transport("ban", e))?;

        let action = NewAction::live(
            ActionType::Ban,
            inv.chat_id,
            args.user_id,
            inv.actor_id,
            duration,
            Some(args.reason.clone()),
        );
        self.ledger().add_action(&action, inv.now).await?;
        info!(duration = ?duration.map(|d| d.num_seconds()), "User banned");

        Ok(self
            .render_action(
                inv,
                "moderation.ban.response",
                "🔨 <b>User Banned</b>",
                args.user_id,
                Some(duration),
                &args.reason,
            )
            .await)
    }

    #[instrument(skip(self, inv, args), fields(chat_id = %inv.chat_id, target = %args.user_id))]
    pub async fn mute(&self, inv: &Invocation, args: &ParsedArgs) -> ServiceResult<String> {
        self.restrict(
            inv,
            args,
            ActionType::Mute,
            ChatPermissions::MUTED,
            ("moderation.mute.response", "🔇 <b>User Muted</b>"),
        )
        .await
    }

    #[instrument(skip(self, inv, args), fields(chat_id = %inv.chat_id, target = %args.user_id))]
    pub async fn mediamute(&self, inv: &Invocation, args: &ParsedArgs) -> ServiceResult<String> {
        self.restrict(
            inv,
            args,
            ActionType::MediaMute,
            ChatPermissions::TEXT_ONLY,
            ("moderation.mediamute.response", "🔇 <b>Media Muted</b>"),
        )
        .await
    }

    async fn restrict(
        &self,
        inv: &Invocation,
        args: &ParsedArgs,
        action_type: ActionType,
        permissions: ChatPermissions,
        (key, header): (&str, &str),
    ) -> ServiceResult<String> {
        let command = action_type.as_str();
        self.authorize(inv, command, args.user_id).await?;

        let duration = args.span();
        let until = duration.and_then(|d| inv.now.checked_add_signed(d));
        self.ctx
            .gateway()
            .restrict_member(inv.chat_id, args.user_id, permissions, until)
            .await
            .map_err(|e| ServiceError::transport(command, e))?;

        let action = NewAction::live(
            action_type,
            inv.chat_id,
            args.user_id,
            inv.actor_id,
            duration,
            Some(args.reason.clone()),
        );
        self.ledger().add_action(&action, inv.now).await?;
        info!(action_type = %action_type, "User restricted");

        Ok(self
            .render_action(inv, key, header, args.user_id, Some(duration), &args.reason)
            .await)
    }

    /// Ban then immediately unban; logged as history
    #[instrument(skip(self, inv, args), fields(chat_id = %inv.chat_id, target = %args.user_id))]
    pub async fn kick(&self, inv: &Invocation, args: &ParsedArgs) -> ServiceResult<String> {
        self.authorize(inv, "kick", args.user_id).await?;

        let gateway = self.ctx.gateway();
        gateway
            .ban_member(inv.chat_id, args.user_id, None)
            .await
            .map_err(|e| ServiceError::transport("kick", e))?;
        gateway
            .unban_member(inv.chat_id, args.user_id)
            .await
            .map_err(|e| ServiceError::transport("kick", e))?;

        let action = NewAction::history(
            ActionType::Kick,
            inv.chat_id,
            args.user_id,
            inv.actor_id,
            Some(args.reason.clone()),
        );
        self.ledger().add_action(&action, inv.now).await?;

        Ok(self
            .render_action(
                inv,
                "moderation.kick.response",
                "👢 <b>User Kicked</b>",
                args.user_id,
                None,
                &args.reason,
            )
            .await)
    }

    #[instrument(skip(self, inv, args), fields(chat_id = %inv.chat_id, target = %args.user_id))]
    pub async fn warn(&self, inv: &Invocation, args: &ParsedArgs) -> ServiceResult<String> {
        self.authorize(inv, "warn", args.user_id).await?;
        let (text, _) = self.warn_user(inv, args.user_id, &args.reason).await?;
        Ok(text)
    }

    /// Warning entry point for other features (the actor may be the bot).
    /// No permission checks; returns the rendered reply and the active count.
    pub async fn warn_user(
        &self,
        inv: &Invocation,
        target: UserId,
        reason: &str,
    ) -> ServiceResult<(String, i64)> {
        let outcome = self
            .ledger()
            .warn_user(inv.chat_id, inv.actor_id, target, reason, inv.now)
            .await?;

        let user = linked_user(self.ctx, Some(inv.chat_id), target).await;
        let admin = linked_user(self.ctx, Some(inv.chat_id), inv.actor_id).await;
        let mut text = self.ctx.tr(
            "moderation.warn.response",
            inv.lang(),
            "⚠️ <b>Warning Issued</b>\n👤 User: {user}\n📝 Reason: {reason}\n🔢 Warning: {count}/{max}\n👮 By: {admin}",
            &[
                ("user", user),
                ("reason", escape_html(reason)),
                ("count", outcome.count.to_string()),
                ("max", self.ctx.settings().warn_threshold.to_string()),
                ("admin", admin),
            ],
        );
        if outcome.escalated {
            text.push_str("\n\n");
            text.push_str(&self.ctx.tr(
                "moderation.warn.auto_mute_notice",
                inv.lang(),
                "🔨 <b>Maximum warnings reached! User will be muted.</b>",
                &[],
            ));
        }
        Ok((text, outcome.count))
    }

    // =========================================================================
    // Inverse actions
    // =========================================================================

    #[instrument(skip(self, inv), fields(chat_id = %inv.chat_id))]
    pub async fn unban(&self, inv: &Invocation, target: UserId) -> ServiceResult<String> {
        self.gate(inv, "unban").await?;

        self.ctx
            .gateway()
            .unban_member(inv.chat_id, target)
            .await
            .map_err(|e| ServiceError::transport("unban", e))?;

        let ledger = self.ledger();
        ledger.deactivate_for_user(inv.chat_id, target, ActionType::Ban).await?;
        ledger
            .add_action(
                &NewAction::history(ActionType::Unban, inv.chat_id, target, inv.actor_id, None),
                inv.now,
            )
            .await?;

        let user = linked_user(self.ctx, Some(inv.chat_id), target).await;
        Ok(self.ctx.tr(
            "moderation.unban.success",
            inv.lang(),
            "✅ User {user} has been unbanned.",
            &[("user", user)],
        ))
    }

    pub async fn unmute(&self, inv: &Invocation, target: UserId) -> ServiceResult<String> {
        self.lift_restriction(inv, target, ActionType::Mute, "unmute").await?;
        let user = linked_user(self.ctx, Some(inv.chat_id), target).await;
        Ok(self.ctx.tr(
            "moderation.unmute.success",
            inv.lang(),
            "🔊 User {user} has been unmuted.",
            &[("user", user)],
        ))
    }

    pub async fn unmediamute(&self, inv: &Invocation, target: UserId) -> ServiceResult<String> {
        self.lift_restriction(inv, target, ActionType::MediaMute, "unmediamute")
            .await?;
        let user = linked_user(self.ctx, Some(inv.chat_id), target).await;
        Ok(self.ctx.tr(
            "moderation.unmediamute.success",
            inv.lang(),
            "🔊 Media restrictions lifted for {user}.",
            &[("user", user)],
        ))
    }

    /// Restore full send permissions; self-unmute passes the outrank check
    #[instrument(skip(self, inv), fields(chat_id = %inv.chat_id))]
    async fn lift_restriction(
        &self,
        inv: &Invocation,
        target: UserId,
        action_type: ActionType,
        command: &'static str,
    ) -> ServiceResult<()> {
        self.authorize(inv, command, target).await?;

        self.ctx
            .gateway()
            .restrict_member(inv.chat_id, target, ChatPermissions::ALL_MESSAGES, None)
            .await
            .map_err(|e| ServiceError::transport(command, e))?;

        let ledger = self.ledger();
        ledger.deactivate_for_user(inv.chat_id, target, action_type).await?;
        ledger
            .add_action(
                &NewAction::history(
                    ActionType::Unmute,
                    inv.chat_id,
                    target,
                    inv.actor_id,
                    Some(action_type.as_str().to_string()),
                ),
                inv.now,
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self, inv), fields(chat_id = %inv.chat_id))]
    pub async fn unwarn(&self, inv: &Invocation, target: UserId) -> ServiceResult<String> {
        self.authorize(inv, "unwarn", target).await?;

        let (removed, remaining) = self
            .ledger()
            .unwarn(inv.chat_id, inv.actor_id, target, inv.now)
            .await?;
        if !removed {
            return Ok(self.ctx.tr(
                "moderation.warnlist.empty",
                inv.lang(),
                "✅ This user has no active warnings.",
                &[],
            ));
        }
        Ok(self.ctx.tr(
            "moderation.unwarn.success",
            inv.lang(),
            "✅ Warning removed. User now has {count} warnings.",
            &[("count", remaining.to_string())],
        ))
    }

    // =========================================================================
    // Lists
    // =========================================================================

    #[instrument(skip(self, inv), fields(chat_id = %inv.chat_id))]
    pub async fn warnlist(&self, inv: &Invocation, target: UserId) -> ServiceResult<String> {
        self.gate(inv, "warnlist").await?;

        let warnings = self.ledger().active_warnings(inv.chat_id, target).await?;
        if warnings.is_empty() {
            return Ok(self.ctx.tr(
                "moderation.warnlist.empty",
                inv.lang(),
                "✅ This user has no active warnings.",
                &[],
            ));
        }

        let user = linked_user(self.ctx, Some(inv.chat_id), target).await;
        let mut lines = vec![self.ctx.tr(
            "moderation.warnlist.header",
            inv.lang(),
            "<b>Warnings for {target}</b>",
            &[("target", user)],
        )];
        for (index, warning) in warnings.iter().enumerate() {
            let admin = linked_user(self.ctx, Some(inv.chat_id), warning.admin_id).await;
            let reason = warning.reason.as_deref().unwrap_or("No reason provided");
            lines.push(format!(
                "{}. {} — {} at {}",
                index + 1,
                escape_html(reason),
                admin,
                format_timestamp(warning.timestamp)
            ));
        }
        Ok(lines.join("\n"))
    }

    pub async fn banlist(&self, inv: &Invocation) -> ServiceResult<String> {
        self.gate(inv, "banlist").await?;
        let bans = self.ledger().list_active(inv.chat_id, ActionType::Ban, inv.now).await?;
        if bans.is_empty() {
            return Ok(self.ctx.tr(
                "moderation.banlist.empty",
                inv.lang(),
                "No users are currently banned.",
                &[],
            ));
        }
        let header = self.ctx.tr("moderation.banlist.header", inv.lang(), "<b>Active bans:</b>", &[]);
        Ok(self.render_list(inv, header, &bans).await)
    }

    /// Mutes and media-mutes
    pub async fn mutelist(&self, inv: &Invocation) -> ServiceResult<String> {
        self.gate(inv, "mutelist").await?;
        let ledger = self.ledger();
        let mut mutes = ledger.list_active(inv.chat_id, ActionType::Mute, inv.now).await?;
        mutes.extend(
            ledger
                .list_active(inv.chat_id, ActionType::MediaMute, inv.now)
                .await?,
        );
        if mutes.is_empty() {
            return Ok(self.ctx.tr(
                "moderation.mutelist.empty",
                inv.lang(),
                "No users are currently muted.",
                &[],
            ));
        }
        let header = self.ctx.tr("moderation.mutelist.header", inv.lang(), "<b>Active mutes:</b>", &[]);
        Ok(self.render_list(inv, header, &mutes).await)
    }

    pub async fn clean_banlist(&self, inv: &Invocation) -> ServiceResult<String> {
        self.gate(inv, "cleanbanlist").await?;
        let removed = self.ledger().clean_for_chat(inv.chat_id, ActionType::Ban).await?;
        Ok(self.cleaned(inv, removed, "ban entries", "cleanbanlist"))
    }

    pub async fn clean_mutelist(&self, inv: &Invocation) -> ServiceResult<String> {
        self.gate(inv, "cleanmutelist").await?;
        let ledger = self.ledger();
        let removed = ledger.clean_for_chat(inv.chat_id, ActionType::Mute).await?
            + ledger.clean_for_chat(inv.chat_id, ActionType::MediaMute).await?;
        Ok(self.cleaned(inv, removed, "mute entries", "cleanmutelist"))
    }

    pub async fn clean_warnlist(&self, inv: &Invocation) -> ServiceResult<String> {
        self.gate(inv, "cleanwarnlist").await?;
        let removed = self.ledger().clean_warnings(inv.chat_id).await?;
        Ok(self.cleaned(inv, removed, "warnings", "cleanwarnlist"))
    }

    fn cleaned(&self, inv: &Invocation, removed: u64, what: &str, command: &str) -> String {
        if removed == 0 {
            return self.ctx.tr(
                &format!("moderation.{command}.empty"),
                inv.lang(),
                "There were no active {what} to clean.",
                &[("what", what.to_string())],
            );
        }
        self.ctx.tr(
            &format!("moderation.{command}.success"),
            inv.lang(),
            "✅ Removed {count} {what}.",
            &[("count", removed.to_string()), ("what", what.to_string())],
        )
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Header, then user, optional duration, reason and moderator lines.
    /// `duration` is `None` for actions without one (kick), `Some(None)` for
    /// permanent ones.
    async fn render_action(
        &self,
        inv: &Invocation,
        key: &str,
        header: &str,
        target: UserId,
        duration: Option<Option<Duration>>,
        reason: &str,
    ) -> String {
        let header = self.ctx.tr(key, inv.lang(), header, &[]);
        let user = linked_user(self.ctx, Some(inv.chat_id), target).await;
        let admin = linked_user(self.ctx, Some(inv.chat_id), inv.actor_id).await;
        render_action_lines(&header, &user, duration.map(format_duration).as_deref(), reason, &admin)
    }

    async fn render_list(&self, inv: &Invocation, header: String, rows: &[ModerationAction]) -> String {
        let mut lines = vec![header];
        for (index, row) in rows.iter().enumerate() {
            let user = linked_user(self.ctx, Some(inv.chat_id), row.user_id).await;
            let admin = linked_user(self.ctx, Some(inv.chat_id), row.admin_id).await;
            lines.push(format!("{}. {}", index + 1, list_line(row, &user, &admin, inv.now)));
        }
        lines.join("\n")
    }
}

/// Body of an action reply
pub fn render_action_lines(
    header: &str,
    user: &str,
    duration: Option<&str>,
    reason: &str,
    admin: &str,
) -> String {
    let mut lines = vec![header.to_string(), format!("👤 User: {user}")];
    if let Some(duration) = duration {
        lines.push(format!("⏱ Duration: {}", escape_html(duration)));
    }
    lines.push(format!("📝 Reason: {}", escape_html(reason)));
    lines.push(format!("👮 By: {admin}"));
    lines.join("\n")
}

/// `user — 1 day, 23 hours left (by admin) — reason: spam`
pub fn list_line(row: &ModerationAction, user: &str, admin: &str, now: DateTime<Utc>) -> String {
    let mut line = format!("{user} — {}", format_duration(row.duration()));
    if let Some(left) = row.remaining(now) {
        line.push_str(&format!(", {} left", format_seconds(left.num_seconds())));
    }
    if row.action_type == ActionType::MediaMute {
        line.push_str(" [media]");
    }
    line.push_str(&format!(" (by {admin})"));
    if let Some(reason) = row.reason.as_deref().filter(|r| !r.is_empty()) {
        line.push_str(&format!(" — reason: {}", escape_html(reason)));
    }
    line
}
