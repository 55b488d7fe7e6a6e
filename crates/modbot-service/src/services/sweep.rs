//! Lost member sweep
//!
//! Finds users who appear in a chat's ledger or in the user directory but
//! are no longer members of the chat.

use std::collections::BTreeSet;

use futures::future::join_all;
use modbot_core::value_objects::{ChatId, UserId};
use modbot_core::DomainError;
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::format::linked_user;
use super::invocation::Invocation;
use super::permission::PermissionChecker;

/// Result of probing one chat
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub checked: usize,
    pub lost: Vec<UserId>,
    /// Set when the lost users were also removed from the records
    pub purged: bool,
}

/// Transport errors meaning the user is simply not in the chat
fn is_absent_error(err: &DomainError) -> bool {
    let DomainError::TransportError(message) = err else {
        return false;
    };
    let message = message.to_lowercase();
    ["user not found", "member not found", "participant_id_invalid", "user_not_participant"]
        .iter()
        .any(|needle| message.contains(needle))
}

pub struct LostMemberSweep<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LostMemberSweep<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Ledger users plus directory users of a chat
    async fn candidates(&self, chat_id: ChatId) -> ServiceResult<BTreeSet<UserId>> {
        let mut users: BTreeSet<UserId> = self
            .ctx
            .action_repo()
            .user_ids_for_chat(chat_id)
            .await?
            .into_iter()
            .collect();
        match self.ctx.directory().chat_users(chat_id).await {
            Ok(seen) => users.extend(seen),
            Err(e) => warn!(chat_id = %chat_id, error = %e, "Directory lookup failed"),
        }
        Ok(users)
    }

    /// Look up every candidate concurrently. Unknown lookup failures count as
    /// present.
    #[instrument(skip(self))]
    pub async fn find_lost(&self, chat_id: ChatId) -> ServiceResult<SweepReport> {
        let candidates: Vec<UserId> = self.candidates(chat_id).await?.into_iter().collect();
        let gateway = self.ctx.gateway();

        let lookups = candidates.iter().map(|&user_id| async move {
            let lost = match gateway.get_chat_member(chat_id, user_id).await {
                Ok(member) => !member.status.is_present(),
                Err(e) if is_absent_error(&e) => true,
                Err(e) => {
                    debug!(user_id = %user_id, error = %e, "Membership lookup failed");
                    false
                }
            };
            (user_id, lost)
        });
        let lost: Vec<UserId> = join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(user_id, lost)| lost.then_some(user_id))
            .collect();

        debug!(chat_id = %chat_id, checked = candidates.len(), lost = lost.len(), "Sweep finished");
        Ok(SweepReport {
            checked: candidates.len(),
            lost,
            purged: false,
        })
    }

    /// Clear level overrides and directory entries of lost users
    #[instrument(skip(self, lost), fields(count = lost.len()))]
    pub async fn purge(&self, chat_id: ChatId, lost: &[UserId]) -> ServiceResult<()> {
        for &user_id in lost {
            self.ctx.level_repo().clear(chat_id, user_id).await?;
            if let Err(e) = self.ctx.directory().forget(chat_id, user_id).await {
                warn!(chat_id = %chat_id, user_id = %user_id, error = %e, "Failed to forget user");
            }
        }
        info!(chat_id = %chat_id, count = lost.len(), "Lost members purged");
        Ok(())
    }

    /// `/lostmembers [purge]`
    #[instrument(skip(self, inv), fields(chat_id = %inv.chat_id, user_id = %inv.actor_id))]
    pub async fn run(&self, inv: &Invocation, args: &str) -> ServiceResult<String> {
        inv.require_group()?;
        PermissionChecker::new(self.ctx)
            .require_command(inv.chat_id, inv.actor_id, "lostmembers")
            .await?;

        let purge = args
            .split_whitespace()
            .next()
            .is_some_and(|a| a.eq_ignore_ascii_case("purge"));

        let mut report = self.find_lost(inv.chat_id).await?;
        if report.lost.is_empty() {
            return Ok(self.ctx.tr(
                "moderation.lostmembers.none",
                inv.lang(),
                "✅ No lost members found among {count} known users.",
                &[("count", report.checked.to_string())],
            ));
        }

        if purge {
            self.purge(inv.chat_id, &report.lost).await?;
            report.purged = true;
        }
        Ok(self.render(inv, &report).await)
    }

    async fn render(&self, inv: &Invocation, report: &SweepReport) -> String {
        let mut lines = vec![self.ctx.tr(
            "moderation.lostmembers.header",
            inv.lang(),
            "<b>Lost members ({count}):</b>",
            &[("count", report.lost.len().to_string())],
        )];
        for &user_id in &report.lost {
            lines.push(format!("• {}", linked_user(self.ctx, Some(inv.chat_id), user_id).await));
        }
        lines.push(String::new());
        lines.push(if report.purged {
            self.ctx.tr(
                "moderation.lostmembers.purged",
                inv.lang(),
                "🧹 Removed {count} lost members from the records.",
                &[("count", report.lost.len().to_string())],
            )
        } else {
            self.ctx.tr(
                "moderation.lostmembers.hint",
                inv.lang(),
                "Send /lostmembers purge to remove them from the records.",
                &[],
            )
        });
        lines.join("\n")
    }
}
