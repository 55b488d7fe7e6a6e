//! Awards
//!
//! Free-text commendations with their own ledger. Each award and each
//! removal is mirrored as an inactive history action for `/modlogs`.

use modbot_core::entities::{ActionType, Award, NewAction};
use modbot_core::value_objects::UserId;
use modbot_core::DomainError;
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::AwardRequest;

use super::commands;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::format::{escape_html, linked_user};
use super::invocation::Invocation;
use super::ledger::ModerationLedger;
use super::permission::PermissionChecker;
use super::restriction::CommandRestrictionTable;

pub struct AwardService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AwardService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// `/award <text>` in reply to the recipient
    #[instrument(skip(self, inv, text), fields(chat_id = %inv.chat_id))]
    pub async fn award(&self, inv: &Invocation, recipient: UserId, text: &str) -> ServiceResult<String> {
        inv.require_group()?;
        PermissionChecker::new(self.ctx)
            .require_command(inv.chat_id, inv.actor_id, "award")
            .await?;

        let request = AwardRequest {
            text: text.trim().to_string(),
        };
        request.validate()?;

        let award = self
            .ctx
            .award_repo()
            .insert(inv.chat_id, recipient, inv.actor_id, &request.text, inv.now)
            .await?;
        ModerationLedger::new(self.ctx)
            .add_action(
                &NewAction::history(
                    ActionType::Award,
                    inv.chat_id,
                    recipient,
                    inv.actor_id,
                    Some(request.text.clone()),
                ),
                inv.now,
            )
            .await?;
        info!(award_id = award.id, recipient = %recipient, "Award added");

        let target = linked_user(self.ctx, Some(inv.chat_id), recipient).await;
        Ok(self.ctx.tr(
            "moderation.award.success",
            inv.lang(),
            "🏅 Award #{award_id} added for {target}: {text}",
            &[
                ("award_id", award.id.to_string()),
                ("target", target),
                ("text", escape_html(&award.text)),
            ],
        ))
    }

    /// `/delreward <id>`: the issuer may always delete; anyone else needs the
    /// command's required priority and must outrank the recipient
    #[instrument(skip(self, inv), fields(chat_id = %inv.chat_id))]
    pub async fn delete_award(&self, inv: &Invocation, award_id: i64) -> ServiceResult<String> {
        inv.require_group()?;

        let award = self
            .ctx
            .award_repo()
            .find_by_id(award_id)
            .await?
            .filter(|a| a.chat_id == inv.chat_id)
            .ok_or(DomainError::AwardNotFound(award_id))?;

        if award.admin_id != inv.actor_id {
            self.check_foreign_delete(inv, &award).await?;
        }

        if !self.ctx.award_repo().delete(award.id).await? {
            return Err(DomainError::AwardNotFound(award_id).into());
        }
        ModerationLedger::new(self.ctx)
            .add_action(
                &NewAction::history(
                    ActionType::DelReward,
                    inv.chat_id,
                    award.user_id,
                    inv.actor_id,
                    Some(award.text.clone()),
                ),
                inv.now,
            )
            .await?;
        info!(award_id, "Award removed");

        let target = linked_user(self.ctx, Some(inv.chat_id), award.user_id).await;
        Ok(self.ctx.tr(
            "moderation.award.delete_success",
            inv.lang(),
            "🗑 Removed award #{award_id} from {target}.",
            &[("award_id", award_id.to_string()), ("target", target)],
        ))
    }

    async fn check_foreign_delete(&self, inv: &Invocation, award: &Award) -> ServiceResult<()> {
        let Some(spec) = commands::lookup("delreward") else {
            return Err(ServiceError::internal("delreward is not catalogued"));
        };
        let required = CommandRestrictionTable::new(self.ctx)
            .required_for(inv.chat_id, spec)
            .await?;

        let checker = PermissionChecker::new(self.ctx);
        let actor = checker.priority(inv.chat_id, inv.actor_id).await?;
        if actor < required {
            return Err(ServiceError::denied(spec.name, required));
        }
        if award.user_id != inv.actor_id {
            let recipient = checker.priority(inv.chat_id, award.user_id).await?;
            if actor <= recipient {
                return Err(DomainError::TargetOutranks.into());
            }
        }
        Ok(())
    }
}
