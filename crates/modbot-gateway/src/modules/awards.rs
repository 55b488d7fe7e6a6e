//! `/award` and `/delreward`

use async_trait::async_trait;
use modbot_service::{AwardService, ServiceContext, ServiceError};

use crate::dispatch::{CommandCall, Handled, HandlerResult, Module, ModuleDescriptor, NotApplicable};

pub struct AwardsModule;

#[async_trait]
impl Module for AwardsModule {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor {
            name: "awards",
            commands: &["award", "delreward"],
            handles_callbacks: &[],
            handles_text: false,
            has_startup: false,
        }
    }

    async fn command(&self, ctx: &ServiceContext, call: &CommandCall<'_>) -> HandlerResult {
        let awards = AwardService::new(ctx);
        let lang = call.inv.lang();
        match call.name {
            "award" => {
                if call.args.is_empty() {
                    return Ok(Handled::Failed(ServiceError::validation(ctx.tr(
                        "moderation.award.usage",
                        lang,
                        "Usage: /award <text> (reply to a user's message).",
                        &[],
                    ))));
                }
                let Some(recipient) = call.reply_target() else {
                    return Ok(Handled::Failed(ServiceError::validation(ctx.tr(
                        "moderation.award.reply_required",
                        lang,
                        "❌ You must reply to a user's message to give an award.",
                        &[],
                    ))));
                };
                Ok(awards.award(&call.inv, recipient, call.args).await.into())
            }
            "delreward" => {
                let id = call.args.split_whitespace().next().and_then(|t| t.parse::<i64>().ok());
                let Some(id) = id else {
                    return Ok(Handled::Failed(ServiceError::validation(ctx.tr(
                        "moderation.delreward.usage",
                        lang,
                        "Usage: /delreward <award id>",
                        &[],
                    ))));
                };
                Ok(awards.delete_award(&call.inv, id).await.into())
            }
            _ => Err(NotApplicable),
        }
    }
}
