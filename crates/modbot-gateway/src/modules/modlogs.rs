//! `/modlogs` and its pagination buttons

use async_trait::async_trait;
use modbot_core::OutgoingMessage;
use modbot_service::{ModLogReply, ModLogService, ServiceContext, ServiceError};
use tracing::debug;

use crate::dispatch::{
    CallbackCall, CommandCall, Handled, HandlerResult, Module, ModuleDescriptor, NotApplicable,
};

pub struct ModLogsModule;

#[async_trait]
impl Module for ModLogsModule {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor {
            name: "modlogs",
            commands: &["modlogs"],
            handles_callbacks: &["modlogs"],
            handles_text: false,
            has_startup: false,
        }
    }

    async fn command(&self, ctx: &ServiceContext, call: &CommandCall<'_>) -> HandlerResult {
        if call.name != "modlogs" {
            return Err(NotApplicable);
        }
        let page = match ModLogService::new(ctx).open(&call.inv).await {
            Ok(page) => page,
            Err(e) => return Ok(Handled::Failed(e)),
        };
        let sent = ctx
            .gateway()
            .send_message(OutgoingMessage::html(call.inv.chat_id, page.text).with_keyboard(page.keyboard))
            .await;
        Ok(match sent {
            Ok(_) => Handled::Done,
            Err(e) => Handled::Failed(ServiceError::transport("send moderator logs", e)),
        })
    }

    async fn callback(&self, ctx: &ServiceContext, call: &CallbackCall<'_>) -> HandlerResult {
        let Some(origin) = call.origin() else {
            return Ok(Handled::Done);
        };
        let lang = call.inv.lang();
        let reply = match ModLogService::new(ctx).turn_page(&call.inv, call.data).await {
            Ok(reply) => reply,
            Err(e) => return Ok(Handled::Failed(e)),
        };

        Ok(match reply {
            ModLogReply::Page(page) => {
                if let Err(e) = ctx
                    .gateway()
                    .edit_message(origin, &page.text, Some(page.keyboard))
                    .await
                {
                    debug!(error = %e, "Failed to edit moderator log page");
                }
                Handled::Done
            }
            ModLogReply::NotOwner => Handled::Plain(ctx.tr(
                "moderation.modlogs.not_owner",
                lang,
                "This menu belongs to another moderator.",
                &[],
            )),
            ModLogReply::NoAccess => Handled::Plain(ctx.tr(
                "moderation.modlogs.revoked",
                lang,
                "You no longer have permission to view these logs.",
                &[],
            )),
            ModLogReply::Empty => Handled::Plain(ctx.tr(
                "moderation.modlogs.no_more",
                lang,
                "No more entries on this page.",
                &[],
            )),
        })
    }
}
