//! Ban, mute, kick and warn commands with their inverses and lists

use async_trait::async_trait;
use modbot_core::value_objects::UserId;
use modbot_service::{ArgParser, EnforcementService, ServiceContext, ServiceError};

use crate::dispatch::{CommandCall, Handled, HandlerResult, Module, ModuleDescriptor, NotApplicable};

pub struct EnforcementModule;

impl EnforcementModule {
    /// Target, duration and reason for a punitive command
    async fn punish(&self, ctx: &ServiceContext, call: &CommandCall<'_>) -> Handled {
        let parsed = ArgParser::new(ctx)
            .parse_moderation_args(call.reply_target(), call.args, call.inv.lang())
            .await;
        let Some(args) = parsed else {
            return Handled::Failed(usage(ctx, call));
        };

        let service = EnforcementService::new(ctx);
        let inv = &call.inv;
        let result = match call.name {
            "ban" => service.ban(inv, &args).await,
            "mute" => service.mute(inv, &args).await,
            "mediamute" => service.mediamute(inv, &args).await,
            "kick" => service.kick(inv, &args).await,
            _ => service.warn(inv, &args).await,
        };
        result.into()
    }

    /// Inverse commands and `/warnlist` take only a target
    async fn single_target(&self, ctx: &ServiceContext, call: &CommandCall<'_>) -> Handled {
        let Some(target) = find_target(ctx, call).await else {
            return Handled::Failed(usage(ctx, call));
        };

        let service = EnforcementService::new(ctx);
        let inv = &call.inv;
        let result = match call.name {
            "unban" => service.unban(inv, target).await,
            "unmute" => service.unmute(inv, target).await,
            "unmediamute" => service.unmediamute(inv, target).await,
            "unwarn" => service.unwarn(inv, target).await,
            _ => service.warnlist(inv, target).await,
        };
        result.into()
    }
}

async fn find_target(ctx: &ServiceContext, call: &CommandCall<'_>) -> Option<UserId> {
    if let Some(target) = call.reply_target() {
        return Some(target);
    }
    let tokens: Vec<&str> = call.args.split_whitespace().collect();
    ArgParser::new(ctx).find_target(&tokens).await.map(|(_, id)| id)
}

fn usage(ctx: &ServiceContext, call: &CommandCall<'_>) -> ServiceError {
    let verb = match call.name {
        "mediamute" => "media-mute",
        "warnlist" => "view warnings of",
        other => other,
    };
    ServiceError::validation(ctx.tr(
        &format!("moderation.{}.usage", call.name),
        call.inv.lang(),
        "❌ Please specify a user to {action} or reply to their message.",
        &[("action", verb.to_string())],
    ))
}

#[async_trait]
impl Module for EnforcementModule {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor {
            name: "enforcement",
            commands: &[
                "ban",
                "mute",
                "mediamute",
                "kick",
                "warn",
                "unban",
                "unmute",
                "unmediamute",
                "unwarn",
                "warnlist",
                "banlist",
                "mutelist",
                "cleanbanlist",
                "cleanmutelist",
                "cleanwarnlist",
            ],
            handles_callbacks: &[],
            handles_text: false,
            has_startup: false,
        }
    }

    async fn command(&self, ctx: &ServiceContext, call: &CommandCall<'_>) -> HandlerResult {
        let service = EnforcementService::new(ctx);
        let inv = &call.inv;
        Ok(match call.name {
            "ban" | "mute" | "mediamute" | "kick" | "warn" => self.punish(ctx, call).await,
            "unban" | "unmute" | "unmediamute" | "unwarn" | "warnlist" => {
                self.single_target(ctx, call).await
            }
            "banlist" => service.banlist(inv).await.into(),
            "mutelist" => service.mutelist(inv).await.into(),
            "cleanbanlist" => service.clean_banlist(inv).await.into(),
            "cleanmutelist" => service.clean_mutelist(inv).await.into(),
            "cleanwarnlist" => service.clean_warnlist(inv).await.into(),
            _ => return Err(NotApplicable),
        })
    }
}
