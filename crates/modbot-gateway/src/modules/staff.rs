//! Rank catalogue, level assignment, command restrictions and staff listings

use async_trait::async_trait;
use modbot_service::{ServiceContext, StaffService};

use crate::dispatch::{CommandCall, HandlerResult, Module, ModuleDescriptor, NotApplicable};

pub struct StaffModule;

#[async_trait]
impl Module for StaffModule {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor {
            name: "staff",
            commands: &[
                "modlevel",
                "modlevellist",
                "addmodrank",
                "delmodrank",
                "modedit",
                "rankinfo",
                "restrictcommand",
                "mods",
                "restrict",
            ],
            handles_callbacks: &[],
            handles_text: false,
            has_startup: false,
        }
    }

    async fn command(&self, ctx: &ServiceContext, call: &CommandCall<'_>) -> HandlerResult {
        let staff = StaffService::new(ctx);
        let (inv, args) = (&call.inv, call.args);
        let result = match call.name {
            "modlevel" => staff.modlevel(inv, args, call.reply_target()).await,
            "modlevellist" => staff.modlevellist(inv).await,
            "addmodrank" => staff.add_rank(inv, args).await,
            "delmodrank" => staff.delete_rank(inv, args).await,
            "modedit" => staff.rename_rank(inv, args).await,
            "rankinfo" => staff.rank_info(inv, args).await,
            "restrictcommand" => staff.restrict_command(inv, args).await,
            "mods" => staff.list_mods(inv, args).await,
            "restrict" => staff.list_level(inv, args).await,
            _ => return Err(NotApplicable),
        };
        Ok(result.into())
    }
}
