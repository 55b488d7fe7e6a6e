//! `/lostmembers [purge]`

use async_trait::async_trait;
use modbot_service::{LostMemberSweep, ServiceContext};

use crate::dispatch::{CommandCall, HandlerResult, Module, ModuleDescriptor, NotApplicable};

pub struct LostMembersModule;

#[async_trait]
impl Module for LostMembersModule {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor {
            name: "lostmembers",
            commands: &["lostmembers"],
            handles_callbacks: &[],
            handles_text: false,
            has_startup: false,
        }
    }

    async fn command(&self, ctx: &ServiceContext, call: &CommandCall<'_>) -> HandlerResult {
        if call.name != "lostmembers" {
            return Err(NotApplicable);
        }
        Ok(LostMemberSweep::new(ctx).run(&call.inv, call.args).await.into())
    }
}
