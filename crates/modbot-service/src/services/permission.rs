//! Permission checker
//!
//! Cross-cutting guard: command gates and the "cannot moderate an equal or
//! higher rank" rule. Every mutating action calls [`PermissionChecker::can_moderate`]
//! before touching the ledger.

use modbot_core::value_objects::{ChatId, UserId};
use modbot_core::DomainError;
use tracing::{debug, instrument};

use super::commands;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::level::LevelResolver;
use super::restriction::CommandRestrictionTable;

pub struct PermissionChecker<'a> {
    ctx: &'a ServiceContext,
}

/// Outcome of a successful command gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clearance {
    pub required: i32,
    pub actor_priority: i32,
}

impl<'a> PermissionChecker<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Effective priority of a user in a chat
    pub async fn priority(&self, chat_id: ChatId, user_id: UserId) -> ServiceResult<i32> {
        LevelResolver::new(self.ctx)
            .effective_priority(chat_id, user_id)
            .await
    }

    /// `InsufficientAuthority` when the admin has no authority at all,
    /// `TargetOutranks` when someone else's priority is not strictly lower.
    /// Targeting oneself always passes.
    #[instrument(skip(self))]
    pub async fn can_moderate(
        &self,
        chat_id: ChatId,
        admin_id: UserId,
        target_id: UserId,
    ) -> ServiceResult<()> {
        if admin_id == target_id {
            return Ok(());
        }

        let resolver = LevelResolver::new(self.ctx);
        let admin = resolver.effective_rank(chat_id, admin_id).await?;
        if admin.priority <= 0 {
            return Err(ServiceError::insufficient(1));
        }

        let target = resolver.effective_rank(chat_id, target_id).await?;
        if !admin.outranks(&target) {
            debug!(
                chat_id = %chat_id,
                admin = admin.priority,
                target = target.priority,
                "Target outranks admin"
            );
            return Err(DomainError::TargetOutranks.into());
        }
        Ok(())
    }

    /// Stored level of at least 1, else platform admin/creator status
    #[instrument(skip(self))]
    pub async fn is_admin_for_chat(&self, chat_id: ChatId, user_id: UserId) -> ServiceResult<bool> {
        if let Some(level) = self.ctx.level_repo().get(chat_id, user_id).await? {
            if level >= 1 {
                return Ok(true);
            }
        }
        let status = LevelResolver::new(self.ctx)
            .member_status(chat_id, user_id)
            .await;
        Ok(status.is_some_and(|s| s.is_chat_admin()))
    }

    /// Gate a command by name. Ungated and unknown commands pass with
    /// `required == 0`.
    #[instrument(skip(self))]
    pub async fn require_command(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        command: &str,
    ) -> ServiceResult<Clearance> {
        let Some(spec) = commands::lookup(command) else {
            return Ok(Clearance {
                required: 0,
                actor_priority: 0,
            });
        };

        let required = CommandRestrictionTable::new(self.ctx)
            .required_for(chat_id, spec)
            .await?;
        if required <= 0 {
            return Ok(Clearance {
                required,
                actor_priority: 0,
            });
        }

        let actor_priority = self.priority(chat_id, user_id).await?;
        if actor_priority < required {
            return Err(ServiceError::denied(spec.name, required));
        }
        Ok(Clearance {
            required,
            actor_priority,
        })
    }
}
