//! Command restriction table
//!
//! Per-chat minimum-priority overrides keyed by normalized command name.
//! Absent override means the catalogue default; priority 0 clears.

use modbot_core::entities::{normalize_command, CommandRestriction};
use modbot_core::value_objects::ChatId;
use modbot_core::DomainError;
use tracing::{info, instrument};

use super::commands::{self, CommandSpec};
use super::context::ServiceContext;
use super::error::ServiceResult;

pub struct CommandRestrictionTable<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CommandRestrictionTable<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// First stored override among the command and its aliases, else the default
    #[instrument(skip(self))]
    pub async fn effective_priority(
        &self,
        chat_id: ChatId,
        command: &str,
        default_priority: i32,
        aliases: &[&str],
    ) -> ServiceResult<i32> {
        let candidates = std::iter::once(command).chain(aliases.iter().copied());
        for name in candidates {
            let name = normalize_command(name);
            if name.is_empty() {
                continue;
            }
            if let Some(priority) = self.ctx.restriction_repo().get(chat_id, &name).await? {
                return Ok(priority);
            }
        }
        Ok(default_priority)
    }

    /// Required priority for a catalogued command
    pub async fn required_for(&self, chat_id: ChatId, spec: &CommandSpec) -> ServiceResult<i32> {
        self.effective_priority(chat_id, spec.name, spec.default_priority, spec.aliases)
            .await
    }

    /// Store an override under the canonical name; 0 clears it.
    /// Returns the canonical name.
    #[instrument(skip(self))]
    pub async fn set_priority(
        &self,
        chat_id: ChatId,
        command: &str,
        priority: i32,
    ) -> ServiceResult<String> {
        let name = commands::canonical(command);
        if name.is_empty() {
            return Err(DomainError::invalid("Command name cannot be empty.").into());
        }
        if priority < 0 {
            return Err(DomainError::invalid("Priority must be zero or positive.").into());
        }

        if priority == 0 {
            self.clear_priority(chat_id, &name).await?;
        } else {
            self.ctx.restriction_repo().set(chat_id, &name, priority).await?;
            info!(chat_id = %chat_id, command = %name, priority, "Command restriction set");
        }
        Ok(name)
    }

    /// Remove overrides of a command and all its aliases
    pub async fn clear_priority(&self, chat_id: ChatId, command: &str) -> ServiceResult<bool> {
        let mut cleared = false;
        let names: Vec<String> = match commands::lookup(command) {
            Some(spec) => std::iter::once(spec.name)
                .chain(spec.aliases.iter().copied())
                .map(normalize_command)
                .collect(),
            None => vec![normalize_command(command)],
        };
        for name in names {
            cleared |= self.ctx.restriction_repo().clear(chat_id, &name).await?;
        }
        if cleared {
            info!(chat_id = %chat_id, command = %command, "Command restriction cleared");
        }
        Ok(cleared)
    }

    pub async fn list(&self, chat_id: ChatId) -> ServiceResult<Vec<CommandRestriction>> {
        Ok(self.ctx.restriction_repo().find_by_chat(chat_id).await?)
    }
}
