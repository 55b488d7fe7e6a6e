//! Command module interface

use std::sync::Arc;

use async_trait::async_trait;
use modbot_core::value_objects::UserId;
use modbot_core::MessageRef;
use modbot_service::{Invocation, ServiceContext, ServiceResult};

use super::outcome::{HandlerResult, NotApplicable};
use crate::update::{CallbackQuery, Message, User};

/// What a module handles, resolved once when the dispatcher is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub name: &'static str,
    /// Canonical command names; aliases resolve to these
    pub commands: &'static [&'static str],
    /// Callback data prefixes (the part before the first `:`)
    pub handles_callbacks: &'static [&'static str],
    /// Offered free text that is not a command
    pub handles_text: bool,
    /// Needs [`Module::startup`] once before serving
    pub has_startup: bool,
}

/// A command addressed to the bot
#[derive(Debug)]
pub struct CommandCall<'a> {
    pub inv: Invocation,
    /// Canonical name
    pub name: &'a str,
    pub args: &'a str,
    pub message: &'a Message,
}

impl CommandCall<'_> {
    /// Author of the message the command replies to
    pub fn reply_target(&self) -> Option<UserId> {
        self.message.reply_author().map(User::user_id)
    }
}

/// An inline button press
#[derive(Debug)]
pub struct CallbackCall<'a> {
    pub inv: Invocation,
    pub data: &'a str,
    pub query: &'a CallbackQuery,
}

impl CallbackCall<'_> {
    /// Message carrying the pressed button
    pub fn origin(&self) -> Option<MessageRef> {
        self.query.message.as_ref().map(Message::message_ref)
    }
}

/// A message without a command
#[derive(Debug)]
pub struct TextCall<'a> {
    pub inv: Invocation,
    pub message: &'a Message,
}

#[async_trait]
pub trait Module: Send + Sync {
    fn descriptor(&self) -> ModuleDescriptor;

    async fn startup(&self, _ctx: Arc<ServiceContext>) -> ServiceResult<()> {
        Ok(())
    }

    async fn command(&self, _ctx: &ServiceContext, _call: &CommandCall<'_>) -> HandlerResult {
        Err(NotApplicable)
    }

    async fn callback(&self, _ctx: &ServiceContext, _call: &CallbackCall<'_>) -> HandlerResult {
        Err(NotApplicable)
    }

    async fn text(&self, _ctx: &ServiceContext, _call: &TextCall<'_>) -> HandlerResult {
        Err(NotApplicable)
    }
}
