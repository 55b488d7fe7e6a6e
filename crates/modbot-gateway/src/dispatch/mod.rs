//! Update dispatch
//!
//! Routes commands by canonical name, callbacks by data prefix and free text
//! to text-handling modules in registration order. Failures are logged and
//! answered in the originating chat; they never escape [`Dispatcher::dispatch`].

mod module;
mod outcome;

pub use module::{CallbackCall, CommandCall, Module, ModuleDescriptor, TextCall};
pub use outcome::{Handled, HandlerResult, NotApplicable};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use modbot_core::OutgoingMessage;
use modbot_service::services::commands;
use modbot_service::{Invocation, ServiceContext, ServiceError};
use tracing::{debug, error, info, instrument, warn};

use crate::update::{CallbackQuery, Message, Update};

pub struct Dispatcher {
    ctx: Arc<ServiceContext>,
    modules: Vec<Box<dyn Module>>,
    descriptors: Vec<ModuleDescriptor>,
    /// Canonical command name -> module index
    commands: HashMap<&'static str, usize>,
    bot_username: String,
}

impl Dispatcher {
    pub fn new(
        ctx: Arc<ServiceContext>,
        bot_username: impl Into<String>,
        modules: Vec<Box<dyn Module>>,
    ) -> Self {
        let descriptors: Vec<ModuleDescriptor> = modules.iter().map(|m| m.descriptor()).collect();

        let mut routes = HashMap::new();
        for (index, descriptor) in descriptors.iter().enumerate() {
            for &command in descriptor.commands {
                if let Some(previous) = routes.insert(command, index) {
                    warn!(
                        command,
                        module = descriptor.name,
                        shadowed = descriptors[previous].name,
                        "Command registered twice"
                    );
                }
            }
            debug!(module = descriptor.name, commands = descriptor.commands.len(), "Module registered");
        }

        Self {
            ctx,
            modules,
            descriptors,
            commands: routes,
            bot_username: bot_username.into(),
        }
    }

    /// Dispatcher with every built-in module
    pub fn with_default_modules(ctx: Arc<ServiceContext>, bot_username: impl Into<String>) -> Self {
        Self::new(ctx, bot_username, crate::modules::default_modules())
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    pub fn descriptors(&self) -> &[ModuleDescriptor] {
        &self.descriptors
    }

    /// Run startup hooks of modules that declare one
    pub async fn startup(&self) {
        for (module, descriptor) in self.modules.iter().zip(&self.descriptors) {
            if !descriptor.has_startup {
                continue;
            }
            match module.startup(Arc::clone(&self.ctx)).await {
                Ok(()) => info!(module = descriptor.name, "Module started"),
                Err(e) => error!(module = descriptor.name, error = %e, "Module startup failed"),
            }
        }
    }

    /// Handle one update
    #[instrument(skip(self, update), fields(update_id = update.update_id, kind = update.kind()))]
    pub async fn dispatch(&self, update: Update) -> HandlerResult {
        if let Some(message) = &update.message {
            return self.on_message(message).await;
        }
        if let Some(query) = &update.callback_query {
            return self.on_callback(query).await;
        }
        debug!("Update ignored");
        Err(NotApplicable)
    }

    // =========================================================================
    // Messages
    // =========================================================================

    async fn on_message(&self, message: &Message) -> HandlerResult {
        let Some(from) = &message.from else {
            return Err(NotApplicable);
        };
        let chat_id = message.chat.chat_id();
        if let Err(e) = self
            .ctx
            .directory()
            .record(chat_id, from.user_id(), from.username.as_deref(), &from.full_name())
            .await
        {
            warn!(chat_id = %chat_id, user_id = from.id, error = %e, "Failed to record user");
        }

        let inv = Invocation::new(chat_id, from.user_id(), Utc::now())
            .with_language(from.language_code.clone());

        if let Some(command) = message.command(&self.bot_username) {
            let name = commands::canonical(&command.name);
            let Some(&index) = self.commands.get(name.as_str()) else {
                debug!(command = %command.name, "No module for command");
                return Err(NotApplicable);
            };
            let call = CommandCall {
                inv,
                name: &name,
                args: &command.args,
                message,
            };
            let handled = self.modules[index].command(&self.ctx, &call).await?;
            self.reply(message, &call.inv, &handled).await;
            return Ok(handled);
        }

        let call = TextCall { inv, message };
        for (module, descriptor) in self.modules.iter().zip(&self.descriptors) {
            if !descriptor.handles_text {
                continue;
            }
            if let Ok(handled) = module.text(&self.ctx, &call).await {
                debug!(module = descriptor.name, "Text handled");
                self.reply(message, &call.inv, &handled).await;
                return Ok(handled);
            }
        }
        Err(NotApplicable)
    }

    async fn reply(&self, message: &Message, inv: &Invocation, handled: &Handled) {
        let outgoing = match handled {
            Handled::Html(text) => OutgoingMessage::html(inv.chat_id, text.clone()),
            Handled::Plain(text) => OutgoingMessage::plain(inv.chat_id, text.clone()),
            Handled::Done => return,
            Handled::Failed(e) => {
                self.log_failure(inv, e);
                OutgoingMessage::plain(inv.chat_id, e.user_message(self.ctx.localizer(), inv.lang()))
            }
        };
        if let Err(e) = self
            .ctx
            .gateway()
            .send_message(outgoing.reply_to(message.message_id))
            .await
        {
            warn!(chat_id = %inv.chat_id, error = %e, "Failed to send reply");
        }
    }

    // =========================================================================
    // Callbacks
    // =========================================================================

    async fn on_callback(&self, query: &CallbackQuery) -> HandlerResult {
        let data = query.data.as_deref().unwrap_or_default();
        let prefix = data.split(':').next().unwrap_or_default();
        let module = self
            .modules
            .iter()
            .zip(&self.descriptors)
            .find(|(_, d)| d.handles_callbacks.contains(&prefix));

        let Some((module, descriptor)) = module else {
            debug!(prefix, "No module for callback");
            self.answer(query, None).await;
            return Err(NotApplicable);
        };

        let chat_id = query
            .message
            .as_ref()
            .map_or_else(|| query.from.user_id().private_chat(), |m| m.chat.chat_id());
        let call = CallbackCall {
            inv: Invocation::new(chat_id, query.from.user_id(), Utc::now())
                .with_language(query.from.language_code.clone()),
            data,
            query,
        };

        let handled = match module.callback(&self.ctx, &call).await {
            Ok(handled) => handled,
            Err(NotApplicable) => {
                debug!(module = descriptor.name, data, "Callback declined");
                self.answer(query, None).await;
                return Err(NotApplicable);
            }
        };

        match &handled {
            Handled::Html(text) | Handled::Plain(text) => self.answer(query, Some(text)).await,
            Handled::Done => self.answer(query, None).await,
            Handled::Failed(e) => {
                self.log_failure(&call.inv, e);
                let text = e.user_message(self.ctx.localizer(), call.inv.lang());
                self.answer(query, Some(&text)).await;
            }
        }
        Ok(handled)
    }

    async fn answer(&self, query: &CallbackQuery, text: Option<&str>) {
        if let Err(e) = self.ctx.gateway().answer_callback(&query.id, text).await {
            debug!(callback_id = %query.id, error = %e, "Failed to answer callback");
        }
    }

    fn log_failure(&self, inv: &Invocation, e: &ServiceError) {
        if e.is_fatal() {
            error!(chat_id = %inv.chat_id, user_id = %inv.actor_id, code = e.error_code(), error = %e, "Command failed");
        } else {
            debug!(chat_id = %inv.chat_id, user_id = %inv.actor_id, code = e.error_code(), error = %e, "Command rejected");
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("modules", &self.descriptors.iter().map(|d| d.name).collect::<Vec<_>>())
            .field("bot_username", &self.bot_username)
            .finish()
    }
}
