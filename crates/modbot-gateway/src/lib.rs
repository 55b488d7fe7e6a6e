//! # modbot-gateway
//!
//! Bot surface: the inbound update model, command modules, the dispatcher,
//! the Bot API client and the webhook server.

pub mod bot_api;
pub mod dispatch;
pub mod modules;
pub mod server;
pub mod update;

pub use dispatch::{Dispatcher, Handled, HandlerResult, Module, ModuleDescriptor, NotApplicable};
pub use server::run;
