//! Gateway state
//!
//! Application state shared by the webhook handlers.

use modbot_common::AppConfig;
use modbot_service::ServiceContext;
use std::sync::Arc;

use crate::dispatch::Dispatcher;

/// Gateway application state
///
/// Cheap to clone; every webhook delivery gets its own copy.
#[derive(Clone)]
pub struct GatewayState {
    /// Dispatcher owning the service context and the modules
    dispatcher: Arc<Dispatcher>,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    /// Create a new gateway state
    pub fn new(dispatcher: Dispatcher, config: AppConfig) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            config: Arc::new(config),
        }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        self.dispatcher.context()
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("dispatcher", &self.dispatcher)
            .field("config", &"AppConfig")
            .finish()
    }
}
