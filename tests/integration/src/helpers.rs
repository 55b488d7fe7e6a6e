//! Test helpers for integration tests
//!
//! [`TestBot`] wires a dispatcher to in-memory stores and the recording
//! gateway; [`TestServer`] serves the webhook routes on a local port.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use modbot_common::{AppConfig, ModerationSettings};
use modbot_core::traits::{MessageRef, OutgoingMessage};
use modbot_core::value_objects::{ChatId, MemberStatus};
use modbot_core::UserDirectory;
use modbot_gateway::server::{create_app, GatewayState};
use modbot_gateway::update::Update;
use modbot_gateway::{Dispatcher, HandlerResult};
use modbot_service::ServiceContext;
use reqwest::{Client, Response};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::{Person, ADMIN, CO_ADMIN, GROUP, MEMBER, OWNER, SPAMMER};
use crate::platform::{MemoryDirectory, RecordingGateway};
use crate::store::MemoryStore;

pub const BOT_USERNAME: &str = "modbot";

/// Dispatcher over in-memory collaborators
pub struct TestBot {
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<RecordingGateway>,
    pub directory: Arc<MemoryDirectory>,
    ctx: Arc<ServiceContext>,
    dispatcher: Dispatcher,
}

impl TestBot {
    pub fn new() -> Self {
        Self::with_settings(ModerationSettings::default())
    }

    pub fn with_settings(settings: ModerationSettings) -> Self {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        let directory = Arc::new(MemoryDirectory::new());

        let ctx = ServiceContext::builder()
            .rank_repo(store.clone())
            .level_repo(store.clone())
            .restriction_repo(store.clone())
            .action_repo(store.clone())
            .warning_repo(store.clone())
            .award_repo(store.clone())
            .report_repo(store.clone())
            .appeal_repo(store.clone())
            .gateway(gateway.clone())
            .directory(directory.clone())
            .settings(settings)
            .build()
            .expect("every dependency is provided");
        let ctx = Arc::new(ctx);

        Self {
            store,
            gateway,
            directory,
            dispatcher: Dispatcher::with_default_modules(Arc::clone(&ctx), BOT_USERNAME),
            ctx,
        }
    }

    /// Group with the usual cast: owner, one admin, one co-admin. Everyone
    /// has spoken once so `@username` targets resolve.
    pub async fn with_group() -> Self {
        let bot = Self::new();
        bot.gateway
            .set_member(GROUP, OWNER.user_id(), MemberStatus::Creator, "Olga");
        bot.gateway
            .set_member(GROUP, ADMIN.user_id(), MemberStatus::Administrator, "Max Mod");
        bot.gateway
            .set_member(GROUP, CO_ADMIN.user_id(), MemberStatus::Administrator, "Ida");
        for person in [OWNER, ADMIN, CO_ADMIN, SPAMMER, MEMBER] {
            bot.seen(GROUP, &person).await;
        }
        bot
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    /// Another dispatcher over the same context, for the webhook server
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::with_default_modules(Arc::clone(&self.ctx), BOT_USERNAME)
    }

    /// Record a sighting the way an inbound message would
    pub async fn seen(&self, chat_id: ChatId, person: &Person) {
        self.directory
            .record(chat_id, person.user_id(), Some(person.username), &person.full_name())
            .await
            .expect("memory directory never fails");
    }

    pub async fn send(&self, update: Update) -> HandlerResult {
        self.dispatcher.dispatch(update).await
    }

    /// Last message the bot sent to `chat_id`
    pub fn last_message(&self, chat_id: ChatId) -> OutgoingMessage {
        self.last_message_ref(chat_id).1
    }

    pub fn last_message_ref(&self, chat_id: ChatId) -> (MessageRef, OutgoingMessage) {
        self.gateway
            .last_sent_to(chat_id)
            .unwrap_or_else(|| panic!("nothing was sent to {chat_id}"))
    }

    /// Text of the last message sent to `chat_id`
    pub fn last_text(&self, chat_id: ChatId) -> String {
        self.last_message(chat_id).text
    }

    /// Text of the last callback answer
    pub fn last_answer(&self) -> Option<String> {
        self.gateway.answers().last().and_then(|(_, text)| text.clone())
    }
}

impl Default for TestBot {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration with placeholder credentials
pub fn test_config() -> Result<AppConfig> {
    let config = AppConfig::from_lookup(|name| {
        match name {
            "DATABASE_URL" => Some("postgres://localhost/modbot_test"),
            "BOT_TOKEN" => Some("123456:test-token"),
            "BOT_USERNAME" => Some(BOT_USERNAME),
            "WEBHOOK_HOST" => Some("127.0.0.1"),
            _ => None,
        }
        .map(str::to_string)
    })?;
    Ok(config)
}

/// Webhook server on an ephemeral local port
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(dispatcher: Dispatcher) -> Result<Self> {
        let state = GatewayState::new(dispatcher, test_config()?);
        let app = create_app(state);

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }
}

/// Poll `check` until it holds or two seconds pass
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
