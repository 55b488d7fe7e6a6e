//! Webhook server setup
//!
//! Provides the HTTP routes the Bot API delivers updates to.

mod handler;
mod state;

pub use handler::webhook_handler;
pub use state::GatewayState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use modbot_common::{AppConfig, AppError};
use modbot_service::ServiceContextBuilder;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::bot_api::BotApiGateway;
use crate::dispatch::Dispatcher;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize all dependencies and create `GatewayState`
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    // Create database pool
    tracing::info!("Connecting to PostgreSQL...");
    let db_config = modbot_db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        ..Default::default()
    };
    let pool = modbot_db::create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    modbot_db::ensure_schema(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!("PostgreSQL connection established");

    // Create repositories
    let rank_repo = Arc::new(modbot_db::PgRankRepository::new(pool.clone()));
    let level_repo = Arc::new(modbot_db::PgLevelRepository::new(pool.clone()));
    let restriction_repo = Arc::new(modbot_db::PgCommandRestrictionRepository::new(pool.clone()));
    let action_repo = Arc::new(modbot_db::PgActionRepository::new(pool.clone()));
    let warning_repo = Arc::new(modbot_db::PgWarningRepository::new(pool.clone()));
    let award_repo = Arc::new(modbot_db::PgAwardRepository::new(pool.clone()));
    let report_repo = Arc::new(modbot_db::PgReportRepository::new(pool.clone()));
    let appeal_repo = Arc::new(modbot_db::PgAppealRepository::new(pool.clone()));
    let directory = Arc::new(modbot_db::PgUserDirectory::new(pool));

    // Bot API client
    let gateway = Arc::new(BotApiGateway::new(&config.bot)?);

    // Build service context
    let service_context = ServiceContextBuilder::new()
        .rank_repo(rank_repo)
        .level_repo(level_repo)
        .restriction_repo(restriction_repo)
        .action_repo(action_repo)
        .warning_repo(warning_repo)
        .award_repo(award_repo)
        .report_repo(report_repo)
        .appeal_repo(appeal_repo)
        .gateway(gateway)
        .directory(directory)
        .settings(config.moderation.clone())
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let dispatcher = Dispatcher::with_default_modules(Arc::new(service_context), config.bot.username.clone());
    dispatcher.startup().await;

    Ok(GatewayState::new(dispatcher, config))
}

/// Run the webhook server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    tracing::info!("Starting webhook server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Webhook listening on http://{}/webhook", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete gateway with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .webhook
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid webhook address: {e}")))?;

    // Create gateway state
    let state = create_gateway_state(config).await?;

    // Build application
    let app = create_app(state);

    // Run server
    run_server(app, addr).await
}
