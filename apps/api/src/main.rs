mod checklist;
mod config;
mod erp;
mod errors;
mod forecast;
mod hooks;
mod llm_client;
mod models;
mod notify;
mod risk;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::erp::HttpErpStore;
use crate::forecast::ShortageGuard;
use crate::llm_client::HttpChatModel;
use crate::notify::WebhookNotifier;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.rust_log)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Onboard API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let chat = Arc::new(HttpChatModel::new(config.llm_api_key.clone()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize ERP client (document store + inventory)
    let erp = Arc::new(HttpErpStore::new(
        config.erp_base_url.clone(),
        config.erp_api_token.clone(),
    ));
    info!("ERP client initialized ({})", config.erp_base_url);

    // Initialize webhook notifier
    if config.slack_webhook_url.is_none() {
        info!("Webhook URL not configured; shortage alerts will be dropped");
    }
    let notifier = Arc::new(WebhookNotifier::new(config.slack_webhook_url.clone()));

    // Build app state
    let state = AppState {
        chat,
        store: erp.clone(),
        inventory: erp,
        notifier,
        shortage_guard: Arc::new(ShortageGuard::default()),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
