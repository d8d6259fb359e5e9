mod config;
mod errors;
mod llm_client;
mod routes;
mod screening;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, TextGenerator};
use crate::routes::build_router;
use crate::screening::export::ProfileStore;
use crate::screening::question_selector::QuestionSelector;
use crate::screening::store::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentScout API v{}", env!("CARGO_PKG_VERSION"));

    // External question generation is optional; templates cover every stack.
    let generator: Option<Arc<dyn TextGenerator>> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.llm_model.clone(), config.llm_timeout)?;
            info!("LLM client initialized (model: {})", llm.model());
            Some(Arc::new(llm))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set, questions will come from templates");
            None
        }
    };
    let selector = QuestionSelector::new(generator, config.llm_timeout, config.question_seed);

    let profiles = ProfileStore::new(&config.data_dir);
    info!("Saving completed interviews to {}", profiles.data_dir().display());

    let sessions = SessionStore::new();
    sessions.spawn_idle_sweeper(config.session_ttl);

    let state = AppState {
        sessions,
        selector,
        profiles,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the chat UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
