//! Helpdesk handoff service
//!
//! Answers chat widget messages with an automated responder until the user
//! asks for a human, then relays the conversation through a Chatwoot inbox
//! until an agent resolves it.

mod api;
mod config;
mod helpdesk;
mod responder;
mod runtime;
mod state_machine;
mod store;

use api::{create_router, AppState};
use config::HandoffConfig;
use helpdesk::ChatwootClient;
use responder::EchoResponder;
use runtime::ProductionController;
use state_machine::{HandoffContext, TriggerVocabulary};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; real environment variables take precedence
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helpdesk_handoff=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    // Configuration
    let config = HandoffConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
    })?;

    let helpdesk = ChatwootClient::new(&config.helpdesk)?;
    tracing::info!(
        base_url = %config.helpdesk.base_url,
        account_id = %config.helpdesk.account_id,
        inbox_id = config.helpdesk.inbox_id,
        "Helpdesk client initialized"
    );

    let triggers = TriggerVocabulary::new(&config.trigger_words)?;
    tracing::info!(words = ?config.trigger_words, "Handoff trigger vocabulary loaded");

    let controller =
        ProductionController::new(HandoffContext::new(triggers), helpdesk, EchoResponder);
    let state = AppState::new(controller);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = create_router(state);
    if let Some(dir) = &config.public_dir {
        tracing::info!(path = %dir.display(), "Serving static files");
        app = app.fallback_service(ServeDir::new(dir));
    }
    let app = app.layer(cors).layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Helpdesk handoff server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
