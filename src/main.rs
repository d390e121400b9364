use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::{SecondsFormat, Utc};
use clap::Parser;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod classifier;
mod cli;
mod config;
mod core;
mod orchestrator;
mod protocol;
mod providers;
mod store;

use crate::cli::Args;
use crate::config::{Config, Provider};
use crate::core::error::AgentError;
use crate::orchestrator::ChatOrchestrator;
use crate::protocol::ProtocolAdapter;
use crate::providers::factory::ProviderFactory;

const DEFAULT_BIND: &str = "0.0.0.0:8000";

#[tokio::main]
async fn main() -> Result<(), AgentError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;

    let provider_kind = match args.provider.as_deref() {
        Some(name) => Provider::from_str(name)
            .ok_or_else(|| AgentError::Config(format!("Unsupported provider: {}", name)))?,
        None => config.active_provider.unwrap_or_default(),
    };

    let mut provider_config = config.provider_config(&provider_kind);
    if args.model.is_some() {
        provider_config.model = args.model.clone();
    }

    let provider = ProviderFactory::new().create(&provider_kind, &provider_config)?;
    if !provider.is_configured() {
        tracing::warn!(
            "no API credential found; chat requests will report the backend as unavailable"
        );
    }

    let adapter = Arc::new(ProtocolAdapter::new(ChatOrchestrator::new(provider)));

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/a2a/health", post(a2a_handler))
        .with_state(adapter);

    let bind = args
        .bind
        .or_else(|| config.bind_addr.take())
        .unwrap_or_else(|| DEFAULT_BIND.to_string());

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(%bind, "health conversation gateway listening");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn a2a_handler(State(adapter): State<Arc<ProtocolAdapter>>, body: String) -> Json<Value> {
    Json(adapter.handle(&body).await)
}

async fn health_handler(State(adapter): State<Arc<ProtocolAdapter>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "health_conversation_agent",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        "model_available": adapter.backend_available(),
    }))
}
