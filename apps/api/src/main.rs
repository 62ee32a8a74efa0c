mod config;
mod errors;
mod evaluation;
mod evaluator;
mod jobs;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::evaluator::LlmEvaluator;
use crate::jobs::processor::EvaluationProcessor;
use crate::jobs::queue::JobQueue;
use crate::jobs::repository::{InMemoryJobRepository, JobRepository};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting candidate evaluator v{}", env!("CARGO_PKG_VERSION"));

    if config.llm.api_key.is_none() {
        warn!("OPENROUTER_API_KEY is not set; evaluations will fail until it is configured");
    }

    let llm = LlmClient::new(config.llm.clone())?;
    info!("LLM client initialized (model: {})", llm.model());

    let jobs: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    let processor = EvaluationProcessor::new(jobs.clone(), Arc::new(LlmEvaluator::new(llm)));
    let queue = JobQueue::new(jobs.clone(), processor);

    let state = AppState { jobs, queue };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
