use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gitpulse::api::{create_router, AppState};
use gitpulse::config::Config;
use gitpulse::llm::LlmProvider;
use gitpulse::retrieval::{HttpVectorSearch, VectorSearch};

#[derive(Parser)]
#[command(name = "gitpulse")]
#[command(about = "Retrieval-augmented analytics over engineering telemetry")]
struct Args {
    /// Override the listen port from the environment/config
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gitpulse=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!(
        "Connecting to vector search service: {}...",
        config.vector.base_url
    );
    let search: Arc<dyn VectorSearch> = Arc::new(HttpVectorSearch::new(&config.vector)?);
    if !search.is_ready() {
        tracing::warn!("Vector search not configured - retrieval will fail until it is");
    }

    if let Some(llm_config) = &config.llm {
        tracing::info!("Initializing LLM provider: {}...", llm_config.model);
    }
    let llm = LlmProvider::new(config.llm.as_ref());
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - set LLM_MODEL to enable analysis");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, search, llm);
    let app = create_router(state);

    tracing::info!("Gitpulse starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/health", addr);
    tracing::info!("  Metrics list: http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
