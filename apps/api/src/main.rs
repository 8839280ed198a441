mod config;
mod errors;
mod interview;
mod machine_coding;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::interview::agents::{AgentConfigurator, AgentType};
use crate::interview::progress::ProgressTracker;
use crate::interview::store::{FileStore, MemoryStore, ProgressStore};
use crate::machine_coding::atlas::AtlasClient;
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

    info!("Starting Pathfinder API v{}", env!("CARGO_PKG_VERSION"));

    // Progress store: file-backed when a data dir is configured
    let store: Arc<dyn ProgressStore> = match &config.progress_data_dir {
        Some(dir) => {
            let store = FileStore::open(dir).context("Failed to open progress data dir")?;
            info!("Interview progress stored in {}", store.dir().display());
            Arc::new(store)
        }
        None => {
            warn!("PROGRESS_DATA_DIR not set; interview progress is kept in memory");
            Arc::new(MemoryStore::new())
        }
    };
    let tracker = Arc::new(ProgressTracker::new(store));

    let agents = Arc::new(AgentConfigurator::new(config.livekit.clone()));
    for agent_type in AgentType::ALL {
        let readiness = agents.readiness(agent_type.as_str());
        if readiness.is_configured() {
            info!("LiveKit agent '{agent_type}' configured");
        } else {
            warn!("LiveKit agent '{agent_type}' not ready: {readiness:?}");
        }
    }

    if config.atlas.api_key.is_empty() {
        warn!("MONGODB_ATLAS_API_KEY is not set; machine-coding storage calls will fail");
    }
    let documents = Arc::new(AtlasClient::new(&config.atlas)?);
    info!("Atlas Data API client initialized ({})", config.atlas.base_url);

    let state = AppState {
        tracker,
        agents,
        documents,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
