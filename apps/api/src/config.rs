use std::path::PathBuf;

use anyhow::{Context, Result};

/// Default Atlas Data API endpoint used by the machine-coding proxy.
pub const DEFAULT_ATLAS_DATA_API_URL: &str =
    "https://data.mongodb-api.com/app/data-alfjq/endpoint/data/v1";

/// Application configuration loaded from environment variables.
/// Read once at startup and passed explicitly into `AppState`.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory for the file-backed progress store. `None` keeps progress in memory.
    pub progress_data_dir: Option<PathBuf>,
    pub livekit: LiveKitSettings,
    pub atlas: AtlasSettings,
}

/// LiveKit credentials and endpoints for each interview agent.
/// Unset variables become empty strings; readiness is reported by the
/// agent configurator instead of failing startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveKitSettings {
    pub technical_token: String,
    pub technical_url: String,
    pub behavioural_token: String,
    pub behavioural_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasSettings {
    pub base_url: String,
    pub api_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            progress_data_dir: std::env::var("PROGRESS_DATA_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            livekit: LiveKitSettings {
                technical_token: optional_env("LIVEKIT_TECHNICAL_TOKEN"),
                technical_url: optional_env("LIVEKIT_TECHNICAL_URL"),
                behavioural_token: optional_env("LIVEKIT_BEHAVIOURAL_TOKEN"),
                behavioural_url: optional_env("LIVEKIT_BEHAVIOURAL_URL"),
            },
            atlas: AtlasSettings {
                base_url: std::env::var("ATLAS_DATA_API_URL")
                    .unwrap_or_else(|_| DEFAULT_ATLAS_DATA_API_URL.to_string()),
                api_key: optional_env("MONGODB_ATLAS_API_KEY"),
            },
        })
    }
}

fn optional_env(key: &str) -> String {
    std::env::var(key).unwrap_or_default()
}
