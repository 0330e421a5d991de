pub mod config;
pub mod logging;
pub mod model;
pub mod model_gateway;
pub mod providers;
pub mod repl;

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::info;

use config::Config;
use model_gateway::GeminiGateway;
use repl::run_repl;

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = logging::init();

    let cfg = Config::from_env()?;
    info!(
        model = %cfg.model,
        endpoint = %cfg.redacted_endpoint(),
        api_key = %cfg.masked_api_key(),
        web_search = cfg.web_search,
        timeout_secs = ?cfg.model_timeout_secs,
        "loaded runtime configuration"
    );

    let mut builder = Client::builder();
    if let Some(secs) = cfg.model_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = builder
        .build()
        .context("Failed to initialize HTTP client")?;

    let gateway = GeminiGateway::new(&client, &cfg);
    run_repl(&gateway).await
}
