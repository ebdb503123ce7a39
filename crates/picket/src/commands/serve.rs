use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info};

use palisade_core::{ActionGuardrail, HfScreener, PolicyStore, Router, Screener};
use palisade_gateway::{start_server, AppState, AuthConfig, RateLimiter};

use crate::config::Config;

pub async fn execute(host: Option<String>, port: Option<u16>, config: &Config) -> Result<()> {
    let host = host.unwrap_or_else(|| config.gateway.host.clone());
    let port = port.unwrap_or(config.gateway.port);

    info!(host = %host, port, "Starting gateway server");

    // The input screen cannot run without a moderation token; refuse to
    // start rather than serve unscreened traffic.
    let hf_token = std::env::var("HF_API_TOKEN")
        .context("HF_API_TOKEN must be set; the input screen requires a Hugging Face API token")?;

    let store = PolicyStore::load(&config.policy.expanded_path());
    if store.is_degraded() {
        error!(
            outcome = ?store.outcome,
            "Policy failed to load; serving with the empty fail-closed policy, all actions will be denied"
        );
    }

    let screener: Arc<dyn Screener> = Arc::new(
        HfScreener::new(&hf_token)
            .with_models(&config.screen.text_model, &config.screen.image_model)
            .with_nsfw_threshold(config.screen.nsfw_threshold),
    );

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .context("Failed to build image fetch client")?;

    let state = AppState {
        guardrail: Arc::new(ActionGuardrail::new(store.policy)),
        screener,
        router: Arc::new(Router::new()),
        policy_outcome: store.outcome,
        auth_config: Arc::new(AuthConfig::new(config.gateway.api_token.clone())),
        rate_limiter: Arc::new(RateLimiter::new(config.gateway.max_requests_per_minute)),
        allowed_origins: config.gateway.allowed_origins.clone(),
        http,
    };

    start_server(state, &host, port).await?;

    Ok(())
}
