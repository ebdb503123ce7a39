use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use palisade_core::{fetch_image, ActionGuardrail, LoadOutcome, ScreenVerdict, Screener};

use crate::auth::{auth_middleware, AuthConfig};
use crate::rate_limiter::{rate_limit_middleware, RateLimiter};
use crate::types::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub guardrail: Arc<ActionGuardrail>,
    pub screener: Arc<dyn Screener>,
    pub router: Arc<palisade_core::Router>,
    pub policy_outcome: LoadOutcome,
    pub auth_config: Arc<AuthConfig>,
    pub rate_limiter: Arc<RateLimiter>,
    pub allowed_origins: Vec<String>,
    /// Client used only to fetch request images for screening
    pub http: reqwest::Client,
}

/// Create the Axum router with all routes
pub fn create_router(state: AppState) -> Router {
    // Build CORS layer
    let cors = if state.allowed_origins.is_empty() {
        // Permissive for development
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(
                state
                    .allowed_origins
                    .iter()
                    .map(|s| s.parse().unwrap())
                    .collect::<Vec<_>>(),
            )
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let auth_config = state.auth_config.clone();
    let rate_limiter = state.rate_limiter.clone();

    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/invoke", post(invoke))
        // Rate limiter runs after auth (innermost = last in request pipeline)
        .layer(middleware::from_fn(
            move |addr: ConnectInfo<SocketAddr>, req, next| {
                let rl = rate_limiter.clone();
                async move { rate_limit_middleware(addr, rl, req, next).await }
            },
        ))
        .layer(middleware::from_fn(move |req, next| {
            auth_middleware(auth_config.clone(), req, next)
        }))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the gateway server
pub async fn start_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let router = create_router(state);
    let addr = format!("{}:{}", host, port);

    info!(addr = %addr, "Starting gateway server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Gateway server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for Ctrl+C");
    info!("Shutdown signal received, draining connections...");
}

// --- Handlers ---

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.policy_outcome == LoadOutcome::Loaded {
        "ok"
    } else {
        // Policy fell back to the fail-closed empty set; every action denies
        "degraded"
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

const MAX_PROMPT_LENGTH: usize = 50_000; // 50KB

type ApiError = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Full request pipeline: input screen, then routing, then the action
/// guardrail. Each stage short-circuits with a client error on deny.
async fn invoke(
    State(state): State<AppState>,
    Json(req): Json<InvokeRequest>,
) -> Result<Json<InvokeResponse>, ApiError> {
    if req.prompt.len() > MAX_PROMPT_LENGTH {
        return Err(reject(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!(
                "Prompt exceeds maximum length of {} bytes",
                MAX_PROMPT_LENGTH
            ),
        ));
    }

    // Stage 1: input screen
    if let ScreenVerdict::Flagged(reason) = state.screener.screen_text(&req.prompt).await {
        warn!(reason = %reason, "Input screen blocked text prompt");
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "Malicious text detected in the prompt.",
        ));
    }

    if let Some(url) = &req.image_url {
        // A fetch failure blocks the request; unscreened images never pass
        let image = match fetch_image(&state.http, url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Image fetch failed; rejecting request");
                return Err(reject(
                    StatusCode::BAD_REQUEST,
                    "The provided image could not be retrieved for screening.",
                ));
            }
        };
        if let ScreenVerdict::Flagged(reason) = state.screener.screen_image(&image).await {
            warn!(reason = %reason, "Input screen blocked image");
            return Err(reject(
                StatusCode::BAD_REQUEST,
                "Malicious image detected at the provided URL.",
            ));
        }
    }

    // Stage 2: routing and the action guardrail
    let action = state.router.route(&req.prompt);
    let routed_to = palisade_core::Router::agent_name_for(&action);

    if let palisade_core::Verdict::Deny(reason) = state.guardrail.evaluate(&action) {
        // The fine-grained reason names rule content (keywords, extensions,
        // path prefixes), so it stays in the log; the client only learns
        // that the tool was blocked, not how to probe around the rule.
        warn!(
            tool = %action.tool,
            agent = routed_to,
            reason = %reason,
            "Action guardrail blocked proposed action"
        );
        return Err(reject(
            StatusCode::FORBIDDEN,
            format!(
                "The proposed agent action '{}' was blocked by the action policy.",
                action.tool
            ),
        ));
    }

    info!(tool = %action.tool, agent = routed_to, "Action approved");

    Ok(Json(InvokeResponse {
        status: "Success".to_string(),
        routed_to: routed_to.to_string(),
        agent_action: action,
        message: "The request passed all guardrails and the agent action was approved."
            .to_string(),
    }))
}
