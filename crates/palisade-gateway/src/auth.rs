use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use subtle::ConstantTimeEq;

const BEARER_PREFIX: &str = "Bearer ";

/// Bearer token authentication state. With no token configured, auth is off.
#[derive(Clone)]
pub struct AuthConfig {
    api_token: Option<String>,
}

impl AuthConfig {
    pub fn new(api_token: Option<String>) -> Self {
        Self { api_token }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_token.is_some()
    }
}

/// Authentication middleware. `/health` stays reachable without a token so
/// orchestration can probe a locked-down deployment.
pub async fn auth_middleware(
    auth_config: Arc<AuthConfig>,
    request: Request,
    next: Next,
) -> Response {
    if request.uri().path() == "/health" || !auth_config.is_enabled() {
        return next.run(request).await;
    }

    let presented = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_PREFIX));

    if let (Some(token), Some(expected)) = (presented, &auth_config.api_token) {
        // Constant-time compare to avoid leaking token bytes via timing
        if token.as_bytes().ct_eq(expected.as_bytes()).into() {
            return next.run(request).await;
        }
    }

    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}
