use palisade_core::Action;
use serde::{Deserialize, Serialize};

/// Invoke request: the raw user prompt plus an optional image to screen
#[derive(Debug, Deserialize)]
pub struct InvokeRequest {
    pub prompt: String,
    pub image_url: Option<String>,
}

/// Successful invoke response: the approved action, echoed back
#[derive(Debug, Serialize)]
pub struct InvokeResponse {
    pub status: String,
    pub routed_to: String,
    pub agent_action: Action,
    pub message: String,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
