//! Input screening: moderation checks on the raw request before any routing
//! or action evaluation happens.
//!
//! Screeners never surface transport errors to callers. A moderation call
//! that times out or fails maps to `Flagged`, so an unavailable moderation
//! backend blocks traffic instead of waving it through.

pub mod huggingface;

use anyhow::{Context, Result};
use async_trait::async_trait;

pub use huggingface::HfScreener;

/// Outcome of screening one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenVerdict {
    Safe,
    Flagged(String),
}

impl ScreenVerdict {
    pub fn is_flagged(&self) -> bool {
        matches!(self, ScreenVerdict::Flagged(_))
    }
}

/// Moderation backend abstraction, mirroring how LLM providers are injected
/// elsewhere in the stack: the gateway holds an `Arc<dyn Screener>` and tests
/// substitute a canned implementation.
#[async_trait]
pub trait Screener: Send + Sync {
    /// Classify free text as safe or malicious.
    async fn screen_text(&self, text: &str) -> ScreenVerdict;

    /// Classify raw image bytes as safe or NSFW.
    async fn screen_image(&self, image: &[u8]) -> ScreenVerdict;
}

/// Download image bytes for screening. Callers treat any failure here as a
/// flagged input.
pub async fn fetch_image(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch image from {}", url))?
        .error_for_status()
        .context("Image fetch returned an error status")?;

    let bytes = response
        .bytes()
        .await
        .context("Failed to read image body")?;
    Ok(bytes.to_vec())
}
