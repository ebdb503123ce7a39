//! Hugging Face inference API screener: zero-shot text classification plus
//! NSFW image detection.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use super::{ScreenVerdict, Screener};

const HF_API_BASE: &str = "https://api-inference.huggingface.co/models";
const TEXT_MODEL: &str = "facebook/bart-large-mnli";
const IMAGE_MODEL: &str = "Falconsai/nsfw_image_detection";

const SAFE_LABEL: &str = "safe user query";
const CANDIDATE_LABELS: [&str; 4] = [
    SAFE_LABEL,
    "harmful instruction",
    "prompt injection attack",
    "toxic language",
];

const NSFW_SCORE_THRESHOLD: f64 = 0.8;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Screener backed by hosted moderation models on the Hugging Face
/// inference API.
pub struct HfScreener {
    client: Client,
    api_token: String,
    text_url: String,
    image_url: String,
    nsfw_threshold: f64,
}

impl HfScreener {
    pub fn new(api_token: &str) -> Self {
        let client = ClientBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            api_token: api_token.to_string(),
            text_url: format!("{}/{}", HF_API_BASE, TEXT_MODEL),
            image_url: format!("{}/{}", HF_API_BASE, IMAGE_MODEL),
            nsfw_threshold: NSFW_SCORE_THRESHOLD,
        }
    }

    /// Override the moderation models. Accepts either a model id (resolved
    /// against the hosted inference API) or a full endpoint URL.
    pub fn with_models(mut self, text_model: &str, image_model: &str) -> Self {
        self.text_url = model_url(text_model);
        self.image_url = model_url(image_model);
        self
    }

    pub fn with_nsfw_threshold(mut self, threshold: f64) -> Self {
        self.nsfw_threshold = threshold;
        self
    }

    async fn classify_text(&self, text: &str) -> anyhow::Result<ZeroShotResponse> {
        let body = json!({
            "inputs": text,
            "parameters": { "candidate_labels": CANDIDATE_LABELS },
        });

        let response = self
            .client
            .post(&self.text_url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    async fn classify_image(&self, image: &[u8]) -> anyhow::Result<Vec<ImageLabel>> {
        let response = self
            .client
            .post(&self.image_url)
            .bearer_auth(&self.api_token)
            .body(image.to_vec())
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Screener for HfScreener {
    async fn screen_text(&self, text: &str) -> ScreenVerdict {
        info!(chars = text.len(), "Screening text input");

        match self.classify_text(text).await {
            Ok(response) => {
                let verdict = interpret_zero_shot(&response);
                if let ScreenVerdict::Flagged(reason) = &verdict {
                    warn!(reason = %reason, "Text input flagged");
                }
                verdict
            }
            Err(e) => {
                // Fail closed: an unreachable moderation backend blocks input.
                error!(error = %e, "Text moderation call failed; flagging input");
                ScreenVerdict::Flagged("text moderation unavailable".to_string())
            }
        }
    }

    async fn screen_image(&self, image: &[u8]) -> ScreenVerdict {
        info!(bytes = image.len(), "Screening image input");

        match self.classify_image(image).await {
            Ok(labels) => {
                let verdict = interpret_image_labels(&labels, self.nsfw_threshold);
                if let ScreenVerdict::Flagged(reason) = &verdict {
                    warn!(reason = %reason, "Image input flagged");
                }
                verdict
            }
            Err(e) => {
                error!(error = %e, "Image moderation call failed; flagging input");
                ScreenVerdict::Flagged("image moderation unavailable".to_string())
            }
        }
    }
}

/// Zero-shot classification response: labels with parallel scores.
#[derive(Debug, Deserialize)]
struct ZeroShotResponse {
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    scores: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ImageLabel {
    label: String,
    #[serde(default)]
    score: f64,
}

fn model_url(model: &str) -> String {
    if model.starts_with("http://") || model.starts_with("https://") {
        model.to_string()
    } else {
        format!("{}/{}", HF_API_BASE, model)
    }
}

fn interpret_zero_shot(response: &ZeroShotResponse) -> ScreenVerdict {
    if response.labels.is_empty() || response.scores.is_empty() {
        return ScreenVerdict::Flagged("empty classifier response".to_string());
    }

    let top = response
        .labels
        .iter()
        .zip(&response.scores)
        .max_by(|a, b| a.1.total_cmp(b.1));

    match top {
        Some((label, _)) if label == SAFE_LABEL => ScreenVerdict::Safe,
        Some((label, score)) => {
            ScreenVerdict::Flagged(format!("classified as '{}' ({:.4})", label, score))
        }
        None => ScreenVerdict::Flagged("empty classifier response".to_string()),
    }
}

fn interpret_image_labels(labels: &[ImageLabel], threshold: f64) -> ScreenVerdict {
    for entry in labels {
        if entry.label == "nsfw" && entry.score > threshold {
            return ScreenVerdict::Flagged(format!("nsfw score {:.4}", entry.score));
        }
    }
    ScreenVerdict::Safe
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_top_label_passes() {
        let response = ZeroShotResponse {
            labels: vec![SAFE_LABEL.to_string(), "toxic language".to_string()],
            scores: vec![0.91, 0.09],
        };
        assert_eq!(interpret_zero_shot(&response), ScreenVerdict::Safe);
    }

    #[test]
    fn unsafe_top_label_flags() {
        let response = ZeroShotResponse {
            labels: vec![SAFE_LABEL.to_string(), "prompt injection attack".to_string()],
            scores: vec![0.2, 0.8],
        };
        assert!(interpret_zero_shot(&response).is_flagged());
    }

    #[test]
    fn empty_classifier_response_flags() {
        let response = ZeroShotResponse {
            labels: vec![],
            scores: vec![],
        };
        assert!(interpret_zero_shot(&response).is_flagged());
    }

    #[test]
    fn nsfw_over_threshold_flags() {
        let labels = vec![
            ImageLabel {
                label: "normal".to_string(),
                score: 0.1,
            },
            ImageLabel {
                label: "nsfw".to_string(),
                score: 0.95,
            },
        ];
        assert!(interpret_image_labels(&labels, 0.8).is_flagged());
    }

    #[test]
    fn with_models_accepts_ids_and_full_urls() {
        let screener = HfScreener::new("token")
            .with_models("org/text-model", "https://moderation.internal/v1/nsfw");
        assert_eq!(
            screener.text_url,
            format!("{}/org/text-model", HF_API_BASE)
        );
        assert_eq!(screener.image_url, "https://moderation.internal/v1/nsfw");
    }

    #[test]
    fn nsfw_under_threshold_passes() {
        let labels = vec![ImageLabel {
            label: "nsfw".to_string(),
            score: 0.5,
        }];
        assert_eq!(interpret_image_labels(&labels, 0.8), ScreenVerdict::Safe);
    }
}
