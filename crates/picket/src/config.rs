use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub screen: ScreenConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on API routes; unset disables auth
    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default = "default_max_rpm")]
    pub max_requests_per_minute: u32,

    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PolicyConfig {
    #[serde(default = "default_policy_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ScreenConfig {
    #[serde(default = "default_text_model")]
    pub text_model: String,

    #[serde(default = "default_image_model")]
    pub image_model: String,

    #[serde(default = "default_nsfw_threshold")]
    pub nsfw_threshold: f64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_rpm() -> u32 {
    120
}

fn default_policy_path() -> String {
    "policy.toml".to_string()
}

fn default_text_model() -> String {
    "facebook/bart-large-mnli".to_string()
}

fn default_image_model() -> String {
    "Falconsai/nsfw_image_detection".to_string()
}

fn default_nsfw_threshold() -> f64 {
    0.8
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_token: None,
            max_requests_per_minute: default_max_rpm(),
            allowed_origins: vec![],
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            path: default_policy_path(),
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            text_model: default_text_model(),
            image_model: default_image_model(),
            nsfw_threshold: default_nsfw_threshold(),
        }
    }
}

impl PolicyConfig {
    /// Policy path with `~` expanded
    pub fn expanded_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).into_owned())
    }
}

/// Load config from file or use defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        let content =
            fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content).context("Failed to parse TOML config")?;

        Ok(config)
    } else {
        Ok(Config::default())
    }
}
