//! Connection settings for the text and image services.
//!
//! Credentials are plain fields handed to the client constructors; nothing is
//! read from global state after startup.

use esl_core::{Error, ImageFormat, Result};
use serde::Deserialize;

/// Environment variable consulted for the text service key.
pub const TEXT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable consulted for the image service key.
pub const IMAGE_API_KEY_ENV: &str = "STABILITY_API_KEY";

fn default_text_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_text_timeout() -> u64 {
    120
}

fn default_image_api_url() -> String {
    "https://api.stability.ai/v2beta/stable-image/generate/ultra".to_string()
}

fn default_image_timeout() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

/// Settings for the chat-completions text service.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextServiceConfig {
    /// Base URL; `/chat/completions` is appended.
    #[serde(default = "default_text_api_url")]
    pub api_url: String,

    /// Bearer token. Falls back to `OPENAI_API_KEY` when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Attach the JSON schema as `response_format`. Some reasoning models reject it.
    #[serde(default = "default_true")]
    pub response_schema: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_text_timeout")]
    pub timeout_secs: u64,
}

impl Default for TextServiceConfig {
    fn default() -> Self {
        Self {
            api_url: default_text_api_url(),
            api_key: None,
            model: default_model(),
            response_schema: true,
            timeout_secs: default_text_timeout(),
        }
    }
}

impl std::fmt::Debug for TextServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextServiceConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("response_schema", &self.response_schema)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl TextServiceConfig {
    /// The configured key, or the one from the environment.
    pub fn resolve_api_key(&self) -> Result<String> {
        resolve_key(self.api_key.as_deref(), TEXT_API_KEY_ENV)
    }
}

/// Settings for the image-generation service.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageServiceConfig {
    /// Full endpoint URL.
    #[serde(default = "default_image_api_url")]
    pub api_url: String,

    /// Bearer token. Falls back to `STABILITY_API_KEY` when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Requested raster encoding.
    #[serde(default = "default_output_format")]
    pub output_format: ImageFormat,

    /// Request timeout in seconds.
    #[serde(default = "default_image_timeout")]
    pub timeout_secs: u64,
}

fn default_output_format() -> ImageFormat {
    ImageFormat::Png
}

impl Default for ImageServiceConfig {
    fn default() -> Self {
        Self {
            api_url: default_image_api_url(),
            api_key: None,
            output_format: default_output_format(),
            timeout_secs: default_image_timeout(),
        }
    }
}

impl std::fmt::Debug for ImageServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageServiceConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("output_format", &self.output_format)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ImageServiceConfig {
    /// The configured key, or the one from the environment.
    pub fn resolve_api_key(&self) -> Result<String> {
        resolve_key(self.api_key.as_deref(), IMAGE_API_KEY_ENV)
    }
}

fn resolve_key(configured: Option<&str>, env_var: &str) -> Result<String> {
    if let Some(key) = configured.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    match std::env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(Error::ConfigError(format!(
            "no API key configured; set {} or add api_key to the config file",
            env_var
        ))),
    }
}
