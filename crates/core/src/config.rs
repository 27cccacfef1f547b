use std::env;
use std::fmt;
use crate::error::{AppError, Result};
use dotenvy::dotenv;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_VISION_MODEL: &str = "google/medgemma-4b-it";
pub const DEFAULT_TEXT_MODEL: &str = "google/medgemma-27b";

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub vision_model: String,
    pub text_model: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        let mut config = Self::default();

        if let Ok(base) = env::var("MEDGEMMA_BASE_URL") {
            Url::parse(&base)
                .map_err(|e| AppError::config(format!("MEDGEMMA_BASE_URL is not a valid URL: {}", e)))?;
            config.base_url = base;
        }
        if let Ok(model) = env::var("MEDGEMMA_VISION_MODEL") {
            config.vision_model = model;
        }
        if let Ok(model) = env::var("MEDGEMMA_TEXT_MODEL") {
            config.text_model = model;
        }

        Ok(config)
    }

    /// Builds `<base>/<model_id>`, tolerating a trailing slash on the base.
    pub fn model_url(&self, model_id: &str) -> Result<Url> {
        let model_id = model_id.trim().trim_matches('/');
        if model_id.is_empty() {
            return Err(AppError::config("model id must not be empty"));
        }

        let base = self.base_url.trim_end_matches('/');
        Url::parse(&format!("{}/{}", base, model_id))
            .map_err(|e| AppError::config(format!("Invalid model URL for {}: {}", model_id, e)))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
        }
    }
}

/// Caller-supplied API token, forwarded as a bearer header and never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
