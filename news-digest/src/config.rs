use crate::types::{DigestError, FeedCategory, FetchConfig, Result, TimeBucketPolicy};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "digest.toml";

/// Top-level configuration, read from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    pub feeds: Vec<FeedCategory>,
    pub fetch: FetchConfig,
    pub annotator: AnnotatorConfig,
    pub store: StoreConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Base URL of an OpenAI-compatible API.
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    /// Temperature used for the monthly overview request.
    pub overview_temperature: f32,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_seconds: u64,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.3,
            overview_temperature: 0.4,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_seconds: 60,
        }
    }
}

impl AnnotatorConfig {
    /// Read the API key. A missing key is fatal for any workflow that calls the service.
    pub fn api_key(&self) -> Result<String> {
        match env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(DigestError::Config(format!(
                "API key not found. Set the {} environment variable.",
                self.api_key_env
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://digest.db?mode=rwc".to_string(),
        }
    }
}

impl StoreConfig {
    /// `DATABASE_URL` wins over the file setting.
    pub fn resolved_url(&self) -> String {
        env::var("DATABASE_URL").unwrap_or_else(|_| self.database_url.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pause between annotation calls, to stay under upstream rate limits.
    pub request_delay_ms: u64,
    pub time_bucket_policy: TimeBucketPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 1000,
            time_bucket_policy: TimeBucketPolicy::default(),
        }
    }
}

impl DigestConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DigestError::Config(format!("invalid config: {}", e)))
    }

    /// Load the config from `path`. Returns defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(?path, "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| DigestError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    pub fn feed_count(&self) -> usize {
        self.feeds.iter().map(|category| category.urls.len()).sum()
    }
}
