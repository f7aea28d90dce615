//! Configuration loading for the embedding pipeline.
//!
//! Layered precedence: built-in defaults -> config file -> environment
//! variables. The provider API key is environment-only and never written
//! to a config file.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CorpusError;

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// API key (loaded from env var, not stored in config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (e.g., "https://api.openai.com/v1")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Embedding model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Retry and backoff settings for provider calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Maximum attempts per batch call (first try included)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, in seconds; doubles on each retry
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,

    /// Upper bound on the delay between retries, in seconds
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_secs() -> u64 {
    2
}

fn default_max_delay_secs() -> u64 {
    10
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_secs: default_initial_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

impl RetrySettings {
    /// Delay before the first retry.
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    /// Upper bound on the delay between retries.
    pub fn max_delay(&self) -> Duration {
        Duration::from_secs(self.max_delay_secs)
    }
}

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the persisted embedding cache file
    #[serde(default = "default_cache_path")]
    pub cache_path: String,

    /// Expected embedding dimension; vectors of any other length are invalid
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Default chunk size for provider batch calls
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chunk size used by the pipeline (tuned below chunk_size for stability)
    #[serde(default = "default_pipeline_chunk_size")]
    pub pipeline_chunk_size: usize,

    /// Embedding provider configuration
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Retry configuration for provider calls
    #[serde(default)]
    pub retry: RetrySettings,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_cache_path() -> String {
    ProjectDirs::from("", "", "corpus-embed")
        .map(|p| p.data_local_dir().join("embedding-cache").join("embeddings.json"))
        .unwrap_or_else(|| PathBuf::from("./embedding-cache/embeddings.json"))
        .to_string_lossy()
        .to_string()
}

fn default_dimension() -> usize {
    1536
}

fn default_chunk_size() -> usize {
    100
}

fn default_pipeline_chunk_size() -> usize {
    50
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_path: default_cache_path(),
            dimension: default_dimension(),
            chunk_size: default_chunk_size(),
            pipeline_chunk_size: default_pipeline_chunk_size(),
            provider: ProviderSettings::default(),
            retry: RetrySettings::default(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/corpus-embed/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (CORPUS_*)
    ///
    /// Env format: flat keys use one underscore, nested keys use two —
    /// CORPUS_CACHE_PATH, CORPUS_DIMENSION, CORPUS_PROVIDER__API_KEY,
    /// CORPUS_RETRY__MAX_ATTEMPTS.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, CorpusError> {
        let config_dir = ProjectDirs::from("", "", "corpus-embed")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            // 1. Built-in defaults
            .set_default("cache_path", default_cache_path())
            .map_err(|e| CorpusError::Config(e.to_string()))?
            .set_default("dimension", default_dimension() as i64)
            .map_err(|e| CorpusError::Config(e.to_string()))?
            .set_default("chunk_size", default_chunk_size() as i64)
            .map_err(|e| CorpusError::Config(e.to_string()))?
            .set_default("pipeline_chunk_size", default_pipeline_chunk_size() as i64)
            .map_err(|e| CorpusError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| CorpusError::Config(e.to_string()))?
            .set_default("provider.base_url", default_base_url())
            .map_err(|e| CorpusError::Config(e.to_string()))?
            .set_default("provider.model", default_model())
            .map_err(|e| CorpusError::Config(e.to_string()))?
            // 2. Default config file (~/.config/corpus-embed/config.toml)
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        // 3. CLI-specified config file (higher precedence than default)
        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // 4. Environment variables (highest precedence)
        builder = builder.add_source(
            Environment::with_prefix("CORPUS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| CorpusError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| CorpusError::Config(e.to_string()))?;

        settings.validate().map_err(CorpusError::Config)?;

        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.dimension == 0 {
            return Err("dimension must be > 0".to_string());
        }
        if self.chunk_size == 0 || self.pipeline_chunk_size == 0 {
            return Err("chunk sizes must be > 0".to_string());
        }
        if self.retry.max_attempts == 0 {
            return Err("retry.max_attempts must be >= 1".to_string());
        }
        if self.retry.initial_delay_secs > self.retry.max_delay_secs {
            return Err(format!(
                "retry.initial_delay_secs ({}) exceeds retry.max_delay_secs ({})",
                self.retry.initial_delay_secs, self.retry.max_delay_secs
            ));
        }
        Ok(())
    }

    /// Expand ~ in cache_path to the actual home directory.
    pub fn expanded_cache_path(&self) -> PathBuf {
        if let Some(rest) = self.cache_path.strip_prefix("~/") {
            if let Ok(home) = std::env::var("HOME") {
                return PathBuf::from(home).join(rest);
            }
        }
        PathBuf::from(&self.cache_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.dimension, 1536);
        assert_eq!(settings.chunk_size, 100);
        assert_eq!(settings.pipeline_chunk_size, 50);
        assert_eq!(settings.provider.model, "text-embedding-ada-002");
        assert!(settings.provider.api_key.is_none());
    }

    #[test]
    fn test_retry_defaults() {
        let retry = RetrySettings::default();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.initial_delay(), Duration::from_secs(2));
        assert_eq!(retry.max_delay(), Duration::from_secs(10));
    }

    #[test]
    fn test_load_with_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.dimension, 1536);
        assert!(settings.provider.base_url.contains("openai"));
    }

    #[test]
    fn test_validate_rejects_zero_dimension() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());

        settings.dimension = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_delays() {
        let mut settings = Settings::default();
        settings.retry.initial_delay_secs = 30;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_expanded_cache_path_passthrough() {
        let mut settings = Settings::default();
        settings.cache_path = "/var/lib/corpus/embeddings.json".to_string();
        assert_eq!(
            settings.expanded_cache_path(),
            PathBuf::from("/var/lib/corpus/embeddings.json")
        );
    }
}
