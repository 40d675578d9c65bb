//! TripPlanner configuration types and loading

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main TripPlanner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level override (trace, debug, info, warn, error)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Completion provider configuration
    pub llm: LlmConfig,

    /// Travel-data provider configuration
    pub travel: TravelConfig,

    /// Pipeline behavior
    pub pipeline: PipelineConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Static credential table
    pub auth: AuthConfig,
}

const CONFIG_FILE: &str = "tripplanner.yml";

impl Config {
    /// Fail fast on settings `generate` cannot run without
    pub fn validate(&self) -> Result<()> {
        eyre::ensure!(
            std::env::var(&self.llm.api_key_env).is_ok(),
            "LLM API key not found. Set the {} environment variable.",
            self.llm.api_key_env
        );
        eyre::ensure!(
            matches!(self.llm.provider.as_str(), "openai" | "anthropic"),
            "Unknown LLM provider: '{}'. Supported: openai, anthropic",
            self.llm.provider
        );
        eyre::ensure!(
            (1..=365).contains(&self.pipeline.default_duration_days),
            "pipeline.default-duration-days must be between 1 and 365"
        );
        Ok(())
    }

    /// Load configuration
    ///
    /// An explicit path must load. Otherwise `./tripplanner.yml`, then
    /// `~/.config/tripplanner/tripplanner.yml`, are tried in turn; a broken
    /// candidate is skipped with a warning. Defaults apply when none loads.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let candidates = std::iter::once(PathBuf::from(CONFIG_FILE))
            .chain(dirs::config_dir().map(|dir| dir.join("tripplanner").join(CONFIG_FILE)));

        for candidate in candidates.filter(|p| p.exists()) {
            match Self::load_from_file(&candidate) {
                Ok(config) => return Ok(config),
                Err(e) => tracing::warn!(path = %candidate.display(), error = %e, "Skipping unreadable config"),
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }
}

/// Completion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "openai" (any chat-completions gateway) or "anthropic"
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).context(format!("Environment variable {} not set", self.api_key_env))
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 4096,
            timeout_ms: 120_000,
        }
    }
}

/// Travel-data provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelConfig {
    /// Whether enrichment lookups are attempted at all
    pub enabled: bool,

    /// Environment variable containing the client id
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Environment variable containing the client secret
    #[serde(rename = "api-secret-env")]
    pub api_secret_env: String,

    /// API base URL (versioned paths are appended)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// OAuth2 token endpoint
    #[serde(rename = "token-url")]
    pub token_url: String,

    /// Departure location code for flight lookups
    #[serde(rename = "origin-code")]
    pub origin_code: String,

    /// Flight offers requested per lookup
    #[serde(rename = "max-flight-offers")]
    pub max_flight_offers: u32,

    /// Properties priced per lodging lookup
    #[serde(rename = "max-lodging-lookups")]
    pub max_lodging_lookups: usize,

    /// Seconds before expiry a cached token stops being used
    #[serde(rename = "token-margin-secs")]
    pub token_margin_secs: u64,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl TravelConfig {
    /// Client id and secret, when both environment variables are set
    pub fn credentials(&self) -> Option<(String, String)> {
        let key = std::env::var(&self.api_key_env).ok()?;
        let secret = std::env::var(&self.api_secret_env).ok()?;
        Some((key, secret))
    }
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: "AMADEUS_API_KEY".to_string(),
            api_secret_env: "AMADEUS_API_SECRET".to_string(),
            base_url: "https://test.api.amadeus.com".to_string(),
            token_url: "https://test.api.amadeus.com/v1/security/oauth2/token".to_string(),
            origin_code: "NYC".to_string(),
            max_flight_offers: 5,
            max_lodging_lookups: 5,
            token_margin_secs: 60,
            timeout_ms: 15_000,
        }
    }
}

/// Pipeline behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Trip length used when the trip has no dates
    #[serde(rename = "default-duration-days")]
    pub default_duration_days: u32,

    /// Upper bound on each completion call in milliseconds
    #[serde(rename = "stage-timeout-ms")]
    pub stage_timeout_ms: u64,

    /// Directory of `.pmt` overrides for the embedded prompt templates
    #[serde(rename = "prompts-dir")]
    pub prompts_dir: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_duration_days: 5,
            stage_timeout_ms: 180_000,
            prompts_dir: None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the trip store database
    #[serde(rename = "store-dir")]
    pub store_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // XDG data directory (~/.local/share/tripplanner on Linux)
        let store_dir = dirs::data_dir()
            .map(|d| d.join("tripplanner"))
            .unwrap_or_else(|| PathBuf::from(".tripstore"))
            .to_string_lossy()
            .into_owned();

        Self { store_dir }
    }
}

/// Static credential table: bearer credential -> user id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub credentials: HashMap<String, String>,
}
