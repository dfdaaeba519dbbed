//! Game configuration: advisory provider, model and credentials.

use crate::advisory::AdvisoryClient;
use crate::llm_client::{LlmClient, LlmConfig, LlmProvider};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Environment variables consulted for each provider's API key, in order.
fn api_key_vars(provider: LlmProvider) -> &'static [&'static str] {
    match provider {
        LlmProvider::Gemini => &["GEMINI_API_KEY", "API_KEY"],
        LlmProvider::OpenAI => &["OPENAI_API_KEY"],
        LlmProvider::Anthropic => &["ANTHROPIC_API_KEY"],
    }
}

/// Configuration for a game client.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// LLM provider (gemini, openai or anthropic).
    #[serde(default = "default_provider")]
    llm_provider: LlmProvider,

    /// LLM model name (e.g., "gemini-2.5-flash", "gpt-4o-mini").
    #[serde(default = "default_model")]
    llm_model: String,

    /// Maximum tokens for LLM responses.
    #[serde(default = "default_max_tokens")]
    llm_max_tokens: u32,

    /// Upper bound on one advisory round trip, in milliseconds.
    #[serde(default = "default_advisory_timeout_ms")]
    advisory_timeout_ms: u64,
}

fn default_provider() -> LlmProvider {
    LlmProvider::Gemini
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

fn default_advisory_timeout_ms() -> u64 {
    8_000
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            llm_provider: default_provider(),
            llm_model: default_model(),
            llm_max_tokens: default_max_tokens(),
            advisory_timeout_ms: default_advisory_timeout_ms(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(provider = ?config.llm_provider, model = %config.llm_model, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text. Missing keys take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads `path` if given, otherwise defaults.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                debug!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Advisory timeout as a [`Duration`].
    pub fn advisory_timeout(&self) -> Duration {
        Duration::from_millis(self.advisory_timeout_ms)
    }

    /// Creates LLM configuration from this config.
    /// Requires the provider's API key in the environment.
    #[instrument(skip(self), fields(provider = ?self.llm_provider, model = %self.llm_model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        self.create_llm_config_with(|name| std::env::var(name).ok())
    }

    /// Like [`GameConfig::create_llm_config`], reading variables through `lookup`.
    pub fn create_llm_config_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<LlmConfig, ConfigError> {
        debug!("Creating LLM config");
        let vars = api_key_vars(self.llm_provider);

        let api_key = vars
            .iter()
            .filter_map(|name| lookup(*name))
            .find(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::new(format!(
                    "{} environment variable not set",
                    vars.join(" or ")
                ))
            })?;

        Ok(LlmConfig::new(
            self.llm_provider,
            api_key,
            self.llm_model.clone(),
            self.llm_max_tokens,
        ))
    }

    /// Builds the advisory client, degrading to offline when no credential
    /// is available.
    #[instrument(skip(self))]
    pub fn advisory_client(&self) -> AdvisoryClient {
        match self.create_llm_config() {
            Ok(llm_config) => AdvisoryClient::new(
                Arc::new(LlmClient::new(llm_config)),
                self.advisory_timeout(),
            ),
            Err(e) => {
                warn!(error = %e, "Advisory disabled, game master will use fixed hints");
                AdvisoryClient::offline()
            }
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
