use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::scoring::{MAX_SCORE, MIN_SCORE, NEUTRAL_SCORE};

/// Environment variable consulted when the active provider has no API key
pub const API_KEY_ENV: &str = "NOUNPH_API_KEY";

/// Application configuration, loaded from and saved to JSON
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language for noun glosses; "auto" means the language of the input text
    #[serde(default = "default_gloss_language")]
    pub gloss_language: String,

    /// Oracle (LLM) config
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Session behaviour
    #[serde(default)]
    pub session: SessionConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// LLM backend used as the oracle
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OracleProvider {
    // @provider: Ollama
    Ollama,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
    // @provider: Google Gemini
    #[default]
    Gemini,
}

impl OracleProvider {
    /// Every supported provider
    pub const ALL: [OracleProvider; 5] = [
        Self::Ollama,
        Self::OpenAI,
        Self::Anthropic,
        Self::LMStudio,
        Self::Gemini,
    ];

    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::LMStudio => "LM Studio",
            Self::Gemini => "Gemini",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
            Self::Gemini => "gemini".to_string(),
        }
    }

    /// Hosted providers need an API key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic | Self::Gemini)
    }
}

impl std::fmt::Display for OracleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for OracleProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "lmstudio" => Ok(Self::LMStudio),
            "gemini" => Ok(Self::Gemini),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: HTTP timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: OracleProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(&provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(&provider_type),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Oracle configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OracleConfig {
    /// Provider to use
    #[serde(default)]
    pub provider: OracleProvider,

    /// Available providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Settings shared by all providers
    #[serde(default)]
    pub common: OracleCommonConfig,
}

/// Generation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OracleCommonConfig {
    /// Temperature for analysis (translation and tagging should be stable)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Temperature for creative rewriting
    #[serde(default = "default_rewrite_temperature")]
    pub rewrite_temperature: f32,

    /// Maximum number of tokens to generate per call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for OracleCommonConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            rewrite_temperature: default_rewrite_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Session settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionConfig {
    /// Target score preselected for rewrites
    #[serde(default = "default_target_score")]
    pub default_target_score: f64,

    /// Upper bound for a single analyze or rewrite call
    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_target_score: default_target_score(),
            operation_timeout_secs: default_operation_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_gloss_language() -> String {
    "auto".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_operation_timeout_secs() -> u64 {
    120
}

fn default_target_score() -> f64 {
    NEUTRAL_SCORE
}

fn default_temperature() -> f32 {
    0.2
}

fn default_rewrite_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_endpoint(provider: &OracleProvider) -> String {
    match provider {
        OracleProvider::Ollama => "http://localhost:11434".to_string(),
        OracleProvider::OpenAI => "https://api.openai.com/v1".to_string(),
        OracleProvider::Anthropic => "https://api.anthropic.com".to_string(),
        // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
        OracleProvider::LMStudio => "http://localhost:1234/v1".to_string(),
        OracleProvider::Gemini => "https://generativelanguage.googleapis.com".to_string(),
    }
}

fn default_model(provider: &OracleProvider) -> String {
    match provider {
        OracleProvider::Ollama => "llama3.1".to_string(),
        OracleProvider::OpenAI => "gpt-4o-mini".to_string(),
        OracleProvider::Anthropic => "claude-3-5-haiku-latest".to_string(),
        // Placeholder; users should set to the loaded model name in LM Studio
        OracleProvider::LMStudio => "local-model".to_string(),
        OracleProvider::Gemini => "gemini-2.5-flash".to_string(),
    }
}

impl Config {
    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .context(format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load `path`, or write and return the defaults when it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::from_file(path);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .context(format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Fill an empty API key of the active provider from `key`
    pub fn apply_api_key_fallback(&mut self, key: Option<String>) {
        let Some(key) = key.filter(|k| !k.trim().is_empty()) else {
            return;
        };
        let provider = self.oracle.provider.clone();
        let provider_config = self.oracle.active_provider_config_mut();
        if provider_config.api_key.is_empty() {
            provider_config.api_key = key;
        } else {
            log::debug!("Keeping configured API key for {}", provider.display_name());
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.gloss_language.trim().is_empty() {
            return Err(anyhow!("gloss_language must not be empty"));
        }

        if self.oracle.provider.requires_api_key() && self.oracle.get_api_key().is_empty() {
            return Err(anyhow!(
                "API key is required for {} provider (set it in the config or {})",
                self.oracle.provider.display_name(),
                API_KEY_ENV
            ));
        }

        let endpoint = self.oracle.get_endpoint();
        url::Url::parse(&endpoint).context(format!("Invalid endpoint URL: {}", endpoint))?;

        let temperatures = [self.oracle.common.temperature, self.oracle.common.rewrite_temperature];
        if temperatures.iter().any(|t| !(0.0..=2.0).contains(t)) {
            return Err(anyhow!("Temperatures must be between 0.0 and 2.0"));
        }

        if self.oracle.common.max_tokens == 0 {
            return Err(anyhow!("max_tokens must be greater than zero"));
        }

        if self.session.operation_timeout_secs == 0 {
            return Err(anyhow!("operation_timeout_secs must be greater than zero"));
        }

        let target = self.session.default_target_score;
        if !(MIN_SCORE..=MAX_SCORE).contains(&target) {
            return Err(anyhow!(
                "default_target_score must be between {} and {}, got {}",
                MIN_SCORE, MAX_SCORE, target
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            gloss_language: default_gloss_language(),
            oracle: OracleConfig::default(),
            session: SessionConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl OracleConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &OracleProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Active provider config, inserted with defaults when missing
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let index = match self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider.clone()));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.model.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| default_model(&self.provider))
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.endpoint.clone())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| default_endpoint(&self.provider))
    }

    /// Get the HTTP timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|t| *t > 0)
            .unwrap_or_else(default_timeout_secs)
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: OracleProvider::default(),
            available_providers: OracleProvider::ALL.iter().cloned().map(ProviderConfig::new).collect(),
            common: OracleCommonConfig::default(),
        }
    }
}
