//! # Application Configuration
//!
//! This module defines the configuration structure for `reviewlens-server` and
//! the logic for loading it from a `config.yml` file and environment variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use reviewlens::constants::{DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_REVIEW_CAP};
use serde::Deserialize;
use std::env;
use std::fs;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum number of reviews classified per request.
    #[serde(default = "default_review_cap")]
    pub review_cap: usize,
    /// Upper bound on a whole analysis, extraction included.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub classification: ClassificationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            review_cap: default_review_cap(),
            request_timeout_secs: default_request_timeout_secs(),
            extraction: ExtractionConfig::default(),
            classification: ClassificationConfig::default(),
        }
    }
}

/// How product pages are fetched.
#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionConfig {
    /// `"firecrawl"` or `"direct"`.
    #[serde(default = "default_extraction_strategy")]
    pub strategy: String,
    #[serde(default = "default_firecrawl_api_url")]
    pub api_url: String,
    /// Without a key the Firecrawl strategy degrades to direct fetching.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_extraction_timeout_secs")]
    pub timeout_secs: u64,
    /// Retry a failed Firecrawl fetch with a direct request.
    #[serde(default)]
    pub direct_fallback: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategy: default_extraction_strategy(),
            api_url: default_firecrawl_api_url(),
            api_key: None,
            timeout_secs: default_extraction_timeout_secs(),
            direct_fallback: false,
        }
    }
}

/// The AI provider that labels reviews.
#[derive(Debug, Deserialize, Clone)]
pub struct ClassificationConfig {
    /// The type of provider (`"gemini"` or `"local"`).
    #[serde(default = "default_classification_provider")]
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_classification_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Replaces the built-in classification instruction.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            provider: default_classification_provider(),
            api_url: None,
            api_key: None,
            model_name: default_model_name(),
            timeout_secs: default_classification_timeout_secs(),
            concurrency: default_concurrency(),
            max_retries: default_max_retries(),
            system_prompt: None,
        }
    }
}

fn default_port() -> u16 {
    9090
}

fn default_review_cap() -> usize {
    DEFAULT_REVIEW_CAP
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_extraction_strategy() -> String {
    "firecrawl".to_string()
}

fn default_firecrawl_api_url() -> String {
    "https://api.firecrawl.dev/v1/scrape".to_string()
}

fn default_extraction_timeout_secs() -> u64 {
    60
}

fn default_classification_provider() -> String {
    "gemini".to_string()
}

fn default_model_name() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_classification_timeout_secs() -> u64 {
    30
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

// Reads a file and substitutes `${VAR}` references with environment values.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(format!("Invalid substitution pattern: {e}")))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// - The file is `config_path_override`, else `config.yml` next to this crate's
///   manifest, else the `config.{AI_PROVIDER}.yml` template.
/// - Top-level keys like `port` are overridden by `PORT`, `REVIEW_CAP`, ...
/// - Nested keys are overridden by `REVIEWLENS_...` variables
///   (e.g. `REVIEWLENS_CLASSIFICATION__CONCURRENCY`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");

    let main_config_path = if let Some(override_path) = config_path_override {
        override_path.to_string()
    } else {
        let user_config_path = format!("{base_path}/config.yml");
        if std::path::Path::new(&user_config_path).exists() {
            info!("Loading user-defined configuration from '{user_config_path}'.");
            user_config_path
        } else {
            let provider = env::var("AI_PROVIDER").unwrap_or_else(|_| "gemini".to_string());
            let fallback_path = format!("{base_path}/config.{provider}.yml");
            info!("'{user_config_path}' not found. Falling back to '{fallback_path}' based on AI_PROVIDER='{provider}'.");
            fallback_path
        }
    };

    let main_content = read_and_substitute(&main_config_path)?
        .ok_or_else(|| ConfigError::NotFound(format!("Main config file not found at '{main_config_path}'. Please ensure 'config.yml' exists or your AI_PROVIDER is set to load a valid template ('gemini' or 'local').")))?;

    let settings = ConfigBuilder::builder()
        .add_source(File::from_str(&main_content, FileFormat::Yaml))
        .add_source(Environment::default())
        .add_source(
            Environment::with_prefix("REVIEWLENS")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
