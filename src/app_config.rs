use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

use crate::errors::AppError;
use crate::language_utils;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Languages that are left untranslated on the single-text path
    #[serde(default = "default_skip_languages")]
    pub skip_languages: Vec<String>,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Where EPG sources are listed and where results go
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    // @provider: Google Translate public endpoint
    #[default]
    Google,
    // @provider: OpenAI chat completions
    OpenAI,
}

impl ProviderKind {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google",
            Self::OpenAI => "ChatGPT",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::OpenAI => "openai".to_string(),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "openai" | "chatgpt" => Ok(Self::OpenAI),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type", default)]
    pub provider_type: ProviderKind,

    // @field: Model name (OpenAI only)
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL, empty for the provider default
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: ProviderKind) -> Self {
        match provider_type {
            ProviderKind::Google => Self {
                provider_type,
                model: String::new(),
                api_key: String::new(),
                endpoint: default_google_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
            ProviderKind::OpenAI => Self {
                provider_type,
                model: default_openai_model(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                timeout_secs: default_openai_timeout_secs(),
            },
        }
    }

    /// Endpoint to use, falling back to the provider default when unset
    pub fn effective_endpoint(&self) -> String {
        if !self.endpoint.is_empty() {
            return self.endpoint.clone();
        }
        match self.provider_type {
            ProviderKind::Google => default_google_endpoint(),
            ProviderKind::OpenAI => default_openai_endpoint(),
        }
    }

    /// Model to use, falling back to the provider default when unset
    pub fn effective_model(&self) -> String {
        if !self.model.is_empty() {
            return self.model.clone();
        }
        match self.provider_type {
            ProviderKind::Google => String::new(),
            ProviderKind::OpenAI => default_openai_model(),
        }
    }
}

fn default_primary_provider() -> ProviderConfig {
    ProviderConfig::new(ProviderKind::Google)
}

fn default_fallback_provider() -> ProviderConfig {
    ProviderConfig::new(ProviderKind::OpenAI)
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Number of fields sent to the primary provider per call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Number of fields sent to the fallback provider per call
    #[serde(default = "default_fallback_batch_size")]
    pub fallback_batch_size: usize,

    /// Number of batches translated concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Use the fallback provider unless a source overrides it
    #[serde(default)]
    pub enable_fallback: bool,

    /// Attempts per fallback chunk
    #[serde(default = "default_fallback_retry_count")]
    pub fallback_retry_count: u32,

    /// Backoff unit in milliseconds; the wait after attempt n is 2 * n units
    #[serde(default = "default_fallback_backoff_ms")]
    pub fallback_backoff_ms: u64,

    /// First-choice provider
    #[serde(default = "default_primary_provider")]
    pub primary: ProviderConfig,

    /// Provider used when the primary fails or returns the text unchanged
    #[serde(default = "default_fallback_provider")]
    pub fallback: ProviderConfig,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            fallback_batch_size: default_fallback_batch_size(),
            workers: default_workers(),
            enable_fallback: false,
            fallback_retry_count: default_fallback_retry_count(),
            fallback_backoff_ms: default_fallback_backoff_ms(),
            primary: default_primary_provider(),
            fallback: default_fallback_provider(),
        }
    }
}

/// Source list, filter file and output locations
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SourcesConfig {
    /// URLs of full guides to translate
    #[serde(default = "default_url_list_file")]
    pub url_list_file: String,

    /// Local paths of full guides to translate
    #[serde(default = "default_local_paths_file")]
    pub local_paths_file: String,

    /// Per-URL channel filters (header `URL`)
    #[serde(default = "default_url_filter_file")]
    pub url_filter_file: String,

    /// Per-path channel filters (header `PATH`)
    #[serde(default = "default_local_filter_file")]
    pub local_filter_file: String,

    /// Directory receiving translated guides
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Download timeout in seconds
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            url_list_file: default_url_list_file(),
            local_paths_file: default_local_paths_file(),
            url_filter_file: default_url_filter_file(),
            local_filter_file: default_local_filter_file(),
            output_folder: default_output_folder(),
            download_timeout_secs: default_download_timeout_secs(),
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
    /// Matching `log` filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_skip_languages() -> Vec<String> {
    ["en", "fr", "es", "it"].iter().map(|s| s.to_string()).collect()
}

fn default_batch_size() -> usize {
    500
}

fn default_fallback_batch_size() -> usize {
    50
}

fn default_workers() -> usize {
    1
}

fn default_fallback_retry_count() -> u32 {
    5
}

fn default_fallback_backoff_ms() -> u64 {
    1000 // 1 second unit: waits of 2s, 4s, 6s, 8s
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_openai_timeout_secs() -> u64 {
    60
}

fn default_google_endpoint() -> String {
    "https://translate.googleapis.com".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_url_list_file() -> String {
    "epg_urls.txt".to_string()
}

fn default_local_paths_file() -> String {
    "local_epg_paths.txt".to_string()
}

fn default_url_filter_file() -> String {
    "url_channel_filters.txt".to_string()
}

fn default_local_filter_file() -> String {
    "local_channel_filters.txt".to_string()
}

fn default_output_folder() -> String {
    "translated_epg_xmls".to_string()
}

fn default_download_timeout_secs() -> u64 {
    20
}

impl Config {
    /// Load a configuration file, writing the default one first when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| anyhow!("Failed to open config file {}: {}", path.display(), e))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))?;
            return Ok((config, false));
        }

        let config = Config::default();
        let json = serde_json::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config to JSON: {}", e))?;
        std::fs::write(path, json)
            .map_err(|e| anyhow!("Failed to write default config to file {}: {}", path.display(), e))?;
        Ok((config, true))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        language_utils::validate_language_code(&self.target_language)
            .map_err(|e| AppError::Config(format!("target_language: {}", e)))?;
        for code in &self.skip_languages {
            language_utils::validate_language_code(code)
                .map_err(|e| AppError::Config(format!("skip_languages: {}", e)))?;
        }

        let t = &self.translation;
        if t.batch_size == 0 || t.fallback_batch_size == 0 {
            return Err(AppError::Config("batch sizes must be greater than zero".to_string()));
        }
        if t.workers == 0 {
            return Err(AppError::Config("workers must be greater than zero".to_string()));
        }
        if t.fallback_retry_count == 0 {
            return Err(AppError::Config("fallback_retry_count must be greater than zero".to_string()));
        }

        if t.enable_fallback
            && t.fallback.provider_type == ProviderKind::OpenAI
            && t.fallback.api_key.is_empty()
        {
            return Err(AppError::Config(
                "An API key is required for the OpenAI fallback provider".to_string(),
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            skip_languages: default_skip_languages(),
            translation: TranslationConfig::default(),
            sources: SourcesConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
