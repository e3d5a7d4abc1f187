use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Extraction config
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation pipeline settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Reasoning effort sent to the model, `none` to omit it
    #[serde(default = "default_reasoning_effort")]
    pub reasoning_effort: String,

    /// Output token budget per request
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Maximum characters per batch
    #[serde(default = "default_batch_chars")]
    pub batch_chars: usize,

    /// Maximum items per batch
    #[serde(default = "default_max_items_per_batch")]
    pub max_items_per_batch: usize,

    /// Attempts per batch before it is split
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Whether a non-blank part may come back blank
    #[serde(default = "default_true")]
    pub allow_empty_parts: bool,

    /// Mask URLs, identifiers and similar tokens before translation
    #[serde(default = "default_true")]
    pub token_protect: bool,

    /// Require placeholders to keep their order
    #[serde(default)]
    pub token_protect_strict: bool,

    /// Start a new batch at section changes once a batch is reasonably full
    #[serde(default = "default_true")]
    pub prefer_section_boundary: bool,

    /// Use the persistent translation cache
    #[serde(default = "default_true")]
    pub use_cache: bool,

    /// Cache database file, defaults to the user cache directory
    #[serde(default)]
    pub cache_path: Option<PathBuf>,

    /// API key; `OPENAI_API_KEY` is used when empty
    #[serde(default = "String::new")]
    pub api_key: String,

    /// API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on glossary size
    #[serde(default = "default_glossary_max_terms")]
    pub glossary_max_terms: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            reasoning_effort: default_reasoning_effort(),
            max_output_tokens: default_max_output_tokens(),
            batch_chars: default_batch_chars(),
            max_items_per_batch: default_max_items_per_batch(),
            max_retries: default_max_retries(),
            allow_empty_parts: true,
            token_protect: true,
            token_protect_strict: false,
            prefer_section_boundary: true,
            use_cache: true,
            cache_path: None,
            api_key: String::new(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            glossary_max_terms: default_glossary_max_terms(),
        }
    }
}

impl TranslationConfig {
    /// Get the API key, falling back to the environment
    pub fn get_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        std::env::var("OPENAI_API_KEY").unwrap_or_default()
    }

    /// Get the cache database path
    pub fn get_cache_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.cache_path {
            return Ok(path.clone());
        }

        let base_dir = dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
            .ok_or_else(|| anyhow!("Could not determine cache directory"))?;

        Ok(base_dir.join(DEFAULT_CACHE_DIRNAME).join(DEFAULT_CACHE_FILENAME))
    }
}

/// How text is grouped into blocks
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationUnitMode {
    /// One block per content container
    #[default]
    Block,
    /// One block per text node
    TextNode,
}

/// Policy for `alt` attributes
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AltMode {
    /// Translate short, non-technical alt texts
    #[default]
    Auto,
    /// Always translate
    On,
    /// Never translate
    Off,
}

/// Extraction settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExtractionConfig {
    /// Grouping of text into blocks
    #[serde(default)]
    pub translation_unit: TranslationUnitMode,

    /// Translate `title`, `aria-label`, `placeholder` and `alt`
    #[serde(default = "default_true")]
    pub translate_attrs: bool,

    /// Policy for `alt` attributes
    #[serde(default)]
    pub translate_alt: AltMode,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            translation_unit: TranslationUnitMode::default(),
            translate_attrs: true,
            translate_alt: AltMode::default(),
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
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Default cache database filename
const DEFAULT_CACHE_FILENAME: &str = "translation_cache.sqlite3";

/// Default cache directory name under the user's cache directory
const DEFAULT_CACHE_DIRNAME: &str = "weblingo";

/// Reasoning efforts accepted by the API
const REASONING_EFFORTS: &[&str] = &["none", "minimal", "low", "medium", "high"];

fn default_target_language() -> String {
    "ru".to_string()
}

fn default_model() -> String {
    "gpt-5.1".to_string()
}

fn default_reasoning_effort() -> String {
    "medium".to_string()
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_batch_chars() -> usize {
    4000
}

fn default_max_items_per_batch() -> usize {
    40
}

fn default_max_retries() -> u32 {
    6
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    90
}

fn default_glossary_max_terms() -> usize {
    60
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load the configuration from a JSON file, creating a default one if missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            return serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path));
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::get_language_name(&self.target_language)?;

        let translation = &self.translation;
        if translation.model.trim().is_empty() {
            return Err(anyhow!("Model name must not be empty"));
        }
        if !REASONING_EFFORTS.contains(&translation.reasoning_effort.as_str()) {
            return Err(anyhow!(
                "Invalid reasoning effort '{}', expected one of: {}",
                translation.reasoning_effort,
                REASONING_EFFORTS.join(", ")
            ));
        }
        if translation.batch_chars == 0 || translation.max_items_per_batch == 0 {
            return Err(anyhow!("Batch limits must be greater than zero"));
        }
        if translation.max_retries == 0 {
            return Err(anyhow!("max_retries must be at least 1"));
        }
        url::Url::parse(&translation.endpoint)
            .with_context(|| format!("Invalid endpoint URL: {}", translation.endpoint))?;

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            extraction: ExtractionConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
