//! Configuration loading, validation, and management for Maitre.
//!
//! Loads configuration from `~/.maitre/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use maitre_core::classify::{DecodingProfile, QueryCategory};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.maitre/config.toml`.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Shared + fallback cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Remote generation backend settings
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Per-category decoding parameters
    #[serde(default)]
    pub decoding: DecodingConfig,

    /// Orchestrator persona and failure messaging
    #[serde(default)]
    pub responder: ResponderConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("cache", &self.cache)
            .field("inference", &self.inference)
            .field("decoding", &self.decoding)
            .field("responder", &self.responder)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Shared cache host
    #[serde(default = "default_cache_host")]
    pub host: String,

    /// Shared cache port
    #[serde(default = "default_cache_port")]
    pub port: u16,

    /// Optional shared cache password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// TTL for entries in the shared tier, seconds
    #[serde(default = "default_shared_ttl_secs")]
    pub shared_ttl_secs: u64,

    /// Per-operation timeout against the shared tier, milliseconds
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,

    /// Maximum entries held by the in-process fallback tier
    #[serde(default = "default_fallback_capacity")]
    pub fallback_capacity: usize,

    /// TTL for entries in the fallback tier, seconds
    #[serde(default = "default_fallback_ttl_secs")]
    pub fallback_ttl_secs: u64,
}

fn default_cache_host() -> String {
    "127.0.0.1".into()
}
fn default_cache_port() -> u16 {
    6379
}
fn default_shared_ttl_secs() -> u64 {
    3600
}
fn default_op_timeout_ms() -> u64 {
    1500
}
fn default_fallback_capacity() -> usize {
    500
}
fn default_fallback_ttl_secs() -> u64 {
    600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            host: default_cache_host(),
            port: default_cache_port(),
            password: None,
            shared_ttl_secs: default_shared_ttl_secs(),
            op_timeout_ms: default_op_timeout_ms(),
            fallback_capacity: default_fallback_capacity(),
            fallback_ttl_secs: default_fallback_ttl_secs(),
        }
    }
}

impl CacheConfig {
    /// Connection URL for the shared cache backend.
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!("redis://:{password}@{}:{}/", self.host, self.port),
            None => format!("redis://{}:{}/", self.host, self.port),
        }
    }
}

impl std::fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &redact(&self.password))
            .field("shared_ttl_secs", &self.shared_ttl_secs)
            .field("op_timeout_ms", &self.op_timeout_ms)
            .field("fallback_capacity", &self.fallback_capacity)
            .field("fallback_ttl_secs", &self.fallback_ttl_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Base URL of the generation backend
    #[serde(default = "default_inference_url")]
    pub base_url: String,

    /// Overall wall-clock budget for one generation, seconds
    #[serde(default = "default_inference_budget_secs")]
    pub budget_secs: u64,
}

fn default_inference_url() -> String {
    "http://127.0.0.1:8090".into()
}
fn default_inference_budget_secs() -> u64 {
    30
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_inference_url(),
            budget_secs: default_inference_budget_secs(),
        }
    }
}

/// Per-category decoding parameters.
///
/// Greetings run hot and short; catalog answers run cool and longer so the
/// model sticks to the supplied context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodingConfig {
    #[serde(default = "default_greeting_profile")]
    pub greeting: DecodingProfile,

    #[serde(default = "default_overview_profile")]
    pub catalog_overview: DecodingProfile,

    #[serde(default = "default_item_profile")]
    pub specific_item: DecodingProfile,

    #[serde(default = "default_item_profile")]
    pub dietary_filter: DecodingProfile,

    #[serde(default = "default_recommendation_profile")]
    pub recommendation: DecodingProfile,

    #[serde(default = "default_hours_profile")]
    pub hours: DecodingProfile,

    #[serde(default)]
    pub other: DecodingProfile,
}

fn default_greeting_profile() -> DecodingProfile {
    DecodingProfile {
        temperature: 0.9,
        max_output_tokens: 120,
    }
}
fn default_overview_profile() -> DecodingProfile {
    DecodingProfile {
        temperature: 0.3,
        max_output_tokens: 400,
    }
}
fn default_item_profile() -> DecodingProfile {
    DecodingProfile {
        temperature: 0.2,
        max_output_tokens: 300,
    }
}
fn default_recommendation_profile() -> DecodingProfile {
    DecodingProfile {
        temperature: 0.7,
        max_output_tokens: 350,
    }
}
fn default_hours_profile() -> DecodingProfile {
    DecodingProfile {
        temperature: 0.2,
        max_output_tokens: 120,
    }
}

impl Default for DecodingConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting_profile(),
            catalog_overview: default_overview_profile(),
            specific_item: default_item_profile(),
            dietary_filter: default_item_profile(),
            recommendation: default_recommendation_profile(),
            hours: default_hours_profile(),
            other: DecodingProfile::default(),
        }
    }
}

impl DecodingConfig {
    /// The profile to use for a classified category.
    pub fn profile_for(&self, category: QueryCategory) -> DecodingProfile {
        match category {
            QueryCategory::Greeting => self.greeting,
            QueryCategory::CatalogOverview => self.catalog_overview,
            QueryCategory::SpecificItem => self.specific_item,
            QueryCategory::DietaryFilter => self.dietary_filter,
            QueryCategory::Recommendation => self.recommendation,
            QueryCategory::Hours => self.hours,
            QueryCategory::Other => self.other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderConfig {
    /// Role/style preamble prepended to every prompt
    #[serde(default = "default_preamble")]
    pub preamble: String,

    /// Stable user-facing text returned on any unrecoverable failure
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
}

fn default_preamble() -> String {
    "You are the friendly virtual host of this venue. Answer the guest's \
     question using only the menu information provided. Be concise and warm. \
     If the information needed is not in the menu, say so politely."
        .into()
}

fn default_fallback_message() -> String {
    "I'm sorry, I can't answer that right now. Please try again in a moment.".into()
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            preamble: default_preamble(),
            fallback_message: default_fallback_message(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path with env overrides applied.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if let Ok(host) = std::env::var("MAITRE_CACHE_HOST") {
            config.cache.host = host;
        }
        if let Ok(port) = std::env::var("MAITRE_CACHE_PORT") {
            config.cache.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("MAITRE_CACHE_PORT is not a port: {port}"))
            })?;
        }
        if config.cache.password.is_none() {
            config.cache.password = std::env::var("MAITRE_CACHE_PASSWORD").ok();
        }
        if let Ok(url) = std::env::var("MAITRE_INFERENCE_URL") {
            config.inference.base_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".maitre")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, profile) in [
            ("greeting", &self.decoding.greeting),
            ("catalog_overview", &self.decoding.catalog_overview),
            ("specific_item", &self.decoding.specific_item),
            ("dietary_filter", &self.decoding.dietary_filter),
            ("recommendation", &self.decoding.recommendation),
            ("hours", &self.decoding.hours),
            ("other", &self.decoding.other),
        ] {
            if !(0.0..=2.0).contains(&profile.temperature) {
                return Err(ConfigError::ValidationError(format!(
                    "decoding.{name}.temperature must be between 0.0 and 2.0"
                )));
            }
            if profile.max_output_tokens == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "decoding.{name}.max_output_tokens must be > 0"
                )));
            }
        }

        if self.cache.fallback_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "cache.fallback_capacity must be > 0".into(),
            ));
        }

        if self.inference.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "inference.base_url must not be empty".into(),
            ));
        }

        if self.inference.budget_secs == 0 {
            return Err(ConfigError::ValidationError(
                "inference.budget_secs must be > 0".into(),
            ));
        }

        Ok(())
    }
}

fn dirs_home() -> PathBuf {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
