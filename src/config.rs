//! YAML configuration for a promptsmith session.
//!
//! One file configures the remote provider, the live-suggestion feed, the
//! offline fallback extractor and where the credential is kept.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "studio"
//!
//! provider:
//!   api_style: "anthropic"
//!   api_url: "https://api.anthropic.com/v1/messages"
//!   model: "my-model"
//!   api_timeout_secs: 30
//!   max_tokens: 1024
//!   enable_resilience: true
//!   retry_config:
//!     max_retries: 2
//!     base_delay: 200
//!     max_delay: 4000
//!     backoff_multiplier: 2.0
//!     jitter: true
//!
//! suggest:
//!   debounce_ms: 300
//!   min_query_chars: 2
//!   max_suggestions: 3
//!
//! fallback:
//!   min_word_len: 3
//!   max_tokens: 12
//!
//! credential:
//!   prefix: "sk-"
//!   min_len: 20
//!   path: "/home/me/.config/promptsmith/credential"
//!
//! style_mode: "structured"
//! ```
//!
//! `provider.api_key` is accepted but never serialized back out. Prefer the
//! credential store or `PROMPTSMITH_API_KEY`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use provider::{
    CredentialError, CredentialPolicy, CredentialStore, ProviderConfig, StyleMode,
    MAX_SUGGESTIONS,
};
use segment::FallbackConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding `provider.api_key`.
pub const ENV_API_KEY: &str = "PROMPTSMITH_API_KEY";
/// Environment variable overriding `provider.api_url`.
pub const ENV_API_URL: &str = "PROMPTSMITH_API_URL";
/// Environment variable overriding `provider.model`.
pub const ENV_MODEL: &str = "PROMPTSMITH_MODEL";

/// Why a configuration file could not be turned into a [`PromptsmithConfig`].
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PromptsmithConfig {
    /// Format version, `"1"` or `"1.0"`.
    pub version: String,

    /// Free-form label, shown in logs only.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub suggest: SuggestConfig,

    #[serde(default)]
    pub fallback: FallbackConfig,

    #[serde(default)]
    pub credential: CredentialConfig,

    /// Output form requested from the enhancement provider.
    #[serde(default)]
    pub style_mode: StyleMode,
}

impl PromptsmithConfig {
    /// Reads and validates the YAML file at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PromptsmithConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// [`from_file`](Self::from_file) followed by the process environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.provider
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("provider: {e}")))?;
        self.suggest.validate()?;
        self.fallback
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("fallback: {e}")))?;
        self.credential.validate()?;

        Ok(())
    }

    /// Applies `PROMPTSMITH_API_KEY`, `PROMPTSMITH_API_URL` and `PROMPTSMITH_MODEL`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Applies overrides from `lookup`; blank values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(key) = value(ENV_API_KEY) {
            self.provider.api_key = Some(key);
        }
        if let Some(url) = value(ENV_API_URL) {
            self.provider.api_url = url;
        }
        if let Some(model) = value(ENV_MODEL) {
            self.provider.model = model;
        }
    }
}

impl Default for PromptsmithConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            provider: ProviderConfig::default(),
            suggest: SuggestConfig::default(),
            fallback: FallbackConfig::default(),
            credential: CredentialConfig::default(),
            style_mode: StyleMode::default(),
        }
    }
}

/// Live-suggestion feed settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestConfig {
    /// Quiet period after the last keystroke before a query is sent.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Inputs with fewer trimmed characters clear the suggestions instead.
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,

    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

impl SuggestConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn with_min_query_chars(mut self, chars: usize) -> Self {
        self.min_query_chars = chars;
        self
    }

    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.max_suggestions == 0 || self.max_suggestions > MAX_SUGGESTIONS {
            return Err(ConfigLoadError::Validation(format!(
                "suggest.max_suggestions must be between 1 and {MAX_SUGGESTIONS}"
            )));
        }
        Ok(())
    }
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_chars: default_min_query_chars(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

/// Credential format and storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default = "default_min_len")]
    pub min_len: usize,

    /// Defaults to `<config dir>/promptsmith/credential`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl CredentialConfig {
    pub fn policy(&self) -> CredentialPolicy {
        CredentialPolicy::default()
            .with_prefix(self.prefix.clone())
            .with_min_len(self.min_len)
    }

    pub fn store(&self) -> Result<CredentialStore, CredentialError> {
        match &self.path {
            Some(path) => Ok(CredentialStore::new(path, self.policy())),
            None => CredentialStore::in_config_dir(self.policy()),
        }
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.min_len < self.prefix.chars().count() {
            return Err(ConfigLoadError::Validation(
                "credential.min_len must cover the prefix".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            min_len: default_min_len(),
            path: None,
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}
fn default_min_query_chars() -> usize {
    2
}
fn default_max_suggestions() -> usize {
    MAX_SUGGESTIONS
}
fn default_prefix() -> String {
    "sk-".to_string()
}
fn default_min_len() -> usize {
    20
}
