use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::retry::RetryConfig;

/// Request/response shape spoken by the remote endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStyle {
    /// Messages API: `x-api-key` + `anthropic-version`, reply in `content[].text`.
    Anthropic,
    /// Chat completions: bearer auth, reply in `choices[0].message.content`.
    #[default]
    #[serde(alias = "open_ai", alias = "gpt")]
    OpenAi,
    /// `{"system", "prompt"}` in, `{"text"}` or `{"output"}` out. Key optional.
    Custom,
}

impl ApiStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiStyle::Anthropic => "anthropic",
            ApiStyle::OpenAi => "openai",
            ApiStyle::Custom => "custom",
        }
    }

    /// Whether requests are refused up front when no key is configured.
    pub fn requires_key(self) -> bool {
        !matches!(self, ApiStyle::Custom)
    }
}

/// Connection settings for [`LlmClient`](crate::LlmClient).
///
/// # Example
/// ```
/// use provider::{ApiStyle, ProviderConfig};
///
/// let cfg = ProviderConfig::default()
///     .with_api_style(ApiStyle::Custom)
///     .with_api_url("http://localhost:8080/generate");
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_style: ApiStyle,
    pub api_url: String,
    pub model: String,
    /// Never serialized; supplied by the credential store or the environment.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Overall request timeout in seconds.
    pub api_timeout_secs: Option<u64>,
    /// Completion length limit sent with each request.
    pub max_tokens: u32,
    /// Retry configuration; defaults apply when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_config: Option<RetryConfig>,
    /// Retry transient failures. Disabled, every request is tried once.
    pub enable_resilience: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_style: ApiStyle::OpenAi,
            api_url: "https://api.openai.com/v1/chat/completions".into(),
            model: "gpt-4o-mini".into(),
            api_key: None,
            api_timeout_secs: Some(30),
            max_tokens: 1024,
            retry_config: None,
            enable_resilience: true,
        }
    }
}

impl ProviderConfig {
    pub fn with_api_style(mut self, style: ApiStyle) -> Self {
        self.api_style = style;
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.api_timeout_secs = Some(secs);
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry_config = Some(retry);
        self
    }

    pub fn with_resilience(mut self, enabled: bool) -> Self {
        self.enable_resilience = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        let url = self.api_url.trim();
        if url.is_empty() {
            return Err(ProviderError::InvalidConfig("api_url must not be empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ProviderError::InvalidConfig(format!(
                "api_url must be http(s): {url}"
            )));
        }
        if self.api_style != ApiStyle::Custom && self.model.trim().is_empty() {
            return Err(ProviderError::InvalidConfig(format!(
                "model is required for the {} api style",
                self.api_style.as_str()
            )));
        }
        if self.max_tokens == 0 {
            return Err(ProviderError::InvalidConfig("max_tokens must be >= 1".into()));
        }
        if self.api_timeout_secs == Some(0) {
            return Err(ProviderError::InvalidConfig(
                "api_timeout_secs must be >= 1".into(),
            ));
        }
        Ok(())
    }

    /// Configured key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
