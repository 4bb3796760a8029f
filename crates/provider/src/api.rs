use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, info_span, warn, Instrument};

use crate::config::{ApiStyle, ProviderConfig};
use crate::error::ProviderError;
use crate::json::extract_json_object;
use crate::prompts::{enhance_instructions, ALTERNATIVES_INSTRUCTIONS, SUGGEST_INSTRUCTIONS};
use crate::retry::{execute_with_retry_async, RetryResult};
use crate::traits::{AlternativesProvider, EnhancementProvider, SuggestionProvider};
use crate::types::{parse_prompt, parse_suggestions, parse_token_records, StyleMode, TokenRecord};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// HTTP client for a remote language model, implementing all three provider traits.
///
/// Every request sends one system instruction plus the user text and expects
/// a JSON object back inside the model's reply text.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: ProviderConfig,
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        config.validate()?;
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(8);
        if let Some(secs) = config.api_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ProviderError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Sends one instruction/text exchange and recovers the JSON object from the reply.
    pub async fn request_json(
        &self,
        instructions: &str,
        text: &str,
        operation: &'static str,
    ) -> Result<Map<String, Value>, ProviderError> {
        let style = self.config.api_style;
        let span = info_span!(
            "provider.request",
            provider = style.as_str(),
            operation,
            input_len = text.len()
        );

        async move {
            let key = self.require_key()?;
            let payload = build_payload(style, &self.config, instructions, text);

            let outcome = if self.config.enable_resilience {
                let retry_cfg = self.config.retry_config.unwrap_or_default();
                execute_with_retry_async(
                    &retry_cfg,
                    |attempt| {
                        if attempt > 0 {
                            warn!(attempt, provider = style.as_str(), operation, "retry_attempt");
                        }
                        self.send(key, &payload)
                    },
                    ProviderError::is_retryable,
                )
                .await
            } else {
                RetryResult {
                    result: self.send(key, &payload).await,
                    attempts: 1,
                    total_duration: Duration::ZERO,
                }
            };

            debug!(
                attempts = outcome.attempts,
                elapsed_ms = outcome.total_duration.as_millis() as u64,
                ok = outcome.is_success(),
                "provider_response"
            );
            let body = outcome.into_result()?;
            let reply = extract_reply_text(style, &body)?;
            extract_json_object(&reply)
        }
        .instrument(span)
        .await
    }

    /// The configured key, or `InvalidCredential` when the style needs one and none is set.
    fn require_key(&self) -> Result<Option<&str>, ProviderError> {
        match self.config.api_key() {
            Some(key) => Ok(Some(key)),
            None if self.config.api_style.requires_key() => Err(
                ProviderError::InvalidCredential("no API key configured".into()),
            ),
            None => Ok(None),
        }
    }

    async fn send(&self, key: Option<&str>, payload: &Value) -> Result<Value, ProviderError> {
        let mut request = self
            .http
            .post(&self.config.api_url)
            .header("Content-Type", "application/json");
        request = match (self.config.api_style, key) {
            (ApiStyle::Anthropic, Some(key)) => request
                .header("x-api-key", key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            (_, Some(key)) => request.bearer_auth(key),
            (_, None) => request,
        };

        let response = request
            .json(payload)
            .send()
            .await
            .map_err(ProviderError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ProviderError::transport)?;
        if !status.is_success() {
            return Err(ProviderError::from_status(status, &body));
        }

        // Custom endpoints may answer with plain text.
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

fn build_payload(style: ApiStyle, cfg: &ProviderConfig, instructions: &str, text: &str) -> Value {
    match style {
        ApiStyle::Anthropic => json!({
            "model": cfg.model,
            "max_tokens": cfg.max_tokens,
            "system": instructions,
            "messages": [{ "role": "user", "content": text }],
        }),
        ApiStyle::OpenAi => json!({
            "model": cfg.model,
            "max_tokens": cfg.max_tokens,
            "messages": [
                { "role": "system", "content": instructions },
                { "role": "user", "content": text },
            ],
        }),
        ApiStyle::Custom => json!({
            "model": cfg.model,
            "max_tokens": cfg.max_tokens,
            "system": instructions,
            "prompt": text,
        }),
    }
}

/// Pulls the model's reply text out of a provider-shaped response body.
fn extract_reply_text(style: ApiStyle, body: &Value) -> Result<String, ProviderError> {
    let reply = match style {
        ApiStyle::Anthropic => body
            .get("content")
            .and_then(Value::as_array)
            .map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|block| block.get("text").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("")
            }),
        ApiStyle::OpenAi => body
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string),
        ApiStyle::Custom => match body {
            Value::String(text) => Some(text.clone()),
            Value::Object(object) => ["text", "output", "response", "completion"]
                .iter()
                .find_map(|key| object.get(*key).and_then(Value::as_str))
                .map(str::to_string)
                // The endpoint may return the payload object itself.
                .or_else(|| Some(body.to_string())),
            _ => None,
        },
    };

    reply
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| {
            ProviderError::MalformedResponse(format!(
                "no reply text in {} response",
                style.as_str()
            ))
        })
}

#[async_trait]
impl SuggestionProvider for LlmClient {
    async fn complete(&self, text: &str) -> Result<Vec<String>, ProviderError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let object = self.request_json(SUGGEST_INSTRUCTIONS, text, "complete").await?;
        parse_suggestions(&object)
    }
}

#[async_trait]
impl EnhancementProvider for LlmClient {
    async fn enhance(&self, selection: &str, style: StyleMode) -> Result<String, ProviderError> {
        let object = self
            .request_json(enhance_instructions(style), selection, "enhance")
            .await?;
        parse_prompt(&object)
    }
}

#[async_trait]
impl AlternativesProvider for LlmClient {
    async fn alternatives(&self, prompt: &str) -> Result<Vec<TokenRecord>, ProviderError> {
        let object = self
            .request_json(ALTERNATIVES_INSTRUCTIONS, prompt, "alternatives")
            .await?;
        parse_token_records(&object)
    }
}
