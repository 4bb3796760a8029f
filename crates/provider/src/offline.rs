//! In-process provider with no network access.

use async_trait::async_trait;
use tracing::debug;

use crate::error::ProviderError;
use crate::prompts::template_prompt;
use crate::traits::{AlternativesProvider, EnhancementProvider, SuggestionProvider};
use crate::types::{StyleMode, TokenRecord, MAX_SUGGESTIONS};

const SUGGESTION_SUFFIXES: &[&str] = &[
    "at golden hour",
    "in a misty forest",
    "as an oil painting",
    "in cinematic lighting",
    "with a surreal twist",
];

/// Deterministic stand-in for a remote model.
///
/// Suggestions append fixed scene modifiers to the seed, enhancement returns
/// the template prompt and alternatives are always empty, which routes token
/// extraction through the offline fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

impl OfflineProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SuggestionProvider for OfflineProvider {
    async fn complete(&self, text: &str) -> Result<Vec<String>, ProviderError> {
        let seed = text.trim();
        if seed.is_empty() {
            return Ok(Vec::new());
        }
        let lowered = seed.to_lowercase();
        let suggestions: Vec<String> = SUGGESTION_SUFFIXES
            .iter()
            .filter(|suffix| !lowered.contains(*suffix))
            .take(MAX_SUGGESTIONS)
            .map(|suffix| format!("{seed} {suffix}"))
            .collect();
        debug!(count = suggestions.len(), "offline_suggestions");
        Ok(suggestions)
    }
}

#[async_trait]
impl EnhancementProvider for OfflineProvider {
    async fn enhance(&self, selection: &str, style: StyleMode) -> Result<String, ProviderError> {
        Ok(template_prompt(selection, style))
    }
}

#[async_trait]
impl AlternativesProvider for OfflineProvider {
    async fn alternatives(&self, _prompt: &str) -> Result<Vec<TokenRecord>, ProviderError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn suggestions_extend_the_seed() {
        let got = OfflineProvider.complete("  a red fox ").await.unwrap();
        assert_eq!(
            got,
            vec![
                "a red fox at golden hour",
                "a red fox in a misty forest",
                "a red fox as an oil painting",
            ]
        );
    }

    #[tokio::test]
    async fn suffixes_already_present_are_skipped() {
        let got = OfflineProvider.complete("a fox AT GOLDEN HOUR").await.unwrap();
        assert_eq!(got.len(), MAX_SUGGESTIONS);
        assert!(got.iter().all(|s| !s.ends_with("at golden hour")));
    }

    #[tokio::test]
    async fn blank_seed_has_no_suggestions() {
        assert!(OfflineProvider.complete("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn enhancement_is_the_template() {
        let prompt = OfflineProvider
            .enhance("a red fox", StyleMode::Prose)
            .await
            .unwrap();
        assert_eq!(prompt, template_prompt("a red fox", StyleMode::Prose));
    }

    #[tokio::test]
    async fn alternatives_are_empty() {
        assert!(OfflineProvider.alternatives("anything").await.unwrap().is_empty());
    }
}
