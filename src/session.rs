//! The select → enhance → tokenize → segment pipeline.

use std::sync::Arc;

use provider::{
    template_prompt, AlternativesProvider, EnhancementProvider, StyleMode, TokenRecord,
};
use segment::{
    FallbackConfig, FallbackExtractor, IdGenerator, PromptDocument, RandomIds, RoleClassifier,
    RoleTag, Token, TokenId,
};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::PipelineError;

/// Where the tokens of the current document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// The alternatives provider.
    Provider,
    /// Offline extraction after an empty or failed alternatives call.
    Fallback,
}

/// Editing session owning the current [`PromptDocument`].
///
/// Provider failures degrade rather than surface: a failed enhancement falls
/// back to [`template_prompt`], and an empty or failed alternatives call falls
/// back to the [`FallbackExtractor`]. Only a rejected credential escapes, as
/// [`PipelineError::Credential`], leaving the current document untouched.
pub struct Session {
    enhancer: Arc<dyn EnhancementProvider>,
    alternatives: Arc<dyn AlternativesProvider>,
    extractor: FallbackExtractor,
    ids: Box<dyn IdGenerator + Send + Sync>,
    document: Option<PromptDocument>,
    token_source: Option<TokenSource>,
}

impl Session {
    pub fn new(
        enhancer: Arc<dyn EnhancementProvider>,
        alternatives: Arc<dyn AlternativesProvider>,
    ) -> Self {
        Self {
            enhancer,
            alternatives,
            extractor: FallbackExtractor::default(),
            ids: Box::new(RandomIds),
            document: None,
            token_source: None,
        }
    }

    /// Session backed by one provider for both enhancement and alternatives.
    pub fn with_provider<P>(provider: Arc<P>) -> Self
    where
        P: EnhancementProvider + AlternativesProvider + 'static,
    {
        Self::new(provider.clone(), provider)
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + Send + Sync + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn with_fallback(mut self, extractor: FallbackExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Validates `config` and installs a fallback extractor built from it.
    pub fn with_fallback_config(
        self,
        config: FallbackConfig,
        classifier: RoleClassifier,
    ) -> Result<Self, PipelineError> {
        let extractor = FallbackExtractor::new(config, classifier)?;
        Ok(self.with_fallback(extractor))
    }

    pub fn document(&self) -> Option<&PromptDocument> {
        self.document.as_ref()
    }

    pub fn token_source(&self) -> Option<TokenSource> {
        self.token_source
    }

    /// Drops the current document.
    pub fn clear(&mut self) {
        self.document = None;
        self.token_source = None;
    }

    /// Builds a fresh document from the chosen suggestion, replacing the old one.
    pub async fn select(
        &mut self,
        selection: &str,
        style: StyleMode,
    ) -> Result<&PromptDocument, PipelineError> {
        let span = info_span!(
            "promptsmith.select",
            selection_len = selection.len(),
            style = style.as_str()
        );
        let (document, source) = self.build_document(selection, style).instrument(span).await?;
        self.token_source = Some(source);
        Ok(self.document.insert(document))
    }

    async fn build_document(
        &mut self,
        selection: &str,
        style: StyleMode,
    ) -> Result<(PromptDocument, TokenSource), PipelineError> {
        let (prompt, enhanced) = match self.enhancer.enhance(selection, style).await {
            Ok(prompt) => (prompt, true),
            Err(err) if err.is_credential() => return Err(PipelineError::Credential(err)),
            Err(err) => {
                warn!(error = %err, "enhance_failure");
                (template_prompt(selection, style), false)
            }
        };

        let records = if enhanced {
            self.fetch_records(&prompt).await?
        } else {
            Vec::new()
        };

        let (tokens, source) = if records.is_empty() {
            let tokens = self.extractor.extract(&prompt, &mut self.ids);
            (tokens, TokenSource::Fallback)
        } else {
            (self.tokens_from_records(records), TokenSource::Provider)
        };

        let document = PromptDocument::new(prompt, tokens);
        info!(
            enhanced,
            fallback = source == TokenSource::Fallback,
            token_count = document.tokens().len(),
            placed = document.placed_token_ids().len(),
            "document_built"
        );
        Ok((document, source))
    }

    /// Provider records for `prompt`; empty whenever the fallback should run.
    async fn fetch_records(&self, prompt: &str) -> Result<Vec<TokenRecord>, PipelineError> {
        match self.alternatives.alternatives(prompt).await {
            Ok(records) if records.is_empty() => {
                info!(prompt_len = prompt.len(), "alternatives_empty");
                Ok(records)
            }
            Ok(records) => Ok(records),
            Err(err) if err.is_credential() => Err(PipelineError::Credential(err)),
            Err(err) => {
                warn!(error = %err, "alternatives_failure");
                Ok(Vec::new())
            }
        }
    }

    fn tokens_from_records(&mut self, records: Vec<TokenRecord>) -> Vec<Token> {
        let classifier = self.extractor.classifier();
        records
            .into_iter()
            .map(|record| {
                let role = record
                    .category
                    .as_deref()
                    .and_then(RoleTag::from_category)
                    .unwrap_or_else(|| classifier.role_of(&record.text));
                Token::new(self.ids.next_id(), record.text, role, record.alternatives)
            })
            .collect()
    }

    /// Sets the text of token `id` in the current document. False when there
    /// is no document or no such token.
    pub fn replace_token(&mut self, id: &TokenId, new_text: impl Into<String>) -> bool {
        let replaced = segment::replace_token(self.document.as_mut(), id, new_text);
        if replaced {
            debug!(token_id = %id, "session_token_replaced");
        }
        replaced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use provider::{OfflineProvider, ProviderError};
    use segment::SequentialIds;

    struct Scripted {
        enhance: Result<String, ProviderError>,
        alternatives: Result<Vec<TokenRecord>, ProviderError>,
    }

    #[async_trait]
    impl EnhancementProvider for Scripted {
        async fn enhance(&self, _: &str, _: StyleMode) -> Result<String, ProviderError> {
            self.enhance.clone()
        }
    }

    #[async_trait]
    impl AlternativesProvider for Scripted {
        async fn alternatives(&self, _: &str) -> Result<Vec<TokenRecord>, ProviderError> {
            self.alternatives.clone()
        }
    }

    fn session(script: Scripted) -> Session {
        Session::with_provider(Arc::new(script)).with_id_generator(SequentialIds::new("t"))
    }

    #[tokio::test]
    async fn provider_tokens_are_used_when_present() {
        let mut session = session(Scripted {
            enhance: Ok("a red fox in fresh snow".into()),
            alternatives: Ok(vec![
                TokenRecord::new("red fox").with_category("subject").with_alternatives(["grey wolf"]),
                TokenRecord::new("fresh snow").with_alternatives(["autumn leaves"]),
            ]),
        });
        let doc = session.select("fox", StyleMode::Structured).await.unwrap();
        assert_eq!(doc.raw(), "a red fox in fresh snow");
        assert_eq!(doc.tokens()[0].id.as_str(), "t-1");
        assert_eq!(doc.tokens()[0].role, RoleTag::Subject);
        assert_eq!(doc.placed_token_ids().len(), 2);
        assert_eq!(session.token_source(), Some(TokenSource::Provider));
    }

    #[tokio::test]
    async fn unknown_category_falls_back_to_classifier() {
        let mut session = session(Scripted {
            enhance: Ok("soft golden hour light".into()),
            alternatives: Ok(vec![TokenRecord::new("golden hour").with_category("vibes")]),
        });
        let doc = session.select("x", StyleMode::Structured).await.unwrap();
        assert_eq!(doc.tokens()[0].role, RoleTag::Lighting);
    }

    #[tokio::test]
    async fn enhance_failure_uses_template_and_fallback() {
        let mut session = session(Scripted {
            enhance: Err(ProviderError::Unreachable("connection refused".into())),
            alternatives: Ok(vec![TokenRecord::new("never used")]),
        });
        let doc = session.select("a red fox", StyleMode::Structured).await.unwrap();
        assert_eq!(doc.raw(), template_prompt("a red fox", StyleMode::Structured));
        assert!(!doc.tokens().is_empty());
        assert!(doc.tokens().iter().all(|t| t.text != "never used"));
        assert_eq!(session.token_source(), Some(TokenSource::Fallback));
    }

    #[tokio::test]
    async fn credential_rejection_keeps_previous_document() {
        let mut ok = session(Scripted {
            enhance: Ok("a blue sky".into()),
            alternatives: Ok(vec![TokenRecord::new("blue sky")]),
        });
        ok.select("sky", StyleMode::Prose).await.unwrap();
        let before = ok.document().cloned();

        ok.enhancer = Arc::new(Scripted {
            enhance: Err(ProviderError::InvalidCredential("HTTP 401".into())),
            alternatives: Ok(Vec::new()),
        });
        let err = ok.select("sky", StyleMode::Prose).await.unwrap_err();
        assert!(matches!(err, PipelineError::Credential(_)));
        assert_eq!(ok.document().cloned(), before);
    }

    #[tokio::test]
    async fn offline_provider_always_yields_a_document() {
        let mut session = Session::with_provider(Arc::new(OfflineProvider))
            .with_id_generator(SequentialIds::default());
        let doc = session.select("", StyleMode::Prose).await.unwrap();
        assert!(doc.raw().contains("a scene"));
        assert!(!doc.tokens().is_empty());
    }

    #[tokio::test]
    async fn replace_without_document_is_noop() {
        let mut session = session(Scripted {
            enhance: Ok("x".into()),
            alternatives: Ok(Vec::new()),
        });
        assert!(!session.replace_token(&"t-1".into(), "y"));
    }

    #[test]
    fn invalid_fallback_config_is_a_config_error() {
        let result = Session::with_provider(Arc::new(OfflineProvider)).with_fallback_config(
            FallbackConfig::default().with_max_tokens(0),
            RoleClassifier::default(),
        );
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }
}
