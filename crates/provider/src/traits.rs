//! The three external collaborators the session pipeline talks to.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{StyleMode, TokenRecord};

/// Short completions for a partially typed idea.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// At most [`MAX_SUGGESTIONS`](crate::MAX_SUGGESTIONS) distinct, non-blank strings.
    async fn complete(&self, text: &str) -> Result<Vec<String>, ProviderError>;
}

/// Expands a chosen suggestion into a full prompt.
#[async_trait]
pub trait EnhancementProvider: Send + Sync {
    async fn enhance(&self, selection: &str, style: StyleMode) -> Result<String, ProviderError>;
}

/// Splits a prompt into editable token records.
///
/// An empty list is a valid answer and sends the caller to fallback extraction.
#[async_trait]
pub trait AlternativesProvider: Send + Sync {
    async fn alternatives(&self, prompt: &str) -> Result<Vec<TokenRecord>, ProviderError>;
}

#[async_trait]
impl<P: SuggestionProvider + ?Sized> SuggestionProvider for Arc<P> {
    async fn complete(&self, text: &str) -> Result<Vec<String>, ProviderError> {
        (**self).complete(text).await
    }
}

#[async_trait]
impl<P: EnhancementProvider + ?Sized> EnhancementProvider for Arc<P> {
    async fn enhance(&self, selection: &str, style: StyleMode) -> Result<String, ProviderError> {
        (**self).enhance(selection, style).await
    }
}

#[async_trait]
impl<P: AlternativesProvider + ?Sized> AlternativesProvider for Arc<P> {
    async fn alternatives(&self, prompt: &str) -> Result<Vec<TokenRecord>, ProviderError> {
        (**self).alternatives(prompt).await
    }
}
