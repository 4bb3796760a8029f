//! Workspace umbrella crate for promptsmith.
//!
//! This crate stitches the segmentation engine and the language-model
//! providers into the editing flow of an image-prompt editor:
//!
//! 1. the user types a seed phrase and a [`SuggestionFeed`] shows short
//!    completions (debounced, stale responses discarded);
//! 2. [`Session::select`] enhances the chosen completion into a full prompt,
//!    asks for editable tokens (or extracts them offline) and builds a
//!    [`PromptDocument`];
//! 3. [`Session::replace_token`] swaps a token's text while the rest of the
//!    prompt stays byte-for-byte intact.
//!
//! ```
//! use std::sync::Arc;
//! use promptsmith::{OfflineProvider, SequentialIds, Session, StyleMode};
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! rt.block_on(async {
//!     let mut session = Session::with_provider(Arc::new(OfflineProvider))
//!         .with_id_generator(SequentialIds::default());
//!     let doc = session.select("a red fox", StyleMode::Structured).await.unwrap();
//!     assert!(doc.raw().starts_with("a red fox, highly detailed"));
//! });
//! ```

pub use provider::{
    template_prompt, validate_credential, AlternativesProvider, ApiStyle, CredentialError,
    CredentialPolicy, CredentialStore, EnhancementProvider, LlmClient, OfflineProvider,
    ProviderConfig, ProviderError, RetryConfig, StyleMode, SuggestionProvider, TokenRecord,
    MAX_SUGGESTIONS,
};
pub use segment::{
    place_tokens, rebuild_raw, replace_token, segment, FallbackConfig, FallbackExtractor,
    IdGenerator, Placement, PromptDocument, RandomIds, ResolvedSegment, RoleClassifier, RoleRule,
    RoleTag, Segment, SegmentError, SequentialIds, Token, TokenId, TokenIndex,
};

mod config;
mod session;
mod suggest;

pub use crate::config::{
    ConfigLoadError, CredentialConfig, PromptsmithConfig, SuggestConfig, ENV_API_KEY, ENV_API_URL,
    ENV_MODEL,
};
pub use crate::session::{Session, TokenSource};
pub use crate::suggest::{RequestSequencer, RequestTicket, SuggestionFeed, SuggestionSnapshot};

use std::error::Error;
use std::fmt;

/// Failures that escape the session pipeline. Everything else degrades to a
/// fallback result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The provider rejected the credential; the user has to fix it.
    Credential(ProviderError),
    Config(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Credential(err) => {
                write!(f, "the API credential was rejected, check or replace it: {err}")
            }
            PipelineError::Config(msg) => write!(f, "invalid session configuration: {msg}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Credential(err) => Some(err),
            PipelineError::Config(_) => None,
        }
    }
}

impl From<SegmentError> for PipelineError {
    fn from(value: SegmentError) -> Self {
        PipelineError::Config(value.to_string())
    }
}

impl From<ConfigLoadError> for PipelineError {
    fn from(value: ConfigLoadError) -> Self {
        PipelineError::Config(value.to_string())
    }
}

/// Session configured from `config`, backed by `provider`.
pub fn session_from_config<P>(
    config: &PromptsmithConfig,
    provider: std::sync::Arc<P>,
) -> Result<Session, PipelineError>
where
    P: EnhancementProvider + AlternativesProvider + 'static,
{
    Session::with_provider(provider).with_fallback_config(config.fallback, RoleClassifier::default())
}
