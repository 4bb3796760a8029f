//! Language-model providers for the prompt editor.
//!
//! The session pipeline needs three collaborators: a
//! [`SuggestionProvider`] completing a partially typed idea, an
//! [`EnhancementProvider`] expanding the chosen idea into a full prompt and an
//! [`AlternativesProvider`] splitting that prompt into editable tokens.
//!
//! [`LlmClient`] implements all three against a remote HTTP endpoint
//! ([`ApiStyle`] picks the wire shape). Replies are free text expected to
//! carry one JSON object; [`extract_json_object`] strips code fences and
//! falls back to the first balanced `{...}`. Transient failures are retried
//! with exponential backoff ([`RetryConfig`]).
//!
//! [`OfflineProvider`] is a deterministic in-process implementation used when
//! no credential is available.
//!
//! # Error taxonomy
//!
//! | Variant | Raised when |
//! |---|---|
//! | [`ProviderError::Unreachable`] | transport failure or non-auth HTTP error |
//! | [`ProviderError::InvalidCredential`] | HTTP 401/403, or no key configured |
//! | [`ProviderError::MalformedResponse`] | no parseable JSON object / missing fields |
//! | [`ProviderError::EmptyResult`] | well-formed reply with nothing in it |
//!
//! # Example
//!
//! ```
//! use provider::{EnhancementProvider, OfflineProvider, StyleMode};
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let prompt = rt
//!     .block_on(OfflineProvider.enhance("a red fox", StyleMode::Structured))
//!     .unwrap();
//! assert!(prompt.starts_with("a red fox, highly detailed"));
//! ```

mod api;
mod config;
mod credential;
mod error;
pub mod json;
mod offline;
mod prompts;
pub mod retry;
mod serde_millis;
mod traits;
mod types;

pub use crate::api::LlmClient;
pub use crate::config::{ApiStyle, ProviderConfig};
pub use crate::credential::{validate_credential, CredentialPolicy, CredentialStore};
pub use crate::error::{CredentialError, ProviderError};
pub use crate::json::{extract_json_object, strip_code_fences};
pub use crate::offline::OfflineProvider;
pub use crate::prompts::template_prompt;
pub use crate::retry::{RetryConfig, RetryResult};
pub use crate::traits::{AlternativesProvider, EnhancementProvider, SuggestionProvider};
pub use crate::types::{StyleMode, TokenRecord, MAX_SUGGESTIONS};
