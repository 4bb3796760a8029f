use std::io;
use thiserror::Error;

use crate::retry::is_retryable_error;

/// Failures reported by a suggestion, enhancement or alternatives provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Network failure or a non-success HTTP status other than 401/403.
    #[error("provider unreachable: {0}")]
    Unreachable(String),
    /// The remote endpoint rejected the credential, or none is configured.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
    /// The body was not parseable JSON or lacked the expected fields.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// Well-formed reply carrying nothing usable.
    #[error("empty result from {0}")]
    EmptyResult(&'static str),
    #[error("invalid provider config: {0}")]
    InvalidConfig(String),
}

impl ProviderError {
    /// Transport-level failure from the HTTP client.
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Unreachable(format!("request timeout: {err}"))
        } else if err.is_connect() {
            ProviderError::Unreachable(format!("connection failed: {err}"))
        } else {
            ProviderError::Unreachable(format!("request failed: {err}"))
        }
    }

    /// Maps a non-success HTTP status to the error taxonomy.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let body = body.trim();
        match status.as_u16() {
            401 | 403 => ProviderError::InvalidCredential(format!("HTTP {status}: {body}")),
            _ => ProviderError::Unreachable(format!("HTTP {status}: {body}")),
        }
    }

    /// Only transient unreachable errors are retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Unreachable(message) => is_retryable_error(message),
            _ => false,
        }
    }

    pub fn is_credential(&self) -> bool {
        matches!(self, ProviderError::InvalidCredential(_))
    }
}

/// Reasons a credential string is refused.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential is empty")]
    Empty,
    #[error("credential must start with '{0}'")]
    MissingPrefix(String),
    #[error("credential too short: {actual} chars, need at least {min}")]
    TooShort { min: usize, actual: usize },
    #[error("credential storage unavailable: no config directory")]
    NoConfigDir,
    #[error("credential io error: {0}")]
    Io(#[from] io::Error),
}
