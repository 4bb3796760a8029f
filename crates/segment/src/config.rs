//! Configuration for the fallback token extractor.
//!
//! # Examples
//!
//! ```rust
//! use segment::FallbackConfig;
//!
//! let config = FallbackConfig::default();
//! assert_eq!(config.min_word_len, 3);
//! assert_eq!(config.max_tokens, 12);
//!
//! let wide = FallbackConfig::default().with_max_tokens(20);
//! assert!(wide.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SegmentError;

/// Limits applied by [`FallbackExtractor`](crate::FallbackExtractor).
///
/// # Serialization
///
/// ```json
/// {
///   "min_word_len": 3,
///   "max_tokens": 12
/// }
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FallbackConfig {
    /// Words whose character count is at or below this length are never
    /// promoted to tokens on their own.
    #[serde(default = "default_min_word_len")]
    pub min_word_len: usize,

    /// Upper bound on the number of tokens produced, vocabulary hits and
    /// single words combined. Vocabulary hits are collected first and never
    /// evicted.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl FallbackConfig {
    pub fn with_min_word_len(mut self, len: usize) -> Self {
        self.min_word_len = len;
        self
    }

    pub fn with_max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn validate(&self) -> Result<(), SegmentError> {
        if self.max_tokens == 0 {
            return Err(SegmentError::InvalidConfig(
                "max_tokens must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            min_word_len: default_min_word_len(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_min_word_len() -> usize {
    3
}

fn default_max_tokens() -> usize {
    12
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_max_tokens_is_rejected() {
        let cfg = FallbackConfig::default().with_max_tokens(0);
        assert_eq!(
            cfg.validate(),
            Err(SegmentError::InvalidConfig("max_tokens must be >= 1".into()))
        );
    }

    #[test]
    fn missing_fields_use_defaults() {
        let cfg: FallbackConfig = serde_json::from_str(r#"{"max_tokens": 4}"#).unwrap();
        assert_eq!(cfg.max_tokens, 4);
        assert_eq!(cfg.min_word_len, 3);
    }
}
