//! Offline token extraction used when the alternatives provider returns nothing.
//!
//! Two passes over the raw prompt:
//!
//! 1. Every vocabulary term found as a case-insensitive substring, in table order.
//! 2. Every remaining whitespace-separated word that is long enough, not a
//!    stopword, and not already contained in a picked term.
//!
//! Both passes share one cap. The output depends only on the raw text and the
//! fixed tables (plus whatever ids the caller's generator hands out).

use tracing::debug;
use unicode_categories::UnicodeCategories;

use crate::config::FallbackConfig;
use crate::error::SegmentError;
use crate::ids::IdGenerator;
use crate::role::RoleClassifier;
use crate::token::Token;
use crate::vocabulary::{alternatives_for, STOPWORDS, VOCABULARY};

/// Deterministic substitute for the remote alternatives provider.
#[derive(Debug, Clone, Default)]
pub struct FallbackExtractor {
    config: FallbackConfig,
    classifier: RoleClassifier,
}

impl FallbackExtractor {
    pub fn new(config: FallbackConfig, classifier: RoleClassifier) -> Result<Self, SegmentError> {
        config.validate()?;
        Ok(Self { config, classifier })
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    pub fn classifier(&self) -> &RoleClassifier {
        &self.classifier
    }

    /// Builds tokens for `raw`, drawing one id per token from `ids`.
    pub fn extract(&self, raw: &str, ids: &mut dyn IdGenerator) -> Vec<Token> {
        let tokens: Vec<Token> = self
            .candidate_terms(raw)
            .into_iter()
            .map(|text| {
                let role = self.classifier.role_of(&text);
                let alternatives = alternatives_for(&text, role);
                Token::new(ids.next_id(), text, role, alternatives)
            })
            .collect();
        debug!(
            raw_len = raw.len(),
            token_count = tokens.len(),
            "fallback_extraction"
        );
        tokens
    }

    /// The texts [`extract`](Self::extract) would turn into tokens, in order.
    pub fn candidate_terms(&self, raw: &str) -> Vec<String> {
        let max = self.config.max_tokens;
        let lowered = raw.to_lowercase();
        let mut picked: Vec<String> = Vec::new();

        'vocabulary: for (_, terms) in VOCABULARY {
            for term in *terms {
                if picked.len() >= max {
                    break 'vocabulary;
                }
                if lowered.contains(term) && !picked.iter().any(|p| p == term) {
                    picked.push(term.to_string());
                }
            }
        }

        for word in raw.split_whitespace() {
            if picked.len() >= max {
                break;
            }
            let word = word.trim_matches(|c: char| c.is_punctuation());
            if word.chars().count() <= self.config.min_word_len {
                continue;
            }
            let lower = word.to_lowercase();
            if STOPWORDS.contains(&lower.as_str()) {
                continue;
            }
            if picked.iter().any(|p| p.to_lowercase().contains(&lower)) {
                continue;
            }
            picked.push(word.to_string());
        }

        picked
    }
}
