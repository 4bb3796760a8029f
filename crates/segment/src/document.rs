use fxhash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::{place_tokens, segments_from_placements};
use crate::token::{Segment, Token, TokenId};

/// Derived id → token lookup. Rebuilt from the token list whenever needed.
pub type TokenIndex<'a> = FxHashMap<&'a TokenId, &'a Token>;

/// The editable prompt: raw text, its tokens and the segments tying them together.
///
/// Segments are computed once, when the document is built from a fresh raw
/// prompt. Editing a token afterwards only changes that token's text and
/// rebuilds `raw` from the unchanged segments.
///
/// A deserialized document never trusts the stored `raw`: it is rebuilt from
/// the stored segments and tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredDocument")]
pub struct PromptDocument {
    raw: String,
    tokens: Vec<Token>,
    segments: Vec<Segment>,
}

#[derive(Deserialize)]
struct StoredDocument {
    #[serde(default)]
    raw: Option<String>,
    tokens: Vec<Token>,
    segments: Vec<Segment>,
}

impl From<StoredDocument> for PromptDocument {
    fn from(stored: StoredDocument) -> Self {
        let raw = rebuild_raw(&stored.segments, &index_tokens(&stored.tokens));
        if stored.raw.as_deref().is_some_and(|stored_raw| stored_raw != raw) {
            warn!(raw_len = raw.len(), "stored_raw_mismatch");
        }
        Self {
            raw,
            tokens: stored.tokens,
            segments: stored.segments,
        }
    }
}

/// A segment paired with the text it currently renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSegment<'a> {
    pub segment: &'a Segment,
    pub text: &'a str,
    /// The referenced token, `None` for literals.
    pub token: Option<&'a Token>,
}

impl PromptDocument {
    /// Segments `raw` against `tokens` and takes ownership of both.
    ///
    /// Tokens with a duplicate id are dropped (first wins) and token texts are
    /// trimmed. Each placed token's text is set to the exact span it matched,
    /// so casing differences between the token list and the prompt cannot
    /// break reconstruction.
    pub fn new(raw: impl Into<String>, tokens: Vec<Token>) -> Self {
        let raw = raw.into();
        let mut seen = FxHashSet::default();
        let mut tokens: Vec<Token> = tokens
            .into_iter()
            .filter(|token| seen.insert(token.id.clone()))
            .map(|mut token| {
                if token.text.trim().len() != token.text.len() {
                    token.text = token.text.trim().to_string();
                }
                token
            })
            .collect();

        let placements = place_tokens(&raw, &tokens);
        for placement in &placements {
            if let Some(token) = tokens.iter_mut().find(|t| t.id == placement.token_id) {
                token.text = raw[placement.range()].to_string();
            }
        }
        let segments = segments_from_placements(&raw, &placements);

        debug!(
            raw_len = raw.len(),
            token_count = tokens.len(),
            placed = placements.len(),
            segment_count = segments.len(),
            "document_segmented"
        );

        Self {
            raw,
            tokens,
            segments,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn token(&self, id: &TokenId) -> Option<&Token> {
        self.tokens.iter().find(|t| &t.id == id)
    }

    /// Alternatives offered for `id`; empty for unknown ids.
    pub fn alternatives(&self, id: &TokenId) -> &[String] {
        self.token(id)
            .map(|t| t.alternatives.as_slice())
            .unwrap_or_default()
    }

    pub fn token_index(&self) -> TokenIndex<'_> {
        index_tokens(&self.tokens)
    }

    /// Ids referenced by a segment, in prompt order.
    pub fn placed_token_ids(&self) -> Vec<&TokenId> {
        self.segments.iter().filter_map(Segment::token_id).collect()
    }

    /// Segments with their display text resolved, in prompt order.
    pub fn resolved(&self) -> Vec<ResolvedSegment<'_>> {
        let index = self.token_index();
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(value) => ResolvedSegment {
                    segment,
                    text: value.as_str(),
                    token: None,
                },
                Segment::TokenRef(id) => {
                    let token = index.get(id).copied();
                    ResolvedSegment {
                        segment,
                        text: token.map_or("", |t| t.text.as_str()),
                        token,
                    }
                }
            })
            .collect()
    }

    /// Sets the text of token `id` and rebuilds `raw` from the existing segments.
    ///
    /// Returns false, leaving the document untouched, when `id` is unknown.
    pub fn replace_token(&mut self, id: &TokenId, new_text: impl Into<String>) -> bool {
        let Some(token) = self.tokens.iter_mut().find(|t| &t.id == id) else {
            debug!(token_id = %id, "replace_unknown_token");
            return false;
        };
        token.text = new_text.into();

        self.raw = rebuild_raw(&self.segments, &index_tokens(&self.tokens));
        debug!(token_id = %id, raw_len = self.raw.len(), "token_replaced");
        true
    }
}

/// [`PromptDocument::replace_token`] for a document that may not exist yet.
pub fn replace_token(
    doc: Option<&mut PromptDocument>,
    id: &TokenId,
    new_text: impl Into<String>,
) -> bool {
    match doc {
        Some(doc) => doc.replace_token(id, new_text),
        None => false,
    }
}

/// Concatenates literal values and the indexed text of referenced tokens.
pub fn rebuild_raw(segments: &[Segment], index: &TokenIndex<'_>) -> String {
    let mut raw = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(value) => raw.push_str(value),
            Segment::TokenRef(id) => match index.get(id) {
                Some(token) => raw.push_str(&token.text),
                None => warn!(token_id = %id, "segment_references_missing_token"),
            },
        }
    }
    raw
}

fn index_tokens(tokens: &[Token]) -> TokenIndex<'_> {
    tokens.iter().map(|t| (&t.id, t)).collect()
}
