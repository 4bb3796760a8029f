//! Segmentation engine: maps token texts onto a raw prompt.
//!
//! Tokens are tried longest text first. Each token claims the first
//! case-insensitive, word-bounded occurrence of its text that does not
//! intersect a range claimed by an earlier token. Only that first occurrence
//! is placed; repeats of the same text stay inside literal segments.
//!
//! Two tokens with the same text (ignoring case and surrounding whitespace)
//! compete for the same span, so only the first one in input order is tried.

use std::cmp::Reverse;
use std::ops::Range;

use fxhash::FxHashSet;
use regex::{Regex, RegexBuilder};

use crate::claims::ClaimSet;
use crate::token::{Segment, Token, TokenId};

/// A token claimed the byte range `start..end` of the raw prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub start: usize,
    pub end: usize,
    pub token_id: TokenId,
}

impl Placement {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Partitions `raw` into literal spans and token references.
///
/// Returns an empty sequence for empty `raw` and a single literal when no
/// token text occurs in `raw`. Tokens whose text is blank or carries
/// surrounding whitespace are never placed.
pub fn segment(raw: &str, tokens: &[Token]) -> Vec<Segment> {
    if raw.is_empty() {
        return Vec::new();
    }
    segments_from_placements(raw, &place_tokens(raw, tokens))
}

/// Finds the placement of every token whose text occurs in `raw`, sorted by start.
pub fn place_tokens(raw: &str, tokens: &[Token]) -> Vec<Placement> {
    if raw.is_empty() || tokens.is_empty() {
        return Vec::new();
    }

    let mut claims = ClaimSet::default();
    let mut placements = Vec::with_capacity(tokens.len());

    for token in precedence_order(tokens) {
        let Some(pattern) = TokenPattern::new(&token.text) else {
            continue;
        };
        if let Some(range) = pattern.first_unclaimed(raw, &claims) {
            claims.claim(range.clone());
            placements.push(Placement {
                start: range.start,
                end: range.end,
                token_id: token.id.clone(),
            });
        }
    }

    placements.sort_by_key(|p| p.start);
    placements
}

/// Walks sorted placements and fills the gaps with literals.
pub(crate) fn segments_from_placements(raw: &str, placements: &[Placement]) -> Vec<Segment> {
    if raw.is_empty() {
        return Vec::new();
    }
    if placements.is_empty() {
        return vec![Segment::Literal(raw.to_string())];
    }

    let mut segments = Vec::with_capacity(placements.len() * 2 + 1);
    let mut cursor = 0;
    for placement in placements {
        if placement.start > cursor {
            segments.push(Segment::Literal(raw[cursor..placement.start].to_string()));
        }
        segments.push(Segment::TokenRef(placement.token_id.clone()));
        cursor = placement.end;
    }
    if cursor < raw.len() {
        segments.push(Segment::Literal(raw[cursor..].to_string()));
    }
    segments
}

/// Drops tokens with blank, padded or repeated text, then orders by text
/// length, longest first. The sort is stable, so equal lengths keep input order.
///
/// A padded text would resolve to more than the span it matched, so it is
/// skipped rather than trimmed.
fn precedence_order(tokens: &[Token]) -> Vec<&Token> {
    let mut seen = FxHashSet::default();
    let mut ordered: Vec<&Token> = tokens
        .iter()
        .filter(|token| {
            let text = token.text.as_str();
            !text.is_empty() && text == text.trim() && seen.insert(text.to_lowercase())
        })
        .collect();
    ordered.sort_by_key(|token| Reverse(token.text.chars().count()));
    ordered
}

/// Case-insensitive matcher for one token text.
///
/// A `\b` assertion is added on each side where the text starts or ends with a
/// word character, so `"cat"` never matches inside `"category"` while texts
/// such as `"f/1.8,"` still match next to punctuation.
struct TokenPattern(Regex);

impl TokenPattern {
    fn new(needle: &str) -> Option<Self> {
        let first = needle.chars().next()?;
        let last = needle.chars().next_back()?;
        let lead = if is_word_char(first) { r"\b" } else { "" };
        let trail = if is_word_char(last) { r"\b" } else { "" };
        let pattern = format!("{lead}{}{trail}", regex::escape(needle));
        RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .ok()
            .map(Self)
    }

    fn first_unclaimed(&self, raw: &str, claims: &ClaimSet) -> Option<Range<usize>> {
        let mut from = 0;
        while from < raw.len() {
            let found = self.0.find_at(raw, from)?;
            let range = found.range();
            if !claims.overlaps(&range) {
                return Some(range);
            }
            // Retry one character past the rejected start; a later
            // occurrence may begin inside the rejected match.
            let step = raw[found.start()..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            from = found.start() + step;
        }
        None
    }
}

/// Same character class as the regex engine's Unicode `\w`, marks included.
fn is_word_char(ch: char) -> bool {
    regex_syntax::is_word_character(ch)
}
