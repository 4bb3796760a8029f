use std::fmt;

use serde::{Deserialize, Serialize};

use crate::role::RoleTag;

/// Opaque identifier of a [`Token`].
///
/// Ids are handed out by an [`IdGenerator`](crate::IdGenerator) exactly once and
/// are never reused for another token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TokenId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TokenId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TokenId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// An editable word or phrase of a prompt with its replacement candidates.
///
/// Identity is the `id`. The `text` changes when the user swaps in an
/// alternative; `role` and `alternatives` stay as they were created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub text: String,
    pub role: RoleTag,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

impl Token {
    pub fn new(
        id: impl Into<TokenId>,
        text: impl Into<String>,
        role: RoleTag,
        alternatives: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            role,
            alternatives,
        }
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        self.text.as_str()
    }
}

/// One element of the ordered partition of a prompt.
///
/// Concatenating literal values and the current text of referenced tokens
/// yields the prompt the segments were derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    /// Non-editable span, copied verbatim from the raw prompt.
    Literal(String),
    /// Reference to a token of the owning document.
    #[serde(rename = "token")]
    TokenRef(TokenId),
}

impl Segment {
    pub fn literal(value: impl Into<String>) -> Self {
        Segment::Literal(value.into())
    }

    pub fn token_ref(id: impl Into<TokenId>) -> Self {
        Segment::TokenRef(id.into())
    }

    pub fn token_id(&self) -> Option<&TokenId> {
        match self {
            Segment::TokenRef(id) => Some(id),
            Segment::Literal(_) => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Segment::Literal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_serializes_externally_tagged() {
        let segments = vec![Segment::literal("a "), Segment::token_ref("t1")];
        let json = serde_json::to_string(&segments).unwrap();
        assert_eq!(json, r#"[{"literal":"a "},{"token":"t1"}]"#);

        let back: Vec<Segment> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, segments);
    }

    #[test]
    fn token_missing_alternatives_defaults_to_empty() {
        let token: Token =
            serde_json::from_str(r#"{"id":"t9","text":"azure","role":"color"}"#).unwrap();
        assert_eq!(token.id.as_str(), "t9");
        assert_eq!(token.role, RoleTag::Color);
        assert!(token.alternatives.is_empty());
    }

    #[test]
    fn segment_token_id_accessor() {
        assert_eq!(
            Segment::token_ref("t2").token_id(),
            Some(&TokenId::from("t2"))
        );
        assert!(Segment::literal("x").token_id().is_none());
        assert!(Segment::literal("x").is_literal());
    }
}
