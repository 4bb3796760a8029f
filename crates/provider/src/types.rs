//! Provider request options and lenient parsing of provider replies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProviderError;

/// Most suggestions a completion may return.
pub const MAX_SUGGESTIONS: usize = 3;

/// Output form requested from the enhancement provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleMode {
    /// Comma-separated keywords and modifiers.
    #[default]
    Structured,
    /// Flowing descriptive sentences.
    Prose,
}

impl StyleMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StyleMode::Structured => "structured",
            StyleMode::Prose => "prose",
        }
    }
}

/// A token as described by the alternatives provider, before it gets an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub text: String,
    /// Free-form category label; resolved to a role by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

impl TokenRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_alternatives<I, S>(mut self, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternatives = alternatives.into_iter().map(Into::into).collect();
        self
    }

    /// Reads one record, tolerating missing or mistyped fields.
    ///
    /// Returns `None` when there is no usable `text`. A string `alternatives`
    /// is split on commas; any other non-array value yields no alternatives.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let text = first_str(object, &["text", "token", "phrase"])?.trim();
        if text.is_empty() {
            return None;
        }

        let category = first_str(object, &["category", "role", "type"])
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        let alternatives = ["alternatives", "options", "replacements"]
            .iter()
            .find_map(|key| object.get(*key))
            .map(|value| coerce_alternatives(value, text))
            .unwrap_or_default();

        Some(Self {
            text: text.to_string(),
            category,
            alternatives,
        })
    }
}

fn first_str<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| object.get(*key).and_then(Value::as_str))
}

fn coerce_alternatives(value: &Value, text: &str) -> Vec<String> {
    let raw: Vec<&str> = match value {
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        Value::String(joined) => joined.split(',').collect(),
        _ => Vec::new(),
    };
    clean_list(raw, Some(text), usize::MAX)
}

/// Trims, drops blanks, repeats and `exclude` (all case-insensitive), keeps at most `max`.
fn clean_list<'a>(
    items: impl IntoIterator<Item = &'a str>,
    exclude: Option<&str>,
    max: usize,
) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for item in items {
        if cleaned.len() >= max {
            break;
        }
        let item = item.trim();
        if item.is_empty()
            || exclude.is_some_and(|ex| ex.trim().eq_ignore_ascii_case(item))
            || cleaned.iter().any(|c| c.eq_ignore_ascii_case(item))
        {
            continue;
        }
        cleaned.push(item.to_string());
    }
    cleaned
}

/// `{"suggestions": [...]}` → up to [`MAX_SUGGESTIONS`] distinct, non-blank strings.
pub fn parse_suggestions(object: &Map<String, Value>) -> Result<Vec<String>, ProviderError> {
    let items = match object.get("suggestions") {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect::<Vec<_>>(),
        Some(_) => {
            return Err(ProviderError::MalformedResponse(
                "'suggestions' is not an array".into(),
            ))
        }
        None => {
            return Err(ProviderError::MalformedResponse(
                "missing 'suggestions' field".into(),
            ))
        }
    };
    let suggestions = clean_list(items, None, MAX_SUGGESTIONS);
    if suggestions.is_empty() {
        return Err(ProviderError::EmptyResult("suggestions"));
    }
    Ok(suggestions)
}

/// `{"prompt": "..."}` → the trimmed prompt.
pub fn parse_prompt(object: &Map<String, Value>) -> Result<String, ProviderError> {
    let prompt = object
        .get("prompt")
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderError::MalformedResponse("missing 'prompt' string".into()))?
        .trim();
    if prompt.is_empty() {
        return Err(ProviderError::EmptyResult("enhancement"));
    }
    Ok(prompt.to_string())
}

/// `{"tokens": [...]}` → every usable record. An empty list is not an error.
pub fn parse_token_records(object: &Map<String, Value>) -> Result<Vec<TokenRecord>, ProviderError> {
    match object.get("tokens") {
        Some(Value::Array(items)) => Ok(items.iter().filter_map(TokenRecord::from_value).collect()),
        Some(Value::Null) => Ok(Vec::new()),
        Some(_) => Err(ProviderError::MalformedResponse(
            "'tokens' is not an array".into(),
        )),
        None => Err(ProviderError::MalformedResponse(
            "missing 'tokens' field".into(),
        )),
    }
}
