//! Recovery of a JSON object from free-form model output.
//!
//! Replies are expected to be a single JSON object, but models like to wrap it
//! in a code fence or surround it with prose. Recovery order:
//!
//! 1. strip a surrounding code fence (with or without a language tag),
//! 2. parse the remainder directly,
//! 3. parse the first balanced `{...}` substring that is valid JSON.

use serde_json::{Map, Value};

use crate::error::ProviderError;

/// Removes a surrounding ```` ``` ```` / ```` ```json ```` fence, if any.
pub fn strip_code_fences(text: &str) -> &str {
    let raw = text.trim();
    let Some(rest) = raw.strip_prefix("```") else {
        return raw;
    };
    // Drop the language tag line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parses the JSON object carried by `text`.
pub fn extract_json_object(text: &str) -> Result<Map<String, Value>, ProviderError> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(ProviderError::MalformedResponse("empty response body".into()));
    }

    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(body) {
        return Ok(object);
    }

    let mut from = 0;
    while let Some(offset) = body[from..].find('{') {
        let start = from + offset;
        if let Some(end) = balanced_object_end(body, start) {
            if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(&body[start..end]) {
                return Ok(object);
            }
        }
        from = start + 1;
    }

    Err(ProviderError::MalformedResponse(format!(
        "no JSON object found in response ({} bytes)",
        body.len()
    )))
}

/// Byte offset just past the `}` closing the object opened at `start`.
///
/// Braces inside string literals, including escaped quotes, are ignored.
fn balanced_object_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tagged_fence() {
        let text = "```json\n{\"prompt\": \"x\"}\n```";
        assert_eq!(strip_code_fences(text), "{\"prompt\": \"x\"}");
    }

    #[test]
    fn strips_bare_fence_and_whitespace() {
        assert_eq!(strip_code_fences("  ```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fences("{}"), "{}");
        assert_eq!(strip_code_fences("```json {\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn parses_plain_object() {
        let object = extract_json_object(r#"{"suggestions": ["a", "b"]}"#).unwrap();
        assert_eq!(object["suggestions"][1], "b");
    }

    #[test]
    fn parses_fenced_object() {
        let object = extract_json_object("```json\n{\"prompt\": \"a misty harbor\"}\n```").unwrap();
        assert_eq!(object["prompt"], "a misty harbor");
    }

    #[test]
    fn finds_object_inside_prose() {
        let text = "Sure! Here is the result:\n{\"prompt\": \"a {curly} harbor\"} Hope it helps.";
        let object = extract_json_object(text).unwrap();
        assert_eq!(object["prompt"], "a {curly} harbor");
    }

    #[test]
    fn string_braces_and_escapes_do_not_confuse_the_scan() {
        let text = r#"note: {"text": "a \"quoted\" } brace", "n": {"k": 1}} trailing }"#;
        let object = extract_json_object(text).unwrap();
        assert_eq!(object["text"], "a \"quoted\" } brace");
        assert_eq!(object["n"]["k"], 1);
    }

    #[test]
    fn skips_unparseable_candidates() {
        let text = "{not json} then {\"ok\": true}";
        let object = extract_json_object(text).unwrap();
        assert_eq!(object["ok"], true);
    }

    #[test]
    fn garbage_is_malformed() {
        for text in ["", "   ", "no braces here", "{\"open\": ", "[1, 2, 3]"] {
            assert!(
                matches!(extract_json_object(text), Err(ProviderError::MalformedResponse(_))),
                "{text:?}"
            );
        }
    }
}
