//! End-to-end flow: suggest, select, enhance, tokenize, edit.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use promptsmith::{
    rebuild_raw, session_from_config, template_prompt, AlternativesProvider, EnhancementProvider,
    OfflineProvider, PromptsmithConfig, ProviderError, RoleTag, Segment, SequentialIds, Session,
    StyleMode, SuggestConfig, SuggestionFeed, TokenRecord, TokenSource,
};

/// Provider that returns a fixed prompt and fixed token records.
struct StudioProvider;

const STUDIO_PROMPT: &str =
    "Portrait of an old fisherman, weathered face, golden hour light, shallow depth of field";

#[async_trait]
impl EnhancementProvider for StudioProvider {
    async fn enhance(&self, _: &str, _: StyleMode) -> Result<String, ProviderError> {
        Ok(STUDIO_PROMPT.to_string())
    }
}

#[async_trait]
impl AlternativesProvider for StudioProvider {
    async fn alternatives(&self, _: &str) -> Result<Vec<TokenRecord>, ProviderError> {
        Ok(vec![
            TokenRecord::new("old fisherman")
                .with_category("subject")
                .with_alternatives(["young sailor", "lighthouse keeper"]),
            TokenRecord::new("golden hour light")
                .with_category("lighting")
                .with_alternatives(["blue hour light", "harsh noon sun"]),
            TokenRecord::new("shallow depth of field").with_category("camera"),
            // Not present in the prompt: kept, but never placed.
            TokenRecord::new("oil painting").with_category("style"),
            // Overlaps a longer token: loses the claim.
            TokenRecord::new("golden hour").with_category("lighting"),
        ])
    }
}

fn concat(doc: &promptsmith::PromptDocument) -> String {
    doc.resolved().iter().map(|r| r.text).collect()
}

#[tokio::test]
async fn provider_tokens_become_editable_segments() {
    let mut session =
        Session::with_provider(Arc::new(StudioProvider)).with_id_generator(SequentialIds::new("t"));

    let doc = session.select("fisherman", StyleMode::Prose).await.unwrap();
    assert_eq!(doc.raw(), STUDIO_PROMPT);
    assert_eq!(doc.tokens().len(), 5);
    assert_eq!(concat(doc), STUDIO_PROMPT);

    let placed: Vec<&str> = doc
        .placed_token_ids()
        .into_iter()
        .filter_map(|id| doc.token(id))
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(
        placed,
        vec!["old fisherman", "golden hour light", "shallow depth of field"]
    );
    assert_eq!(doc.segments()[0], Segment::literal("Portrait of an "));

    let camera = doc.tokens().iter().find(|t| t.role == RoleTag::Camera).unwrap();
    assert_eq!(camera.text, "shallow depth of field");
    assert_eq!(session.token_source(), Some(TokenSource::Provider));
}

#[tokio::test]
async fn replacing_a_token_rewrites_only_its_span() {
    let mut session =
        Session::with_provider(Arc::new(StudioProvider)).with_id_generator(SequentialIds::new("t"));
    let doc = session.select("fisherman", StyleMode::Structured).await.unwrap();
    let segments_before = doc.segments().to_vec();
    let subject = doc.tokens()[0].id.clone();
    let alternative = doc.alternatives(&subject)[1].clone();

    assert!(session.replace_token(&subject, alternative));
    let doc = session.document().unwrap();
    assert_eq!(
        doc.raw(),
        "Portrait of an lighthouse keeper, weathered face, golden hour light, shallow depth of field"
    );
    assert_eq!(doc.segments(), segments_before.as_slice());
    assert_eq!(rebuild_raw(doc.segments(), &doc.token_index()), doc.raw());

    assert!(!session.replace_token(&"t-99".into(), "ghost"));
    assert_eq!(concat(session.document().unwrap()), session.document().unwrap().raw());
}

#[tokio::test]
async fn offline_flow_from_seed_to_edit() {
    let provider = Arc::new(OfflineProvider);
    let config = SuggestConfig::default().with_debounce_ms(10);
    let mut feed = SuggestionFeed::new(Arc::clone(&provider), config);
    let mut updates = feed.subscribe();

    feed.on_input("a red fox");
    tokio::time::timeout(Duration::from_secs(5), updates.changed())
        .await
        .unwrap()
        .unwrap();
    let snapshot = feed.snapshot();
    assert_eq!(
        snapshot.suggestions,
        vec![
            "a red fox at golden hour",
            "a red fox in a misty forest",
            "a red fox as an oil painting"
        ]
    );

    let mut session = session_from_config(&PromptsmithConfig::default(), provider).unwrap();
    let selection = snapshot.suggestions[1].clone();
    let doc = session.select(&selection, StyleMode::Structured).await.unwrap();
    assert_eq!(doc.raw(), template_prompt(&selection, StyleMode::Structured));
    assert_eq!(session.token_source(), Some(TokenSource::Fallback));

    let doc = session.document().unwrap();
    let misty = doc
        .tokens()
        .iter()
        .find(|t| t.text.eq_ignore_ascii_case("misty"))
        .map(|t| (t.id.clone(), t.alternatives.clone()))
        .unwrap();
    assert!(!misty.1.is_empty());
    assert!(session.replace_token(&misty.0, misty.1[0].clone()));

    let raw = session.document().unwrap().raw();
    assert!(raw.starts_with(&format!("a red fox in a {} forest", misty.1[0])));
}

#[tokio::test]
async fn yaml_configured_session_limits_fallback_tokens() {
    let yaml = r#"
version: "1.0"
fallback:
  max_tokens: 2
  min_word_len: 3
"#;
    let config = PromptsmithConfig::from_yaml(yaml).unwrap();
    let mut session = session_from_config(&config, Arc::new(OfflineProvider)).unwrap();
    let doc = session.select("castle ruins", StyleMode::Prose).await.unwrap();
    assert_eq!(doc.tokens().len(), 2);
}

#[tokio::test]
async fn new_selection_replaces_the_document() {
    let mut session = Session::with_provider(Arc::new(OfflineProvider))
        .with_id_generator(SequentialIds::default());
    session.select("a red fox", StyleMode::Structured).await.unwrap();
    let first_raw = session.document().unwrap().raw().to_string();

    session.select("a blue whale", StyleMode::Prose).await.unwrap();
    let doc = session.document().unwrap();
    assert_ne!(doc.raw(), first_raw);
    assert!(doc.raw().contains("a blue whale"));

    session.clear();
    assert!(session.document().is_none());
    assert!(session.token_source().is_none());
}

#[tokio::test]
async fn segments_serialize_for_presentation() {
    let mut session =
        Session::with_provider(Arc::new(StudioProvider)).with_id_generator(SequentialIds::new("t"));
    let doc = session.select("fisherman", StyleMode::Prose).await.unwrap();

    let json = serde_json::to_value(&doc.segments()[..2]).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{ "literal": "Portrait of an " }, { "token": "t-1" }])
    );
}
