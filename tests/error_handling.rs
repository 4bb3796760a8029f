//! Error handling tests: what degrades silently and what reaches the user.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use promptsmith::{
    template_prompt, validate_credential, AlternativesProvider, ConfigLoadError, CredentialConfig,
    CredentialError, CredentialPolicy, EnhancementProvider, FallbackConfig, PipelineError,
    PromptsmithConfig, ProviderError, Session, StyleMode, TokenRecord, TokenSource,
};

/// Enhances successfully; the alternatives call fails with the given error.
struct FlakyAlternatives {
    error: ProviderError,
    calls: AtomicUsize,
}

#[async_trait]
impl EnhancementProvider for FlakyAlternatives {
    async fn enhance(&self, selection: &str, _: StyleMode) -> Result<String, ProviderError> {
        Ok(format!("{selection}, oil painting, dramatic lighting"))
    }
}

#[async_trait]
impl AlternativesProvider for FlakyAlternatives {
    async fn alternatives(&self, _: &str) -> Result<Vec<TokenRecord>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

fn flaky(error: ProviderError) -> Arc<FlakyAlternatives> {
    Arc::new(FlakyAlternatives {
        error,
        calls: AtomicUsize::new(0),
    })
}

#[tokio::test]
async fn malformed_alternatives_fall_back_to_extraction() {
    let provider = flaky(ProviderError::MalformedResponse("missing tokens".into()));
    let mut session = Session::with_provider(Arc::clone(&provider));

    let doc = session.select("a lighthouse", StyleMode::Structured).await.unwrap();
    assert_eq!(doc.raw(), "a lighthouse, oil painting, dramatic lighting");
    let texts: Vec<&str> = doc.tokens().iter().map(|t| t.text.as_str()).collect();
    assert!(texts.contains(&"oil painting"));
    assert!(texts.contains(&"dramatic lighting"));
    assert_eq!(session.token_source(), Some(TokenSource::Fallback));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreachable_alternatives_fall_back_to_extraction() {
    let provider = flaky(ProviderError::Unreachable("connection refused".into()));
    let mut session = Session::with_provider(provider);
    let doc = session.select("a lighthouse", StyleMode::Prose).await.unwrap();
    assert!(!doc.tokens().is_empty());
}

#[tokio::test]
async fn rejected_credential_on_alternatives_surfaces() {
    let provider = flaky(ProviderError::InvalidCredential("HTTP 403: forbidden".into()));
    let mut session = Session::with_provider(provider);

    let err = session.select("a lighthouse", StyleMode::Prose).await.unwrap_err();
    match &err {
        PipelineError::Credential(inner) => assert!(inner.is_credential()),
        other => panic!("unexpected error: {other}"),
    }
    assert!(session.document().is_none());
}

/// Every call fails the same way.
struct Down(ProviderError);

#[async_trait]
impl EnhancementProvider for Down {
    async fn enhance(&self, _: &str, _: StyleMode) -> Result<String, ProviderError> {
        Err(self.0.clone())
    }
}

#[async_trait]
impl AlternativesProvider for Down {
    async fn alternatives(&self, _: &str) -> Result<Vec<TokenRecord>, ProviderError> {
        Err(self.0.clone())
    }
}

#[tokio::test]
async fn provider_outage_still_yields_a_document() {
    let errors = [
        ProviderError::Unreachable("HTTP 503: overloaded".into()),
        ProviderError::MalformedResponse("not json".into()),
        ProviderError::EmptyResult("enhancement"),
    ];
    for error in errors {
        let mut session = Session::with_provider(Arc::new(Down(error)));
        let doc = session.select("  ", StyleMode::Prose).await.unwrap();
        assert_eq!(doc.raw(), template_prompt("", StyleMode::Prose));
        assert!(!doc.tokens().is_empty());
    }
}

#[tokio::test]
async fn rejected_credential_on_enhance_surfaces() {
    let mut session = Session::with_provider(Arc::new(Down(ProviderError::InvalidCredential(
        "HTTP 401: invalid x-api-key".into(),
    ))));
    let err = session.select("fox", StyleMode::Structured).await.unwrap_err();
    assert!(err.to_string().contains("401"));
}

#[test]
fn credential_format_is_checked_before_use() {
    let policy = CredentialPolicy::default();
    assert!(matches!(validate_credential("", &policy), Err(CredentialError::Empty)));
    assert!(matches!(
        validate_credential("pk-0123456789abcdefghij", &policy),
        Err(CredentialError::MissingPrefix(_))
    ));
    assert!(matches!(
        validate_credential("sk-short", &policy),
        Err(CredentialError::TooShort { .. })
    ));
    assert_eq!(
        validate_credential("  sk-0123456789abcdefghij \n", &policy).unwrap(),
        "sk-0123456789abcdefghij"
    );
}

#[test]
fn credential_store_round_trip_in_configured_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = CredentialConfig {
        path: Some(dir.path().join("nested").join("credential")),
        ..Default::default()
    };
    let store = config.store().unwrap();

    assert!(store.load().is_none());
    assert!(store.save("not-a-key").is_err());
    assert!(store.load().is_none());

    store.save("sk-0123456789abcdefghij").unwrap();
    assert_eq!(store.load().as_deref(), Some("sk-0123456789abcdefghij"));

    store.clear().unwrap();
    assert!(store.load().is_none());
    store.clear().unwrap();
}

#[test]
fn config_validation_errors() {
    let bad_version = PromptsmithConfig::from_yaml("version: \"9\"\n");
    assert!(matches!(bad_version, Err(ConfigLoadError::UnsupportedVersion(v)) if v == "9"));

    let bad_fallback = PromptsmithConfig::from_yaml("version: \"1.0\"\nfallback:\n  max_tokens: 0\n");
    assert!(matches!(bad_fallback, Err(ConfigLoadError::Validation(msg)) if msg.starts_with("fallback")));

    let bad_url =
        PromptsmithConfig::from_yaml("version: \"1.0\"\nprovider:\n  api_url: \"ftp://example\"\n");
    assert!(matches!(bad_url, Err(ConfigLoadError::Validation(msg)) if msg.starts_with("provider")));

    let missing = PromptsmithConfig::from_file("/definitely/not/here.yaml");
    assert!(matches!(missing, Err(ConfigLoadError::FileRead(_))));
}

#[test]
fn invalid_fallback_config_rejected_by_session() {
    let result = Session::with_provider(Arc::new(Down(ProviderError::EmptyResult("x"))))
        .with_fallback_config(FallbackConfig::default().with_max_tokens(0), Default::default());
    assert!(matches!(result, Err(PipelineError::Config(_))));
}
