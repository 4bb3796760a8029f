//! promptsmith - turn a few seed words into an editable image prompt.
//!
//! Runs one pass of the editor flow: live suggestions for the seed, selection
//! of one suggestion, enhancement into a full prompt, then a token listing with
//! alternatives. Without a credential everything runs offline.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use promptsmith::{
    session_from_config, AlternativesProvider, CredentialPolicy, CredentialStore,
    EnhancementProvider, LlmClient, OfflineProvider, PromptsmithConfig, StyleMode, SuggestionFeed,
    SuggestionProvider,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "promptsmith", version, about = "Build an editable image prompt from a few words")]
struct Args {
    /// Seed words typed into the prompt box
    #[arg(value_name = "WORDS", required = true)]
    words: Vec<String>,

    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output form of the enhanced prompt (overrides the config)
    #[arg(long, value_enum)]
    style: Option<StyleArg>,

    /// Which suggestion to select, 0-based; the seed itself when out of range
    #[arg(long, default_value_t = 0)]
    pick: usize,

    /// Validate and store this API key before running
    #[arg(long, value_name = "KEY", conflicts_with = "clear_key")]
    save_key: Option<String>,

    /// Remove the stored API key before running
    #[arg(long)]
    clear_key: bool,

    /// Never contact the remote provider
    #[arg(long)]
    offline: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StyleArg {
    Structured,
    Prose,
}

impl From<StyleArg> for StyleMode {
    fn from(value: StyleArg) -> Self {
        match value {
            StyleArg::Structured => StyleMode::Structured,
            StyleArg::Prose => StyleMode::Prose,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => PromptsmithConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            let mut config = PromptsmithConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            config
        }
    };
    if let Some(style) = args.style {
        config.style_mode = style.into();
    }

    let store = config.credential.store()?;
    let stored = update_credential(&store, &args)?;
    if config.provider.api_key().is_none() {
        config.provider.api_key = stored;
    }

    let seed = args.words.join(" ");
    let remote = !args.offline
        && (config.provider.api_key().is_some() || !config.provider.api_style.requires_key());

    if remote {
        let client = LlmClient::new(config.provider.clone())?;
        run(&config, Arc::new(client), &seed, args.pick).await
    } else {
        info!("running offline");
        run(&config, Arc::new(OfflineProvider), &seed, args.pick).await
    }
}

/// Applies `--save-key` / `--clear-key` to `store` and returns the key it now holds.
fn update_credential(store: &CredentialStore, args: &Args) -> anyhow::Result<Option<String>> {
    if let Some(key) = &args.save_key {
        store.save(key).context("storing API key")?;
        info!(path = %store.path().display(), "credential_saved");
    }
    if args.clear_key {
        store.clear().context("removing stored API key")?;
        info!(path = %store.path().display(), "credential_cleared");
    }
    Ok(store.load())
}

async fn run<P>(
    config: &PromptsmithConfig,
    provider: Arc<P>,
    seed: &str,
    pick: usize,
) -> anyhow::Result<()>
where
    P: SuggestionProvider + EnhancementProvider + AlternativesProvider + 'static,
{
    let mut feed = SuggestionFeed::new(Arc::clone(&provider), config.suggest);
    let mut updates = feed.subscribe();
    feed.on_input(seed);

    let wait = config.suggest.debounce()
        + Duration::from_secs(config.provider.api_timeout_secs.unwrap_or(30))
        + Duration::from_secs(1);
    if tokio::time::timeout(wait, updates.changed()).await.is_err() {
        warn!("suggestions_timed_out");
    }
    let snapshot = feed.snapshot();

    if let Some(err) = &snapshot.credential_error {
        eprintln!("credential rejected: {err}");
    }
    println!("suggestions:");
    for (i, suggestion) in snapshot.suggestions.iter().enumerate() {
        println!("  [{i}] {suggestion}");
    }

    let selection = snapshot
        .suggestions
        .get(pick)
        .cloned()
        .unwrap_or_else(|| seed.to_string());
    println!("\nselected: {selection}");

    let mut session = session_from_config(config, provider)?;
    let document = session.select(&selection, config.style_mode).await?;

    println!("\nprompt:\n  {}\n\ntokens:", document.raw());
    for resolved in document.resolved() {
        if let Some(token) = resolved.token {
            println!(
                "  {:<10} {:<24} -> {}",
                token.role,
                token.text,
                token.alternatives.join(" | ")
            );
        }
    }

    let swap = document
        .resolved()
        .into_iter()
        .filter_map(|r| r.token)
        .find_map(|t| t.alternatives.first().map(|alt| (t.id.clone(), alt.clone())));
    if let Some((id, alternative)) = swap {
        session.replace_token(&id, alternative);
        if let Some(document) = session.document() {
            println!("\nafter swapping {id}:\n  {}", document.raw());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "sk-0123456789abcdefghij";

    fn store_in(dir: &tempfile::TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("credential"), CredentialPolicy::default())
    }

    #[test]
    fn save_then_clear_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let args = Args::try_parse_from(["promptsmith", "--save-key", KEY, "fox"]).unwrap();
        assert_eq!(update_credential(&store, &args).unwrap().as_deref(), Some(KEY));

        let args = Args::try_parse_from(["promptsmith", "fox"]).unwrap();
        assert_eq!(update_credential(&store, &args).unwrap().as_deref(), Some(KEY));

        let args = Args::try_parse_from(["promptsmith", "--clear-key", "fox"]).unwrap();
        assert_eq!(update_credential(&store, &args).unwrap(), None);
        assert!(!store.path().exists());

        // clearing an absent key is fine
        assert_eq!(update_credential(&store, &args).unwrap(), None);
    }

    #[test]
    fn save_and_clear_are_exclusive() {
        let parsed = Args::try_parse_from(["promptsmith", "--save-key", KEY, "--clear-key", "fox"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn invalid_key_is_not_stored() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let args = Args::try_parse_from(["promptsmith", "--save-key", "nope", "fox"]).unwrap();
        assert!(update_credential(&store, &args).is_err());
        assert!(store.load().is_none());
    }
}
