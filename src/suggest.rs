//! Debounced live suggestions with stale-response suppression.
//!
//! Every keystroke restarts a short timer. When the timer fires, a request is
//! dispatched with the next sequence number. A response is published only if
//! no later request has been dispatched in the meantime, so results can never
//! be applied out of order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use provider::{ProviderError, SuggestionProvider};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::SuggestConfig;

/// Sequence number handed to one dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

/// Monotonic request counter. Only the most recent ticket is current.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next ticket, superseding every earlier one.
    pub fn dispatch(&self) -> RequestTicket {
        RequestTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Sequence number of the newest ticket, 0 before the first dispatch.
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

/// What the presentation layer shows under the input box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionSnapshot {
    /// Ticket that produced this snapshot, 0 for the initial state.
    pub request_seq: u64,
    pub suggestions: Vec<String>,
    /// Set when the provider rejected the credential; needs user action.
    pub credential_error: Option<String>,
}

/// Debounced, sequence-numbered suggestion feed over a [`SuggestionProvider`].
///
/// Must be driven from inside a Tokio runtime.
pub struct SuggestionFeed<P: ?Sized> {
    provider: Arc<P>,
    config: SuggestConfig,
    sequencer: Arc<RequestSequencer>,
    publisher: Arc<watch::Sender<SuggestionSnapshot>>,
    pending: Option<JoinHandle<()>>,
}

impl<P> SuggestionFeed<P>
where
    P: SuggestionProvider + ?Sized + 'static,
{
    pub fn new(provider: Arc<P>, config: SuggestConfig) -> Self {
        let (publisher, _) = watch::channel(SuggestionSnapshot::default());
        Self {
            provider,
            config,
            sequencer: Arc::new(RequestSequencer::new()),
            publisher: Arc::new(publisher),
            pending: None,
        }
    }

    /// Receiver that sees every applied snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SuggestionSnapshot> {
        self.publisher.subscribe()
    }

    /// The snapshot currently shown.
    pub fn snapshot(&self) -> SuggestionSnapshot {
        self.publisher.borrow().clone()
    }

    pub fn sequencer(&self) -> &RequestSequencer {
        &self.sequencer
    }

    pub fn config(&self) -> &SuggestConfig {
        &self.config
    }

    /// Whether a debounce timer is armed and has not yet fired.
    pub fn has_pending_timer(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Cancels the pending debounce timer, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Feeds the current content of the input box.
    pub fn on_input(&mut self, text: &str) {
        self.cancel();

        let query = text.trim().to_string();
        if query.chars().count() < self.config.min_query_chars {
            // Too short to query: supersede anything in flight and clear.
            let ticket = self.sequencer.dispatch();
            publish(
                &self.publisher,
                &self.sequencer,
                ticket,
                SuggestionSnapshot {
                    request_seq: ticket.seq(),
                    ..Default::default()
                },
            );
            return;
        }

        let provider = Arc::clone(&self.provider);
        let sequencer = Arc::clone(&self.sequencer);
        let publisher = Arc::clone(&self.publisher);
        let debounce = self.config.debounce();
        let max = self.config.max_suggestions;

        self.pending = Some(tokio::spawn(async move {
            sleep(debounce).await;
            let ticket = sequencer.dispatch();
            debug!(request_seq = ticket.seq(), query_len = query.len(), "suggestions_dispatched");
            // Dispatched requests outlive the timer; staleness is decided by ticket.
            tokio::spawn(fetch(provider, sequencer, publisher, ticket, query, max));
        }));
    }
}

impl<P: ?Sized> Drop for SuggestionFeed<P> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

async fn fetch<P>(
    provider: Arc<P>,
    sequencer: Arc<RequestSequencer>,
    publisher: Arc<watch::Sender<SuggestionSnapshot>>,
    ticket: RequestTicket,
    query: String,
    max: usize,
) where
    P: SuggestionProvider + ?Sized,
{
    let result = provider.complete(&query).await;

    if !sequencer.is_current(ticket) {
        debug!(
            request_seq = ticket.seq(),
            latest = sequencer.latest(),
            "suggestions_stale"
        );
        return;
    }

    let snapshot = match result {
        Ok(mut suggestions) => {
            suggestions.truncate(max);
            SuggestionSnapshot {
                request_seq: ticket.seq(),
                suggestions,
                credential_error: None,
            }
        }
        Err(err @ ProviderError::InvalidCredential(_)) => {
            warn!(request_seq = ticket.seq(), error = %err, "suggestions_credential_rejected");
            SuggestionSnapshot {
                request_seq: ticket.seq(),
                suggestions: Vec::new(),
                credential_error: Some(err.to_string()),
            }
        }
        Err(err) => {
            debug!(request_seq = ticket.seq(), error = %err, "suggestions_unavailable");
            SuggestionSnapshot {
                request_seq: ticket.seq(),
                ..Default::default()
            }
        }
    };
    publish(&publisher, &sequencer, ticket, snapshot);
}

/// Replaces the shown snapshot unless `ticket` was superseded.
fn publish(
    publisher: &watch::Sender<SuggestionSnapshot>,
    sequencer: &RequestSequencer,
    ticket: RequestTicket,
    snapshot: SuggestionSnapshot,
) {
    publisher.send_if_modified(|current| {
        if !sequencer.is_current(ticket) || ticket.seq() < current.request_seq {
            return false;
        }
        *current = snapshot;
        true
    });
}
