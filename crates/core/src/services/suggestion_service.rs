use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::models::symbol::SymbolSuggestion;
use crate::providers::traits::MarketDataProvider;

use super::debounce::Debouncer;

/// Current autocomplete list and whether a search is running.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionState {
    pub items: Vec<SymbolSuggestion>,
    pub loading: bool,
}

/// Debounced symbol autocomplete.
///
/// Only the last query inside a quiet window reaches the backend. Results
/// replace the list wholesale; a failed search empties it.
pub struct SuggestionService {
    provider: Arc<dyn MarketDataProvider>,
    debouncer: Debouncer,
    min_query_len: usize,
    state: Arc<watch::Sender<SuggestionState>>,
}

impl SuggestionService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, delay: Duration, min_query_len: usize) -> Self {
        let (tx, _rx) = watch::channel(SuggestionState::default());
        Self {
            provider,
            debouncer: Debouncer::new(delay),
            min_query_len,
            state: Arc::new(tx),
        }
    }

    /// Queue a search for `query`, replacing any queued one. Queries shorter
    /// than the minimum clear the list without touching the network.
    pub fn on_query(&mut self, query: &str) {
        let query = query.trim().to_string();
        if query.chars().count() < self.min_query_len {
            self.clear();
            return;
        }

        let provider = Arc::clone(&self.provider);
        let state = Arc::clone(&self.state);
        self.debouncer.schedule(async move {
            state.send_modify(|s| s.loading = true);
            let items = match provider.search_symbols(&query).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "symbol search failed");
                    Vec::new()
                }
            };
            state.send_replace(SuggestionState {
                items,
                loading: false,
            });
        });
    }

    /// Cancel the queued search and empty the list immediately.
    pub fn clear(&mut self) {
        self.debouncer.cancel();
        self.state.send_replace(SuggestionState::default());
    }

    pub fn snapshot(&self) -> SuggestionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SuggestionState> {
        self.state.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}
