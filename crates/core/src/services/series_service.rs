use std::sync::Arc;

use crate::config::StaleResponsePolicy;
use crate::errors::CoreError;
use crate::models::selection::{IndicatorSet, TimeOption};
use crate::models::series::{HistoryResponse, SeriesPoint};
use crate::providers::traits::{HistoryQuery, MarketDataProvider};

pub const EMPTY_SYMBOL_MESSAGE: &str = "Please enter a stock symbol.";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch data.";
pub const UNEXPECTED_FORMAT_MESSAGE: &str = "Unexpected data format from server";

/// A history request that was issued and has not been applied yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    /// Monotonic per service, starting at 1.
    pub seq: u64,
    pub query: HistoryQuery,
}

/// Price history state: the series, the error line and the loading flag.
///
/// Overlapping fetches are not serialized. Under
/// `StaleResponsePolicy::LastResolvedWins` whichever response resolves last
/// overwrites the state; `DiscardStale` drops responses older than the most
/// recently issued request.
pub struct SeriesService {
    provider: Arc<dyn MarketDataProvider>,
    policy: StaleResponsePolicy,
    series: Option<Vec<SeriesPoint>>,
    error: Option<String>,
    loading: bool,
    last_seq: u64,
}

impl SeriesService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, policy: StaleResponsePolicy) -> Self {
        Self {
            provider,
            policy,
            series: None,
            error: None,
            loading: false,
            last_seq: 0,
        }
    }

    pub fn series(&self) -> Option<&[SeriesPoint]> {
        self.series.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Validate and issue a request. With no symbol, sets the validation
    /// message, clears the series and returns `None`.
    pub fn begin(
        &mut self,
        symbol: &str,
        time: &TimeOption,
        indicators: &IndicatorSet,
    ) -> Option<FetchTicket> {
        if symbol.trim().is_empty() {
            self.error = Some(EMPTY_SYMBOL_MESSAGE.to_string());
            self.series = None;
            return None;
        }

        self.loading = true;
        self.error = None;
        self.series = None;
        self.last_seq += 1;

        Some(FetchTicket {
            seq: self.last_seq,
            query: HistoryQuery {
                symbol: symbol.to_string(),
                period: time.period.clone(),
                interval: time.interval.clone(),
                indicators: indicators.query_value(),
            },
        })
    }

    /// Apply a resolved response. Returns `false` if it was discarded as stale.
    pub fn apply(&mut self, seq: u64, result: Result<HistoryResponse, CoreError>) -> bool {
        if self.policy == StaleResponsePolicy::DiscardStale && seq != self.last_seq {
            tracing::debug!(seq, latest = self.last_seq, "discarding stale history response");
            return false;
        }

        match result {
            Ok(HistoryResponse::Series(points)) => {
                tracing::debug!(points = points.len(), "history loaded");
                self.series = Some(points);
            }
            Ok(HistoryResponse::Error(message)) | Err(CoreError::Backend(message)) => {
                self.error = Some(message);
            }
            Err(CoreError::UnexpectedFormat) => {
                self.error = Some(UNEXPECTED_FORMAT_MESSAGE.to_string());
            }
            Err(e) => {
                tracing::warn!(error = %e, "history request failed");
                self.error = Some(FETCH_FAILED_MESSAGE.to_string());
            }
        }
        self.loading = false;
        true
    }

    /// Issue, await and apply one request.
    pub async fn fetch(&mut self, symbol: &str, time: &TimeOption, indicators: &IndicatorSet) {
        let Some(ticket) = self.begin(symbol, time, indicators) else {
            return;
        };
        let result = self.provider.fetch_history(&ticket.query).await;
        self.apply(ticket.seq, result);
    }

    /// Last point of the series, the snapshot sent to the assistant.
    pub fn latest(&self) -> Option<&SeriesPoint> {
        self.series.as_ref().and_then(|s| s.last())
    }
}
