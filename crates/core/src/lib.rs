pub mod config;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::watch;

use config::DashboardConfig;
use errors::CoreError;
use models::{
    chart::PriceChart,
    chat::{ChatContext, ChatReply},
    credits::CheckoutPrefill,
    geometry::Viewport,
    selection::{Indicator, IndicatorSet, TimeOption},
    series::{HistoryResponse, SeriesPoint},
    session::Session,
    symbol::{InputChangeReason, SymbolSelection, SymbolSuggestion},
};
use providers::http::HttpBackend;
use providers::traits::{
    ChatAssistant, CheckoutWidget, CreditsLedger, MarketDataProvider, PaymentGateway,
};
use services::{
    chart_service::ChartService,
    chat_panel::{ChatPanel, SendOutcome, SendTicket},
    credits_store::CreditsStore,
    payment_service::PaymentService,
    series_service::{FetchTicket, SeriesService},
    suggestion_service::{SuggestionService, SuggestionState},
};
use storage::kv::KeyValueStore;
use storage::manager::PanelStore;

pub const BALANCE_UNAVAILABLE_MESSAGE: &str = "Could not load your credits balance.";
pub const PAYMENT_SUCCESS_MESSAGE: &str = "Payment successful! Credits updated.";

/// Install a `tracing` subscriber honouring `RUST_LOG` (default `info`).
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// External collaborators the dashboard talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub market: Arc<dyn MarketDataProvider>,
    pub ledger: Arc<dyn CreditsLedger>,
    pub payments: Arc<dyn PaymentGateway>,
    pub checkout: Arc<dyn CheckoutWidget>,
    pub assistant: Arc<dyn ChatAssistant>,
    pub store: Arc<dyn KeyValueStore>,
}

impl Collaborators {
    /// Every backend call goes through one `HttpBackend` built from `config`.
    pub fn http(
        config: &DashboardConfig,
        checkout: Arc<dyn CheckoutWidget>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, CoreError> {
        let backend = Arc::new(HttpBackend::new(config)?);
        Ok(Self {
            market: backend.clone(),
            ledger: backend.clone(),
            payments: backend.clone(),
            checkout,
            assistant: backend,
            store,
        })
    }
}

/// Main entry point for the Market Master core library.
///
/// Owns all dashboard state (symbol, period, indicators, series, credits,
/// dialogs, chat panel) and wires user events to the backend. Hosts render
/// from the getters and forward events to the `on_*` methods.
#[must_use]
pub struct Dashboard {
    config: DashboardConfig,
    session: Option<Session>,
    symbol: String,
    symbol_input: String,
    time_option: TimeOption,
    indicators: IndicatorSet,
    suggestions: SuggestionService,
    series: SeriesService,
    credits: CreditsStore,
    chat: ChatPanel,
    chart_service: ChartService,
    payment_service: PaymentService,
    ledger: Arc<dyn CreditsLedger>,
    assistant: Arc<dyn ChatAssistant>,
    welcome_open: bool,
    buy_credits_open: bool,
    notice: Option<String>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("signed_in", &self.session.is_some())
            .field("symbol", &self.symbol)
            .field("period", &self.time_option.label)
            .field("indicators", &self.indicators.keys())
            .field("credits", &self.credits.get())
            .field("chat_open", &self.chat.is_open())
            .finish()
    }
}

impl Dashboard {
    pub fn new(config: DashboardConfig, deps: Collaborators, viewport: Viewport) -> Self {
        let panel_store = PanelStore::new(deps.store.clone(), config.history_limit);
        let chat = ChatPanel::new(panel_store, None, viewport, config.bot_name.clone());
        let symbol = config.default_symbol.to_uppercase();

        Self {
            session: None,
            symbol_input: symbol.clone(),
            symbol,
            time_option: TimeOption::default(),
            indicators: IndicatorSet::new(),
            suggestions: SuggestionService::new(
                deps.market.clone(),
                config.suggestion_debounce(),
                config.min_query_len,
            ),
            series: SeriesService::new(deps.market.clone(), config.stale_responses),
            credits: CreditsStore::new(),
            chat,
            chart_service: ChartService::new(),
            payment_service: PaymentService::new(
                deps.payments.clone(),
                deps.checkout.clone(),
                deps.ledger.clone(),
                config.purchase_mode,
            ),
            ledger: deps.ledger,
            assistant: deps.assistant,
            welcome_open: false,
            buy_credits_open: false,
            notice: None,
            config,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    // ── Session ─────────────────────────────────────────────────────

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// React to an auth-provider notification.
    ///
    /// Signing in registers the user (once per transition) and loads the
    /// balance; a brand-new user gets the welcome dialog. Signing out forgets
    /// the balance and closes the credit dialogs. Either way the chat history
    /// switches to the new scope.
    pub async fn on_auth_change(&mut self, session: Option<Session>) {
        let previous_uid = self.session.as_ref().and_then(Session::uid).map(str::to_string);
        let switched_user = self.session.is_some()
            && session.is_some()
            && previous_uid.as_deref() != session.as_ref().and_then(Session::uid);
        let signed_in = session.is_some() && (self.session.is_none() || switched_user);
        let signed_out = self.session.is_some() && session.is_none();
        self.session = session;
        self.chat.rescope(self.session.as_ref());

        if signed_out || switched_user {
            tracing::info!(switched_user, "signed out");
            self.credits.replace(None);
            self.welcome_open = false;
            self.buy_credits_open = false;
        }
        if !signed_in {
            return;
        }

        let Some((uid, email)) = self
            .session
            .as_ref()
            .and_then(|s| s.uid().map(|uid| (uid.to_string(), s.email.clone())))
        else {
            self.notice = Some(BALANCE_UNAVAILABLE_MESSAGE.into());
            return;
        };

        match self.ledger.register_user(&uid, &email).await {
            Ok(outcome) => {
                tracing::info!(credits = outcome.credits, is_new = outcome.is_new, "signed in");
                self.set_credits(outcome.credits);
                if outcome.is_new {
                    self.welcome_open = true;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "user registration failed");
                self.notice = Some(BALANCE_UNAVAILABLE_MESSAGE.into());
            }
        }
    }

    // ── Symbol search ───────────────────────────────────────────────

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub fn symbol_input(&self) -> &str {
        &self.symbol_input
    }

    /// Text typed into (or cleared from) the symbol box.
    ///
    /// Must be called within a Tokio runtime: typing schedules a debounced search.
    pub fn on_symbol_input(&mut self, text: &str, reason: InputChangeReason) {
        match reason {
            InputChangeReason::Input => {
                self.symbol_input = text.to_uppercase();
                self.suggestions.on_query(text);
            }
            InputChangeReason::Clear => {
                self.symbol_input.clear();
                self.suggestions.clear();
            }
            InputChangeReason::Reset => {}
        }
    }

    /// A value committed from the symbol box.
    pub fn on_symbol_select(&mut self, selection: SymbolSelection) {
        if let Some(symbol) = selection.normalized() {
            self.symbol_input = symbol.clone();
            self.symbol = symbol;
        }
    }

    #[must_use]
    pub fn suggestions(&self) -> Vec<SymbolSuggestion> {
        self.suggestions.snapshot().items
    }

    #[must_use]
    pub fn is_loading_suggestions(&self) -> bool {
        self.suggestions.snapshot().loading
    }

    pub fn subscribe_suggestions(&self) -> watch::Receiver<SuggestionState> {
        self.suggestions.subscribe()
    }

    // ── Period & indicators ─────────────────────────────────────────

    #[must_use]
    pub fn time_option(&self) -> &TimeOption {
        &self.time_option
    }

    /// Select a period by its label. Unknown labels are ignored.
    pub fn select_time_option(&mut self, label: &str) -> bool {
        match TimeOption::by_label(label) {
            Some(option) => {
                self.time_option = option;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn indicators(&self) -> &IndicatorSet {
        &self.indicators
    }

    /// Add or remove an indicator. Takes effect on the next fetch.
    pub fn toggle_indicator(&mut self, indicator: Indicator, enabled: bool) {
        self.indicators.toggle(indicator, enabled);
    }

    // ── Price history ───────────────────────────────────────────────

    #[must_use]
    pub fn series(&self) -> Option<&[SeriesPoint]> {
        self.series.series()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.series.error()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.series.is_loading()
    }

    /// Fetch the series for the current symbol, period and indicators.
    pub async fn fetch_series(&mut self) {
        let symbol = self.symbol.clone();
        let time = self.time_option.clone();
        let indicators = self.indicators.clone();
        self.series.fetch(&symbol, &time, &indicators).await;
    }

    /// Issue a fetch without awaiting it. The host performs the request
    /// and hands the result to `apply_history`.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        self.series
            .begin(&self.symbol, &self.time_option, &self.indicators)
    }

    /// Returns `false` when the response was discarded as stale.
    pub fn apply_history(
        &mut self,
        ticket: &FetchTicket,
        result: Result<HistoryResponse, CoreError>,
    ) -> bool {
        self.series.apply(ticket.seq, result)
    }

    /// Latest point as a JSON object; empty without data.
    #[must_use]
    pub fn latest_indicator_values(&self) -> Map<String, Value> {
        self.series
            .latest()
            .map(SeriesPoint::to_snapshot)
            .unwrap_or_default()
    }

    /// Chart marks for the current series, `None` before data arrived.
    #[must_use]
    pub fn chart(&self) -> Option<PriceChart> {
        self.series
            .series()
            .map(|points| self.chart_service.build(&self.symbol, points, &self.indicators))
    }

    // ── Credits ─────────────────────────────────────────────────────

    #[must_use]
    pub fn credits(&self) -> Option<u64> {
        self.credits.get()
    }

    pub fn subscribe_credits(&self) -> watch::Receiver<Option<u64>> {
        self.credits.subscribe()
    }

    /// Replace the cached balance with a server-reported value.
    ///
    /// Hitting exactly zero while the chat panel is open closes it and opens
    /// the purchase dialog.
    pub fn set_credits(&mut self, credits: u64) {
        self.credits.replace(Some(credits));
        if credits == 0 && self.chat.is_open() {
            tracing::info!("out of credits; closing chat");
            self.chat.close();
            self.buy_credits_open = true;
        }
    }

    /// Buy `amount` credits (the configured package when `None`).
    ///
    /// On success the balance is replaced and the dialog closes; on failure
    /// a notice is set and nothing else changes.
    pub async fn purchase_credits(&mut self, amount: Option<u64>, contact: &str) {
        let amount = amount.unwrap_or(self.config.credit_package);
        let prefill = CheckoutPrefill {
            email: self
                .session
                .as_ref()
                .map(|s| s.email.clone())
                .unwrap_or_default(),
            contact: contact.to_string(),
        };
        let uid = self.session.as_ref().and_then(Session::uid);

        match self.payment_service.purchase(uid, amount, &prefill).await {
            Ok(credits) => {
                tracing::info!(credits, "purchase completed");
                self.set_credits(credits);
                self.buy_credits_open = false;
                self.notice = Some(PAYMENT_SUCCESS_MESSAGE.into());
            }
            Err(CoreError::Validation(message)) => {
                self.notice = Some(message);
            }
            Err(e) => {
                tracing::warn!(error = %e, "purchase failed");
                self.notice = Some(format!("Payment failed: {e}"));
            }
        }
    }

    // ── Dialogs & notices ───────────────────────────────────────────

    #[must_use]
    pub fn is_welcome_open(&self) -> bool {
        self.welcome_open
    }

    pub fn dismiss_welcome(&mut self) {
        self.welcome_open = false;
    }

    #[must_use]
    pub fn is_buy_credits_open(&self) -> bool {
        self.buy_credits_open
    }

    pub fn open_buy_credits(&mut self) {
        self.buy_credits_open = true;
    }

    pub fn close_buy_credits(&mut self) {
        self.buy_credits_open = false;
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Take the pending notice, leaving none.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    // ── Chat ────────────────────────────────────────────────────────

    #[must_use]
    pub fn chat(&self) -> &ChatPanel {
        &self.chat
    }

    /// Direct access for gestures, input and visibility.
    pub fn chat_mut(&mut self) -> &mut ChatPanel {
        &mut self.chat
    }

    /// Context attached to the next question.
    #[must_use]
    pub fn chat_context(&self) -> ChatContext {
        ChatContext {
            symbol: self.symbol.clone(),
            indicator_values: self.latest_indicator_values(),
            time_period: Some(self.time_option.clone()),
            selected_indicators: self.indicators.keys(),
            uid: self.session.as_ref().and_then(Session::uid).map(str::to_string),
        }
    }

    /// Ask the assistant. A reported balance replaces the cached one.
    pub async fn send_chat(&mut self, text: &str) -> SendOutcome {
        let context = self.chat_context();
        let assistant = Arc::clone(&self.assistant);
        let outcome = self
            .chat
            .send_message(text, context, assistant.as_ref())
            .await;
        if let SendOutcome::Completed {
            credits: Some(credits),
        } = outcome
        {
            self.set_credits(credits);
        }
        outcome
    }

    /// First half of `send_chat` for hosts that drive the request themselves.
    pub fn begin_chat_send(&mut self, text: &str) -> Option<SendTicket> {
        let context = self.chat_context();
        self.chat.begin_send(text, context)
    }

    /// Second half of `send_chat`. Replies from before a sign-in change are dropped.
    pub fn complete_chat_send(
        &mut self,
        ticket: &SendTicket,
        result: Result<ChatReply, CoreError>,
    ) {
        if let Some(credits) = self.chat.complete_send(ticket.generation, result) {
            self.set_credits(credits);
        }
    }
}
