use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::chat::{ChatReply, ChatRequest};
use crate::models::credits::{CheckoutPrefill, OrderDescriptor, RegistrationOutcome};
use crate::models::series::HistoryResponse;
use crate::models::symbol::SymbolSuggestion;

/// Parameters of one `/history` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub symbol: String,
    pub period: String,
    pub interval: String,
    /// Comma-joined indicator keys. Empty means the parameter is omitted.
    pub indicators: String,
}

/// Symbol search and price history.
///
/// The HTTP backend implements this; tests and alternative frontends can
/// swap in their own source without touching the controller.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Autocomplete matches for `query`.
    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolSuggestion>, CoreError>;

    /// Price series plus requested indicators, or the backend's error message.
    ///
    /// `Err(CoreError::UnexpectedFormat)` when the body is neither shape.
    async fn fetch_history(&self, query: &HistoryQuery) -> Result<HistoryResponse, CoreError>;
}

/// Server-side credit balance.
#[async_trait]
pub trait CreditsLedger: Send + Sync {
    /// Idempotent upsert of the user; returns the balance and whether the user is new.
    async fn register_user(&self, uid: &str, email: &str)
        -> Result<RegistrationOutcome, CoreError>;

    async fn fetch_credits(&self, uid: &str) -> Result<u64, CoreError>;

    /// Grant credits without a checkout (alternate purchase path).
    async fn buy_credits(&self, uid: &str, amount: u64) -> Result<u64, CoreError>;
}

/// Order creation for the external payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, uid: &str, credits: u64) -> Result<OrderDescriptor, CoreError>;
}

/// The third-party checkout widget.
///
/// Resolves once the user finished paying. A dismissed or failed checkout
/// is an error.
#[async_trait]
pub trait CheckoutWidget: Send + Sync {
    async fn checkout(
        &self,
        order: &OrderDescriptor,
        prefill: &CheckoutPrefill,
    ) -> Result<(), CoreError>;
}

/// The assistant endpoint.
#[async_trait]
pub trait ChatAssistant: Send + Sync {
    async fn ask(&self, request: &ChatRequest) -> Result<ChatReply, CoreError>;
}
