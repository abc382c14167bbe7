use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::DashboardConfig;
use crate::errors::CoreError;
use crate::models::chat::{ChatReply, ChatRequest};
use crate::models::credits::{CreditsReply, OrderDescriptor, RegistrationOutcome};
use crate::models::series::HistoryResponse;
use crate::models::symbol::SymbolSuggestion;

use super::traits::{ChatAssistant, CreditsLedger, HistoryQuery, MarketDataProvider, PaymentGateway};

/// HTTP client for the dashboard backend.
///
/// - **Base URL**: one configured host for every endpoint.
/// - **Strategy**: one request per call. No retries, no caching, no dedup.
/// - **Timeout**: none unless `request_timeout_secs` is configured.
///
/// Non-2xx statuses and unparseable bodies both become `CoreError::Request`;
/// transport failures become `CoreError::Network`.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    payment_order_path: String,
}

impl HttpBackend {
    pub fn new(config: &DashboardConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CoreError::Config(format!("Failed to build HTTP client: {e}")))?;
        let base_url = Url::parse(config.base_url())
            .map_err(|e| CoreError::Config(format!("base_url: {e}")))?;
        Ok(Self {
            client,
            base_url,
            payment_order_path: config.payment_order_path.clone(),
        })
    }

    /// Base URL extended with the given path segments (each one percent-encoded).
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }

    fn payment_order_url(&self) -> Url {
        let segments: Vec<&str> = self
            .payment_order_path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        self.endpoint(&segments)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        url: Url,
        body: &Value,
    ) -> Result<T, CoreError> {
        tracing::debug!(endpoint, "POST");
        let resp = self.client.post(url).json(body).send().await?;
        parse_success(endpoint, resp).await
    }
}

/// Reject non-2xx, then parse the body as `T`.
async fn parse_success<T: DeserializeOwned>(endpoint: &str, resp: Response) -> Result<T, CoreError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(CoreError::request(endpoint, format!("HTTP {status}")));
    }
    resp.json::<T>()
        .await
        .map_err(|e| CoreError::request(endpoint, format!("Failed to parse response: {e}")))
}

/// Parse the body as JSON regardless of status.
async fn parse_any(endpoint: &str, resp: Response) -> Result<Value, CoreError> {
    resp.json::<Value>()
        .await
        .map_err(|e| CoreError::request(endpoint, format!("Failed to parse response: {e}")))
}

/// Turn a `create_order` body into an order, or the backend's reason for not creating one.
pub fn order_from_body(body: Value) -> Result<OrderDescriptor, CoreError> {
    let has_order_id = body
        .get("order_id")
        .is_some_and(|id| id.as_str().is_some_and(|s| !s.is_empty()));
    if !has_order_id {
        let reason = body
            .get("error")
            .or_else(|| body.get("detail"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or("Failed to create order");
        return Err(CoreError::Backend(reason.to_string()));
    }
    serde_json::from_value(body)
        .map_err(|e| CoreError::request("create_order", format!("Malformed order: {e}")))
}

#[async_trait]
impl MarketDataProvider for HttpBackend {
    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolSuggestion>, CoreError> {
        tracing::debug!(query, "searching symbols");
        let resp = self
            .client
            .get(self.endpoint(&["symbols"]))
            .query(&[("q", query)])
            .send()
            .await?;
        parse_success("symbols", resp).await
    }

    async fn fetch_history(&self, query: &HistoryQuery) -> Result<HistoryResponse, CoreError> {
        tracing::debug!(
            symbol = %query.symbol,
            period = %query.period,
            interval = %query.interval,
            indicators = %query.indicators,
            "fetching history"
        );
        let mut params = vec![
            ("symbol", query.symbol.as_str()),
            ("period", query.period.as_str()),
            ("interval", query.interval.as_str()),
        ];
        if !query.indicators.is_empty() {
            params.push(("indicators", query.indicators.as_str()));
        }
        let resp = self
            .client
            .get(self.endpoint(&["history"]))
            .query(&params)
            .send()
            .await?;
        // The backend reports bad symbols as `{"error": ...}`, so the body is
        // classified even for non-2xx statuses.
        let body = parse_any("history", resp).await?;
        HistoryResponse::classify(body).ok_or(CoreError::UnexpectedFormat)
    }
}

#[async_trait]
impl CreditsLedger for HttpBackend {
    async fn register_user(
        &self,
        uid: &str,
        email: &str,
    ) -> Result<RegistrationOutcome, CoreError> {
        self.post_json(
            "register_user",
            self.endpoint(&["register_user"]),
            &json!({ "uid": uid, "email": email }),
        )
        .await
    }

    async fn fetch_credits(&self, uid: &str) -> Result<u64, CoreError> {
        tracing::debug!("fetching credits");
        let resp = self
            .client
            .get(self.endpoint(&["credits", uid]))
            .send()
            .await?;
        let reply: CreditsReply = parse_success("credits", resp).await?;
        Ok(reply.credits)
    }

    async fn buy_credits(&self, uid: &str, amount: u64) -> Result<u64, CoreError> {
        let reply: CreditsReply = self
            .post_json(
                "buy_credits",
                self.endpoint(&["buy_credits"]),
                &json!({ "uid": uid, "amount": amount }),
            )
            .await?;
        Ok(reply.credits)
    }
}

#[async_trait]
impl PaymentGateway for HttpBackend {
    async fn create_order(&self, uid: &str, credits: u64) -> Result<OrderDescriptor, CoreError> {
        tracing::debug!(credits, "creating payment order");
        let resp = self
            .client
            .post(self.payment_order_url())
            .json(&json!({ "uid": uid, "credits": credits }))
            .send()
            .await?;
        let body = parse_any("create_order", resp).await?;
        order_from_body(body)
    }
}

#[async_trait]
impl ChatAssistant for HttpBackend {
    async fn ask(&self, request: &ChatRequest) -> Result<ChatReply, CoreError> {
        let body = serde_json::to_value(request)
            .map_err(|e| CoreError::Serialization(format!("Failed to encode chat request: {e}")))?;
        self.post_json("chat", self.endpoint(&["chat"]), &body).await
    }
}
