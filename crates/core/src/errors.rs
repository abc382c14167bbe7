use thiserror::Error;

/// Unified error type for the entire market-master-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation ──────────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    // ── API / Network ───────────────────────────────────────────────
    /// Non-2xx status or an unparseable body. Both collapse into one outcome
    /// that differs only by its message.
    #[error("Request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    #[error("Network error: {0}")]
    Network(String),

    /// Business error reported by the backend as `{"error": "..."}`.
    #[error("{0}")]
    Backend(String),

    #[error("Unexpected data format from server")]
    UnexpectedFormat,

    // ── Payment ─────────────────────────────────────────────────────
    #[error("Checkout failed: {0}")]
    Checkout(String),

    // ── Storage / Config ────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CoreError {
    /// Build a `Request` error for a named endpoint.
    pub fn request(endpoint: &str, message: impl Into<String>) -> Self {
        CoreError::Request {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(e: toml::de::Error) -> Self {
        CoreError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Strip query parameters from URLs: search terms and user ids end up there.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
