use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::selection::TimeOption;

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in the assistant conversation.
///
/// Messages are never edited after creation; the conversation is the
/// insertion-ordered list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Local wall-clock time as `HH:MM`, as shown under each bubble.
    pub fn time_label(&self) -> String {
        self.timestamp.with_timezone(&Local).format("%H:%M").to_string()
    }
}

/// Chart context sent along with a question.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatContext {
    pub symbol: String,
    /// Latest series point, field name → value.
    pub indicator_values: Map<String, Value>,
    pub time_period: Option<TimeOption>,
    pub selected_indicators: Vec<String>,
    pub uid: Option<String>,
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub question: String,
    pub symbol: String,
    pub indicator_values: Map<String, Value>,
    /// `{}` when no period is selected.
    pub time_period: Value,
    pub selected_indicators: Vec<String>,
    pub uid: Option<String>,
}

impl ChatRequest {
    pub fn new(question: impl Into<String>, context: ChatContext) -> Self {
        let time_period = context
            .time_period
            .and_then(|t| serde_json::to_value(t).ok())
            .unwrap_or_else(|| Value::Object(Map::new()));
        Self {
            question: question.into(),
            symbol: context.symbol,
            indicator_values: context.indicator_values,
            time_period,
            selected_indicators: context.selected_indicators,
            uid: context.uid,
        }
    }
}

/// Successful `/chat` reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    /// Updated balance, when the backend charged for the question.
    #[serde(default, deserialize_with = "balance")]
    pub credits: Option<u64>,
}

/// Accept any JSON number that is a whole non-negative value (`4`, `4.0`).
/// Anything else is dropped so the reply text still reaches the user.
fn balance<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let credits = match &raw {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Some(_) => None,
    };
    if credits.is_none() && raw.as_ref().is_some_and(|v| !v.is_null()) {
        tracing::warn!(credits = ?raw, "ignoring non-integral credits in chat reply");
    }
    Ok(credits)
}
