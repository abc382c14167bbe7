use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One row of the backend's history response.
///
/// The backend computes every field, including indicators and gap/swing
/// flags. The client never derives or mutates them; it only chooses what
/// to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// `YYYY-MM-DD` for daily data, a timestamp string for intraday data.
    pub date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    pub close: f64,
    pub volume: f64,

    #[serde(rename = "SMA_20", default, skip_serializing_if = "Option::is_none")]
    pub sma_20: Option<f64>,
    #[serde(rename = "EMA_20", default, skip_serializing_if = "Option::is_none")]
    pub ema_20: Option<f64>,
    /// Outer `None`: the column is absent. `Some(None)`: present but null.
    #[serde(
        rename = "RSI_14",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub rsi_14: Option<Option<f64>>,

    #[serde(default)]
    pub gap_up: bool,
    #[serde(default)]
    pub gap_down: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap_size: Option<f64>,
    #[serde(default)]
    pub swing_high: bool,
    #[serde(default)]
    pub swing_low: bool,

    /// Any other column the backend adds (new indicators, nulls).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Marks a field as present even when its value is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

impl SeriesPoint {
    /// Minimal point with only the mandatory fields set.
    pub fn new(date: impl Into<String>, close: f64, volume: f64) -> Self {
        Self {
            date: date.into(),
            open: None,
            high: None,
            low: None,
            close,
            volume,
            sma_20: None,
            ema_20: None,
            rsi_14: None,
            gap_up: false,
            gap_down: false,
            gap_size: None,
            swing_high: false,
            swing_low: false,
            extra: BTreeMap::new(),
        }
    }

    /// This point as a flat JSON object, the shape the chat endpoint expects
    /// for `indicator_values`.
    pub fn to_snapshot(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Parsed `/history` response.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryResponse {
    Series(Vec<SeriesPoint>),
    /// `{"error": "..."}` from the backend.
    Error(String),
}

impl HistoryResponse {
    /// Classify a raw JSON body. An `error` key wins, an array becomes the
    /// series, anything else is `None` (unexpected format).
    pub fn classify(body: Value) -> Option<HistoryResponse> {
        match body {
            Value::Object(map) => match map.get("error") {
                Some(Value::String(msg)) if !msg.is_empty() => {
                    Some(HistoryResponse::Error(msg.clone()))
                }
                Some(Value::Object(_)) | Some(Value::Array(_)) | Some(Value::Number(_)) => {
                    map.get("error").map(|e| HistoryResponse::Error(e.to_string()))
                }
                _ => None,
            },
            Value::Array(_) => serde_json::from_value::<Vec<SeriesPoint>>(body)
                .ok()
                .map(HistoryResponse::Series),
            _ => None,
        }
    }
}
