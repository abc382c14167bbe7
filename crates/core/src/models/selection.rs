use serde::{Deserialize, Serialize};

/// A period/interval pair offered in the period picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOption {
    pub label: String,
    pub period: String,
    pub interval: String,
}

impl TimeOption {
    fn new(label: &str, period: &str, interval: &str) -> Self {
        Self {
            label: label.to_string(),
            period: period.to_string(),
            interval: interval.to_string(),
        }
    }

    /// The fixed catalogue, in display order.
    pub fn catalogue() -> Vec<TimeOption> {
        vec![
            TimeOption::new("5 Minutes", "7d", "5m"),
            TimeOption::new("15 Minutes", "60d", "15m"),
            TimeOption::new("1 Day", "1mo", "1d"),
            TimeOption::new("1 Month", "6mo", "1d"),
            TimeOption::new("1 Year", "1y", "1d"),
            TimeOption::new("5 Years", "5y", "1wk"),
        ]
    }

    /// Look up a catalogue entry by its label.
    pub fn by_label(label: &str) -> Option<TimeOption> {
        Self::catalogue().into_iter().find(|t| t.label == label)
    }
}

impl Default for TimeOption {
    /// "1 Day" (1mo / 1d).
    fn default() -> Self {
        TimeOption::new("1 Day", "1mo", "1d")
    }
}

/// Technical indicators the backend can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indicator {
    #[serde(rename = "sma20")]
    Sma20,
    #[serde(rename = "ema20")]
    Ema20,
    #[serde(rename = "rsi")]
    Rsi,
}

impl Indicator {
    pub const ALL: [Indicator; 3] = [Indicator::Sma20, Indicator::Ema20, Indicator::Rsi];

    /// Wire key used in the `indicators` query parameter.
    pub fn key(&self) -> &'static str {
        match self {
            Indicator::Sma20 => "sma20",
            Indicator::Ema20 => "ema20",
            Indicator::Rsi => "rsi",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Indicator::Sma20 => "SMA 20",
            Indicator::Ema20 => "EMA 20",
            Indicator::Rsi => "RSI",
        }
    }

    pub fn from_key(key: &str) -> Option<Indicator> {
        let key = key.trim().to_lowercase();
        Self::ALL.into_iter().find(|i| i.key() == key)
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Insertion-ordered set of selected indicators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorSet {
    items: Vec<Indicator>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or remove `indicator`. Adding twice is a no-op.
    pub fn toggle(&mut self, indicator: Indicator, enabled: bool) {
        if enabled {
            if !self.items.contains(&indicator) {
                self.items.push(indicator);
            }
        } else {
            self.items.retain(|i| *i != indicator);
        }
    }

    pub fn contains(&self, indicator: Indicator) -> bool {
        self.items.contains(&indicator)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Indicator> + '_ {
        self.items.iter().copied()
    }

    pub fn keys(&self) -> Vec<String> {
        self.items.iter().map(|i| i.key().to_string()).collect()
    }

    /// Comma-joined wire keys, e.g. `"sma20,rsi"`.
    pub fn query_value(&self) -> String {
        self.keys().join(",")
    }
}

impl FromIterator<Indicator> for IndicatorSet {
    fn from_iter<T: IntoIterator<Item = Indicator>>(iter: T) -> Self {
        let mut set = IndicatorSet::new();
        for indicator in iter {
            set.toggle(indicator, true);
        }
        set
    }
}
