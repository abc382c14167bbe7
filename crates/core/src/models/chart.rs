use serde::{Deserialize, Serialize};

/// A line drawn over the date axis. `None` values are gaps in the line.
///
/// The core decides which series exist; the frontend just renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    /// Backend field name the values come from (`close`, `SMA_20`, ...)
    pub key: String,

    /// Legend label (`Close`, `SMA 20`, ...)
    pub name: String,

    /// One value per series point, aligned with `PriceChart::dates`
    pub values: Vec<Option<f64>>,
}

/// Kind of event annotation on the price line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerKind {
    GapUp,
    GapDown,
    SwingHigh,
    SwingLow,
}

impl MarkerKind {
    pub fn label(&self) -> &'static str {
        match self {
            MarkerKind::GapUp => "Gap Up",
            MarkerKind::GapDown => "Gap Down",
            MarkerKind::SwingHigh => "Swing High",
            MarkerKind::SwingLow => "Swing Low",
        }
    }

    /// Whether the label sits above the dot.
    pub fn label_above(&self) -> bool {
        matches!(self, MarkerKind::GapUp | MarkerKind::SwingHigh)
    }
}

/// A labelled dot anchored at a point's close price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartMarker {
    pub kind: MarkerKind,
    pub date: String,
    pub value: f64,
}

/// A horizontal guide line, e.g. RSI overbought at 70.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub value: f64,
    pub label: String,
}

/// The RSI sub-chart, fixed to a 0..100 axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiPanel {
    pub line: LineSeries,
    pub reference_lines: Vec<ReferenceLine>,
    pub domain: (f64, f64),
}

/// Everything needed to draw the price, volume and RSI charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChart {
    /// Raw x-axis values, one per point
    pub dates: Vec<String>,

    /// Tick labels (`MM/YYYY` for daily dates)
    pub axis_labels: Vec<String>,

    /// Close price first, then any selected overlays
    pub lines: Vec<LineSeries>,

    pub markers: Vec<ChartMarker>,

    pub volume: Vec<f64>,

    /// Present only when RSI is selected and the data carries it
    pub rsi: Option<RsiPanel>,
}

impl PriceChart {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
