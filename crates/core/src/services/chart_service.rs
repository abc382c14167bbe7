use crate::models::chart::{
    ChartMarker, LineSeries, MarkerKind, PriceChart, ReferenceLine, RsiPanel,
};
use crate::models::selection::{Indicator, IndicatorSet};
use crate::models::series::SeriesPoint;

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

/// Maps a backend series to chart marks.
///
/// Pure presentation: no numbers are computed here, the service only picks
/// which backend-supplied series are drawn.
/// - Close price line, always
/// - SMA 20 / EMA 20 overlays when selected and present in the data
/// - Gap and swing markers at the close price (gap up wins over gap down,
///   swing high over swing low)
/// - Volume bars
/// - RSI sub-chart with 70/30 guides when selected and the column exists
#[derive(Debug, Default)]
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    pub fn build(
        &self,
        symbol: &str,
        series: &[SeriesPoint],
        indicators: &IndicatorSet,
    ) -> PriceChart {
        let dates: Vec<String> = series.iter().map(|p| p.date.clone()).collect();
        let axis_labels = dates.iter().map(|d| format_axis_date(d)).collect();

        let mut lines = vec![LineSeries {
            key: "close".into(),
            name: format!("{symbol} Close"),
            values: series.iter().map(|p| Some(p.close)).collect(),
        }];
        if indicators.contains(Indicator::Sma20) {
            if let Some(line) = overlay(series, "SMA_20", Indicator::Sma20, |p| p.sma_20) {
                lines.push(line);
            }
        }
        if indicators.contains(Indicator::Ema20) {
            if let Some(line) = overlay(series, "EMA_20", Indicator::Ema20, |p| p.ema_20) {
                lines.push(line);
            }
        }

        // The RSI panel follows the column, not its values: all-null still shows.
        let rsi_present = series.iter().any(|p| p.rsi_14.is_some());
        let rsi = if indicators.contains(Indicator::Rsi) && rsi_present {
            Some(RsiPanel {
                line: LineSeries {
                    key: "RSI_14".into(),
                    name: "RSI 14".into(),
                    values: series.iter().map(|p| p.rsi_14.flatten()).collect(),
                },
                reference_lines: vec![
                    ReferenceLine {
                        value: RSI_OVERBOUGHT,
                        label: "Overbought (70)".into(),
                    },
                    ReferenceLine {
                        value: RSI_OVERSOLD,
                        label: "Oversold (30)".into(),
                    },
                ],
                domain: (0.0, 100.0),
            })
        } else {
            None
        };

        PriceChart {
            dates,
            axis_labels,
            lines,
            markers: markers(series),
            volume: series.iter().map(|p| p.volume).collect(),
            rsi,
        }
    }
}

/// A line for an optional field, or `None` when no point carries it.
fn overlay(
    series: &[SeriesPoint],
    key: &str,
    indicator: Indicator,
    field: impl Fn(&SeriesPoint) -> Option<f64>,
) -> Option<LineSeries> {
    let values: Vec<Option<f64>> = series.iter().map(&field).collect();
    if values.iter().all(Option::is_none) {
        return None;
    }
    Some(LineSeries {
        key: key.to_string(),
        name: indicator.label().to_string(),
        values,
    })
}

fn markers(series: &[SeriesPoint]) -> Vec<ChartMarker> {
    let mut out = Vec::new();
    for point in series {
        let gap = if point.gap_up {
            Some(MarkerKind::GapUp)
        } else if point.gap_down {
            Some(MarkerKind::GapDown)
        } else {
            None
        };
        let swing = if point.swing_high {
            Some(MarkerKind::SwingHigh)
        } else if point.swing_low {
            Some(MarkerKind::SwingLow)
        } else {
            None
        };
        for kind in [gap, swing].into_iter().flatten() {
            out.push(ChartMarker {
                kind,
                date: point.date.clone(),
                value: point.close,
            });
        }
    }
    out
}

/// `"2024-03-15"` → `"03/2024"`. Anything without a `-` passes through.
pub fn format_axis_date(date: &str) -> String {
    let mut parts = date.split('-');
    match (parts.next(), parts.next()) {
        (Some(year), Some(month)) if !year.is_empty() && !month.is_empty() => {
            format!("{month}/{year}")
        }
        _ => date.to_string(),
    }
}
