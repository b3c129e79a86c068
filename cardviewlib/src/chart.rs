//! Chart capabilities.
//!
//! Drawing a chart is optional: a `ResultRenderer` is built with or without a
//! `ChartCapability`, and falls back to numeric callouts when it has none or
//! when the capability cannot draw the requested chart.
//!
//! Two capabilities ship with the library:
//! - `TextBarChart`: horizontal unicode bars for terminals
//! - `ChartJs`: a `<canvas>` carrying a Chart.js configuration, for HTML

use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::format::group_thousands;
use crate::options::NumberLocale;
use crate::payload::Background;
use crate::surface::html::escape_html;
use crate::view::Drawing;

/// Everything a charting backend needs to draw one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    /// `bar`, `line`, `pie`, ... as sent by the server
    pub chart_type: String,
    pub labels: Vec<String>,
    pub series: Series,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub data: Vec<Option<f64>>,
    pub background: Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartOptions {
    pub responsive: bool,
    pub animated: bool,
    /// y axis starts at zero
    pub begin_at_zero: bool,
    pub show_legend: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            responsive: true,
            animated: false,
            begin_at_zero: true,
            show_legend: false,
        }
    }
}

/// Reasons a capability declines to draw.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("chart type '{0}' is not supported by this backend")]
    UnsupportedType(String),

    #[error("nothing to draw")]
    Empty,

    #[error("failed to encode chart configuration: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A charting backend available to the renderer.
pub trait ChartCapability: Send + Sync {
    /// Backend name, for logging.
    fn name(&self) -> &str;

    /// Draw the chart described by `spec`.
    fn draw(&self, spec: &ChartSpec) -> Result<Drawing, ChartError>;
}

/// Horizontal bar chart drawn with block characters.
///
/// Only bar-like charts are drawn; other types are declined so the renderer
/// falls back to callouts.
#[derive(Debug, Clone)]
pub struct TextBarChart {
    width: usize,
    locale: NumberLocale,
}

impl Default for TextBarChart {
    fn default() -> Self {
        Self {
            width: 40,
            locale: NumberLocale::default(),
        }
    }
}

impl TextBarChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: maximum bar length in characters
    pub fn width(mut self, width: usize) -> Self {
        self.width = width.max(1);
        self
    }

    /// Builder: grouping used for the value printed after each bar
    pub fn locale(mut self, locale: NumberLocale) -> Self {
        self.locale = locale;
        self
    }
}

impl ChartCapability for TextBarChart {
    fn name(&self) -> &str {
        "text-bars"
    }

    fn draw(&self, spec: &ChartSpec) -> Result<Drawing, ChartError> {
        if !matches!(spec.chart_type.as_str(), "bar" | "horizontalBar" | "line") {
            return Err(ChartError::UnsupportedType(spec.chart_type.clone()));
        }
        if spec.labels.is_empty() {
            return Err(ChartError::Empty);
        }

        let values: Vec<f64> = (0..spec.labels.len())
            .map(|i| spec.series.data.get(i).copied().flatten().unwrap_or(0.0))
            .collect();
        let floor = if spec.options.begin_at_zero {
            0.0
        } else {
            values.iter().copied().fold(f64::INFINITY, f64::min)
        };
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = max - floor;
        let label_width = spec
            .labels
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for (label, value) in spec.labels.iter().zip(&values) {
            let len = if span > 0.0 {
                (((value - floor).max(0.0) / span) * self.width as f64).round() as usize
            } else {
                0
            };
            out.push_str(&format!(
                "{:<width$} │{} {}\n",
                label,
                "█".repeat(len),
                group_thousands(*value, self.locale),
                width = label_width
            ));
        }
        Ok(Drawing::Text(out))
    }
}

/// Emits a `<canvas>` whose `data-chart` attribute holds a Chart.js
/// configuration. A page script instantiates the chart from it.
#[derive(Debug, Clone, Default)]
pub struct ChartJs;

impl ChartJs {
    /// Chart.js configuration object for `spec`.
    pub fn config(spec: &ChartSpec) -> serde_json::Value {
        json!({
            "type": spec.chart_type,
            "data": {
                "labels": spec.labels,
                "datasets": [{
                    "label": spec.series.label,
                    "data": spec.series.data,
                    "backgroundColor": spec.series.background,
                    "borderWidth": 1,
                }],
            },
            "options": {
                "responsive": spec.options.responsive,
                "maintainAspectRatio": false,
                "animation": spec.options.animated,
                "plugins": { "legend": { "display": spec.options.show_legend } },
                "scales": { "y": { "beginAtZero": spec.options.begin_at_zero } },
            },
        })
    }
}

impl ChartCapability for ChartJs {
    fn name(&self) -> &str {
        "chartjs"
    }

    fn draw(&self, spec: &ChartSpec) -> Result<Drawing, ChartError> {
        let config = serde_json::to_string(&Self::config(spec))?;
        Ok(Drawing::Html(format!(
            "<canvas class=\"cardview-chart\" style=\"max-height: 100%;\" data-chart=\"{}\"></canvas>",
            escape_html(&config)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(chart_type: &str, labels: &[&str], data: &[f64]) -> ChartSpec {
        ChartSpec {
            chart_type: chart_type.to_string(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            series: Series {
                label: "Sum".to_string(),
                data: data.iter().map(|v| Some(*v)).collect(),
                background: Background::Single("#1f77b4".to_string()),
            },
            options: ChartOptions::default(),
        }
    }

    #[test]
    fn test_text_bars_scale_to_width() {
        let chart = TextBarChart::new().width(10);
        let Drawing::Text(text) = chart.draw(&spec("bar", &["a", "bb"], &[5.0, 10.0])).unwrap()
        else {
            panic!("expected text drawing");
        };
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "a  │█████ 5");
        assert_eq!(lines[1], "bb │██████████ 10");
    }

    #[test]
    fn test_text_bars_decline_pie() {
        let chart = TextBarChart::new();
        let err = chart.draw(&spec("pie", &["a"], &[1.0])).unwrap_err();
        assert!(matches!(err, ChartError::UnsupportedType(t) if t == "pie"));
    }

    #[test]
    fn test_text_bars_decline_empty() {
        let chart = TextBarChart::new();
        assert!(matches!(
            chart.draw(&spec("bar", &[], &[])),
            Err(ChartError::Empty)
        ));
    }

    #[test]
    fn test_chartjs_config() {
        let config = ChartJs::config(&spec("line", &["a"], &[2.0]));
        assert_eq!(config["type"], "line");
        assert_eq!(config["data"]["labels"][0], "a");
        assert_eq!(config["data"]["datasets"][0]["backgroundColor"], "#1f77b4");
        assert_eq!(config["options"]["scales"]["y"]["beginAtZero"], true);
        assert_eq!(config["options"]["animation"], false);
    }

    #[test]
    fn test_chartjs_drawing_is_escaped_markup() {
        let Drawing::Html(html) = ChartJs.draw(&spec("bar", &["<a>"], &[1.0])).unwrap() else {
            panic!("expected html drawing");
        };
        assert!(html.starts_with("<canvas"));
        assert!(html.contains("&quot;type&quot;"));
        assert!(!html.contains("<a>"));
    }
}
