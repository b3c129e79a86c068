//! Presentation-ready card views.
//!
//! A `CardView` is what the renderer produces from a payload: every string is
//! already formatted, so surfaces only lay things out. Views serialize to
//! JSON as-is.

use serde::Serialize;

use crate::chart::ChartSpec;

/// The content of one card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardView {
    /// A message in place of data (empty state, warning, error)
    Notice(Notice),
    /// List or pivot table
    Table(TableView),
    /// Chart drawn by a chart capability
    Chart(ChartView),
    /// Large-number fallback when no chart could be drawn
    Callouts(CalloutView),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Which result shape a table came from. Surfaces use it for alignment and
/// emphasis: pivot tables have a bold label column and right-aligned numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    List,
    Matrix,
    Flat,
}

/// A single row (data row or footer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// Cell texts, one per header
    pub cells: Vec<String>,
}

impl TableRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }
}

/// Table-ready data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub kind: TableKind,
    /// Measure label of a pivot, unless hidden by the payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Caption over the column headers (pivot column grouping)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Empty for headerless tables
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    /// Totals row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<TableRow>,
    /// Line under the table (e.g. "Total: 12 record(s)")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Output of a chart capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "format", content = "content", rename_all = "snake_case")]
pub enum Drawing {
    /// Preformatted text, shown verbatim
    Text(String),
    /// Markup to embed without escaping
    Html(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    /// Absent when the payload hides the data title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub spec: ChartSpec,
    pub drawing: Drawing,
}

/// One big number with its label beneath.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Callout {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalloutView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub callouts: Vec<Callout>,
}

/// One rendered dashboard line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub line_id: i64,
    pub name: String,
    /// Grid width in twelfths
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    pub view: CardView,
}

/// A whole rendered dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub id: i64,
    pub name: String,
    pub cards: Vec<Card>,
}
