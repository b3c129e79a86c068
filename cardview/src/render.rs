//! Terminal rendering of card views using outstanding

use cardviewlib::{
    CalloutView, CardView, ChartView, DashboardView, Drawing, Notice, NoticeLevel, Surface,
    TableKind, TableRow, TableView,
};
use console::Style;
use outstanding::Theme;
use serde::Serialize;

/// Include template at compile time
pub const CARDS_TEMPLATE: &str = include_str!("../templates/cards.jinja");

/// Gap between table columns
const COLUMN_GAP: &str = "  ";

#[derive(Debug, Serialize)]
struct TemplateCallout {
    value: String,
    label: String,
}

/// Context of one card. Only the fields of `kind` are set.
#[derive(Debug, Default, Serialize)]
struct CardContext {
    /// Dashboard line name
    heading: Option<String>,
    kind: &'static str,
    level: Option<&'static str>,
    message: Option<String>,
    title: Option<String>,
    caption: Option<String>,
    /// Pre-padded header line
    header: Option<String>,
    separator: Option<String>,
    /// Pre-padded data lines
    rows: Vec<String>,
    footer: Option<String>,
    summary: Option<String>,
    drawing: Option<String>,
    callouts: Vec<TemplateCallout>,
}

/// Create the theme with styles
pub fn create_theme() -> Theme {
    Theme::new()
        .add("heading", Style::new().bold().underlined())
        .add("title", Style::new().bold())
        .add("header", Style::new().bold())
        .add("total", Style::new().bold())
        .add("value", Style::new().cyan().bold())
        .add("muted", Style::new().dim())
        .add("info", Style::new().blue())
        .add("warning", Style::new().yellow())
}

/// Pad one row: label column left-aligned, the rest right-aligned for
/// numeric tables.
fn pad_row(cells: &[String], widths: &[usize], numeric: bool) -> String {
    cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, width))| {
            if numeric && i > 0 {
                format!("{:>width$}", cell, width = width)
            } else {
                format!("{:<width$}", cell, width = width)
            }
        })
        .collect::<Vec<_>>()
        .join(COLUMN_GAP)
        .trim_end()
        .to_string()
}

/// Column widths over headers, rows and footer, in characters.
fn column_widths(table: &TableView) -> Vec<usize> {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    let lines = table.rows.iter().chain(table.footer.as_ref());
    for row in lines {
        for (i, cell) in row.cells.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }
    widths
}

fn table_context(table: &TableView) -> CardContext {
    let numeric = table.kind != TableKind::List;
    let widths = column_widths(table);
    let total_width =
        widths.iter().sum::<usize>() + COLUMN_GAP.len() * widths.len().saturating_sub(1);
    let pad = |row: &TableRow| pad_row(&row.cells, &widths, numeric);

    CardContext {
        kind: "table",
        title: table.title.clone(),
        caption: table.caption.clone(),
        header: (!table.headers.is_empty()).then(|| pad_row(&table.headers, &widths, numeric)),
        separator: Some("-".repeat(total_width)),
        rows: table.rows.iter().map(pad).collect(),
        footer: table.footer.as_ref().map(pad),
        summary: table.summary.clone(),
        ..CardContext::default()
    }
}

fn notice_context(notice: &Notice) -> CardContext {
    CardContext {
        kind: "notice",
        level: Some(match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
        }),
        message: Some(notice.message.clone()),
        ..CardContext::default()
    }
}

fn chart_context(chart: &ChartView) -> CardContext {
    let drawing = match &chart.drawing {
        Drawing::Text(text) => text.trim_end().to_string(),
        Drawing::Html(_) => "(chart available in HTML output)".to_string(),
    };
    CardContext {
        kind: "chart",
        title: chart.title.clone(),
        drawing: Some(drawing),
        ..CardContext::default()
    }
}

fn callouts_context(view: &CalloutView) -> CardContext {
    CardContext {
        kind: "callouts",
        title: view.title.clone(),
        callouts: view
            .callouts
            .iter()
            .map(|c| TemplateCallout {
                value: c.value.clone(),
                label: c.label.clone(),
            })
            .collect(),
        ..CardContext::default()
    }
}

fn card_context(view: &CardView) -> CardContext {
    match view {
        CardView::Notice(notice) => notice_context(notice),
        CardView::Table(table) => table_context(table),
        CardView::Chart(chart) => chart_context(chart),
        CardView::Callouts(callouts) => callouts_context(callouts),
    }
}

/// Data context for the cards template: either laid-out cards, or markup
/// produced by the HTML surface.
#[derive(Debug, Default, Serialize)]
pub struct CardsContext {
    /// Dashboard name
    title: Option<String>,
    cards: Vec<CardContext>,
    html: Option<String>,
}

impl CardsContext {
    /// Context that passes HTML through the template untouched.
    pub fn html(markup: String) -> Self {
        Self {
            html: Some(markup),
            ..Self::default()
        }
    }
}

/// Surface collecting template contexts for the terminal.
#[derive(Debug, Default)]
pub struct ContextSurface {
    context: CardsContext,
}

impl ContextSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_context(self) -> CardsContext {
        self.context
    }
}

impl Surface for ContextSurface {
    fn present(&mut self, view: &CardView) {
        self.context.cards.push(card_context(view));
    }

    fn present_dashboard(&mut self, dashboard: &DashboardView) {
        self.context.title = Some(dashboard.name.clone());
        for card in &dashboard.cards {
            let mut context = card_context(&card.view);
            context.heading = Some(card.name.clone());
            self.context.cards.push(context);
        }
    }
}
