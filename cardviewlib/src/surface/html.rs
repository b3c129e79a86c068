//! HTML surface.
//!
//! Produces Bootstrap-classed markup, one fragment per presented card. All
//! text coming from payloads is escaped; only `Drawing::Html` from a chart
//! capability is embedded raw.

use super::Surface;
use crate::view::{
    CalloutView, CardView, ChartView, DashboardView, Drawing, Notice, NoticeLevel, TableKind,
    TableView,
};

/// Escape text for use in element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Accumulates markup for presented cards.
#[derive(Debug, Default)]
pub struct HtmlSurface {
    buf: String,
}

impl HtmlSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markup produced so far.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_html(self) -> String {
        self.buf
    }

    fn notice(&mut self, notice: &Notice) {
        let class = match notice.level {
            NoticeLevel::Info => "alert alert-info m-2",
            NoticeLevel::Warning => concat!(
                "alert alert-warning m-2 h-100 d-flex align-items-center ",
                "justify-content-center text-center"
            ),
        };
        self.buf.push_str(&format!(
            "<div class=\"{}\">{}</div>",
            class,
            escape_html(&notice.message)
        ));
    }

    fn table(&mut self, table: &TableView) {
        let striped = match table.kind {
            TableKind::List | TableKind::Matrix => " table-striped",
            TableKind::Flat => "",
        };
        let numeric = table.kind != TableKind::List;

        self.buf.push_str("<div class=\"h-100 d-flex flex-column\">");
        if let Some(title) = &table.title {
            self.buf.push_str(&format!(
                "<h6 class=\"px-2 pt-2 mb-1\">{}</h6>",
                escape_html(title)
            ));
        }
        self.buf.push_str(&format!(
            "<div class=\"table-responsive flex-grow-1\"><table class=\"table table-sm{} mb-0\">",
            striped
        ));

        if !table.headers.is_empty() {
            self.buf.push_str("<thead>");
            if let Some(caption) = &table.caption {
                self.buf.push_str(&format!(
                    "<tr><th></th><th class=\"text-center\" colspan=\"{}\">{}</th></tr>",
                    table.headers.len().saturating_sub(1),
                    escape_html(caption)
                ));
            }
            self.buf.push_str("<tr>");
            for (i, header) in table.headers.iter().enumerate() {
                if numeric && i > 0 {
                    self.buf.push_str("<th class=\"text-end\">");
                } else {
                    self.buf.push_str("<th>");
                }
                self.buf.push_str(&escape_html(header));
                self.buf.push_str("</th>");
            }
            self.buf.push_str("</tr></thead>");
        }

        self.buf.push_str("<tbody>");
        for row in &table.rows {
            self.buf.push_str("<tr>");
            for (i, cell) in row.cells.iter().enumerate() {
                let class = match (table.kind, i) {
                    (TableKind::List, _) => "",
                    (TableKind::Matrix, 0) => " class=\"fw-bold\"",
                    (TableKind::Flat, 0) => "",
                    (TableKind::Matrix, _) => " class=\"text-end\"",
                    (TableKind::Flat, _) => " class=\"text-end fw-bold\"",
                };
                self.buf
                    .push_str(&format!("<td{}>{}</td>", class, escape_html(cell)));
            }
            self.buf.push_str("</tr>");
        }
        self.buf.push_str("</tbody>");

        if let Some(footer) = &table.footer {
            self.buf.push_str("<tfoot><tr class=\"table-light\">");
            for (i, cell) in footer.cells.iter().enumerate() {
                let class = if i == 0 {
                    "fw-bold"
                } else {
                    "text-end fw-bold"
                };
                self.buf.push_str(&format!(
                    "<td class=\"{}\">{}</td>",
                    class,
                    escape_html(cell)
                ));
            }
            self.buf.push_str("</tr></tfoot>");
        }
        self.buf.push_str("</table></div>");

        if let Some(summary) = &table.summary {
            self.buf.push_str(&format!(
                "<div class=\"text-muted small p-2 border-top\">{}</div>",
                escape_html(summary)
            ));
        }
        self.buf.push_str("</div>");
    }

    fn chart(&mut self, chart: &ChartView) {
        self.buf.push_str("<div class=\"p-2 h-100 d-flex flex-column\">");
        if let Some(title) = &chart.title {
            self.buf.push_str(&format!(
                "<div class=\"d-flex align-items-center justify-content-between mb-2\">\
                 <h6 class=\"mb-0\">{}</h6></div>",
                escape_html(title)
            ));
        }
        self.buf
            .push_str("<div class=\"flex-grow-1 position-relative\">");
        match &chart.drawing {
            Drawing::Html(markup) => self.buf.push_str(markup),
            Drawing::Text(text) => self
                .buf
                .push_str(&format!("<pre class=\"mb-0\">{}</pre>", escape_html(text))),
        }
        self.buf.push_str("</div></div>");
    }

    fn callouts(&mut self, view: &CalloutView) {
        self.buf.push_str(
            "<div class=\"text-center p-4 h-100 d-flex flex-column justify-content-center\">",
        );
        if let Some(title) = &view.title {
            self.buf
                .push_str(&format!("<h5 class=\"mb-3\">{}</h5>", escape_html(title)));
        }
        self.buf
            .push_str("<div class=\"row flex-grow-1 align-items-center\">");
        for callout in &view.callouts {
            self.buf.push_str(&format!(
                "<div class=\"col text-center\">\
                 <div class=\"display-4 text-primary mb-2\">{}</div>\
                 <div class=\"small text-muted\">{}</div></div>",
                escape_html(&callout.value),
                escape_html(&callout.label)
            ));
        }
        self.buf.push_str("</div></div>");
    }
}

impl Surface for HtmlSurface {
    fn present(&mut self, view: &CardView) {
        match view {
            CardView::Notice(notice) => self.notice(notice),
            CardView::Table(table) => self.table(table),
            CardView::Chart(chart) => self.chart(chart),
            CardView::Callouts(callouts) => self.callouts(callouts),
        }
    }

    fn present_dashboard(&mut self, dashboard: &DashboardView) {
        self.buf.push_str(&format!(
            "<div class=\"cardview-dashboard\"><h4 class=\"mb-3\">{}</h4><div class=\"row\">",
            escape_html(&dashboard.name)
        ));
        for card in &dashboard.cards {
            self.buf.push_str(&format!(
                "<div class=\"col-md-{} mb-3\"><div class=\"card h-100\">\
                 <div class=\"card-header\"><h5 class=\"card-title mb-0\">{}</h5></div>\
                 <div class=\"card-body p-0\" style=\"height: {}px; overflow: auto;\">\
                 <div id=\"dashboard_item_{}\" class=\"dashboard-item h-100\">",
                card.width,
                escape_html(&card.name),
                card.height,
                card.line_id
            ));
            self.present(&card.view);
            self.buf.push_str("</div></div></div></div>");
        }
        self.buf.push_str("</div></div>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{Callout, Card, TableRow};

    fn list_table() -> TableView {
        TableView {
            kind: TableKind::List,
            title: None,
            caption: None,
            headers: vec!["Name".to_string(), "Partner".to_string()],
            rows: vec![TableRow::new(vec!["a<b".to_string(), "Acme".to_string()])],
            footer: None,
            summary: Some("Total: 1 record(s)".to_string()),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">'&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_list_table_markup() {
        let mut surface = HtmlSurface::new();
        surface.present(&CardView::Table(list_table()));
        let html = surface.into_html();
        assert_eq!(html.matches("<th>").count(), 2);
        assert!(html.contains("<td>a&lt;b</td>"));
        assert!(html.contains("Total: 1 record(s)"));
        assert!(!html.contains("<tfoot>"));
    }

    #[test]
    fn test_info_notice_markup() {
        let mut surface = HtmlSurface::new();
        surface.present(&CardView::Notice(Notice {
            level: NoticeLevel::Info,
            message: "No data to display".to_string(),
        }));
        assert_eq!(
            surface.as_str(),
            "<div class=\"alert alert-info m-2\">No data to display</div>"
        );
    }

    #[test]
    fn test_callouts_keep_order() {
        let mut surface = HtmlSurface::new();
        surface.present(&CardView::Callouts(CalloutView {
            title: Some("Chart".to_string()),
            callouts: vec![
                Callout {
                    value: "1".to_string(),
                    label: "first".to_string(),
                },
                Callout {
                    value: "2".to_string(),
                    label: "second".to_string(),
                },
            ],
        }));
        let html = surface.into_html();
        assert_eq!(html.matches("display-4").count(), 2);
        let first = html.find("first").unwrap();
        let second = html.find("second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_hidden_chart_title() {
        let mut surface = HtmlSurface::new();
        surface.present(&CardView::Callouts(CalloutView {
            title: None,
            callouts: Vec::new(),
        }));
        assert!(!surface.as_str().contains("<h5"));
    }

    #[test]
    fn test_dashboard_grid() {
        let dashboard = DashboardView {
            id: 1,
            name: "Sales".to_string(),
            cards: vec![Card {
                line_id: 7,
                name: "Orders".to_string(),
                width: 4,
                height: 300,
                view: CardView::Table(list_table()),
            }],
        };
        let mut surface = HtmlSurface::new();
        surface.present_dashboard(&dashboard);
        let html = surface.into_html();
        assert!(html.contains("col-md-4"));
        assert!(html.contains("height: 300px"));
        assert!(html.contains("id=\"dashboard_item_7\""));
        assert!(html.contains("<h5 class=\"card-title mb-0\">Orders</h5>"));
    }
}
