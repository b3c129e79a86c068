//! The result renderer: payload in, card view out.
//!
//! Dispatch is strictly on the decoded payload shape. An upstream error wins
//! over everything; unknown shapes become an "Unsupported data type" notice.
//! Every malformed or empty input degrades to a notice, so rendering one card
//! can never take the page down.

use serde_json::Value;

use crate::chart::{ChartCapability, ChartOptions, ChartSpec, Series};
use crate::error::{Issue, NO_CHART_DATA, NO_DATA, NO_FIELDS};
use crate::format::{display_value, format_number, number_text, numeric_value};
use crate::options::RenderOptions;
use crate::payload::{
    Background, GraphPayload, ListPayload, PivotFlat, PivotMatrix, PivotPayload, ResultPayload,
};
use crate::surface::Surface;
use crate::view::{
    Callout, CalloutView, CardView, ChartView, TableKind, TableRow, TableView,
};

/// Title of a graph whose dataset has no label.
pub const DEFAULT_CHART_TITLE: &str = "Chart";
/// Chart type used when the payload does not name one.
pub const DEFAULT_CHART_TYPE: &str = "bar";
/// Value column header of a flat pivot without a measure label.
pub const DEFAULT_MEASURE_HEADER: &str = "Value";

/// Turns result payloads into card views.
///
/// The chart capability is fixed at construction; without one, graphs are
/// shown as numeric callouts.
pub struct ResultRenderer {
    options: RenderOptions,
    chart: Option<Box<dyn ChartCapability>>,
}

impl Default for ResultRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl std::fmt::Debug for ResultRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultRenderer")
            .field("options", &self.options)
            .field("chart", &self.chart.as_ref().map(|c| c.name()))
            .finish()
    }
}

impl ResultRenderer {
    /// Renderer without a chart capability.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            chart: None,
        }
    }

    /// Builder: supply a chart capability.
    pub fn with_chart(mut self, chart: impl ChartCapability + 'static) -> Self {
        self.chart = Some(Box::new(chart));
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Whether graphs will be drawn rather than shown as callouts.
    pub fn has_chart(&self) -> bool {
        self.chart.is_some()
    }

    /// Render `payload` into `target`.
    pub fn render<S: Surface + ?Sized>(&self, target: &mut S, payload: &ResultPayload) {
        target.present(&self.view(payload));
    }

    /// Decode raw JSON and render it into `target`.
    pub fn render_value<S: Surface + ?Sized>(&self, target: &mut S, value: &Value) {
        self.render(target, &ResultPayload::from_value(value));
    }

    /// Build the view for `payload` without presenting it.
    pub fn view(&self, payload: &ResultPayload) -> CardView {
        let result = match payload {
            ResultPayload::Error(message) => Err(Issue::UpstreamError(message.clone())),
            ResultPayload::Unsupported(kind) => Err(Issue::UnsupportedType(kind.clone())),
            ResultPayload::List(list) => self.list(list),
            ResultPayload::Graph(graph) => self.graph(graph),
            ResultPayload::Pivot(PivotPayload::Matrix(matrix)) => self.matrix(matrix),
            ResultPayload::Pivot(PivotPayload::Flat(flat)) => self.flat(flat),
        };

        result.unwrap_or_else(|issue| {
            tracing::debug!(kind = payload.kind(), issue = %issue, "rendering notice");
            issue.into_view()
        })
    }

    fn list(&self, list: &ListPayload) -> Result<CardView, Issue> {
        if list.records.is_empty() {
            return Err(Issue::EmptyData(NO_DATA));
        }
        if list.fields.is_empty() {
            return Err(Issue::InvalidShape(NO_FIELDS));
        }

        let headers = list.fields.iter().map(|f| f.label().to_string()).collect();
        let rows = list
            .records
            .iter()
            .map(|record| {
                TableRow::new(
                    list.fields
                        .iter()
                        .map(|f| display_value(record.get(f.key())))
                        .collect(),
                )
            })
            .collect();
        let summary = list.show_record_count.then(|| {
            let count = list.count.unwrap_or(list.records.len() as i64);
            format!("Total: {} record(s)", count)
        });

        Ok(CardView::Table(TableView {
            kind: TableKind::List,
            title: None,
            caption: None,
            headers,
            rows,
            footer: None,
            summary,
        }))
    }

    fn graph(&self, graph: &GraphPayload) -> Result<CardView, Issue> {
        let dataset = graph
            .dataset
            .as_ref()
            .ok_or(Issue::EmptyData(NO_CHART_DATA))?;
        let label = dataset
            .label
            .clone()
            .unwrap_or_else(|| DEFAULT_CHART_TITLE.to_string());
        let title = graph.show_data_title.then(|| label.clone());

        if let Some(chart) = &self.chart {
            let spec = ChartSpec {
                chart_type: graph
                    .chart_type
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CHART_TYPE.to_string()),
                labels: graph.labels.clone(),
                series: Series {
                    label,
                    data: dataset.data.clone(),
                    background: dataset
                        .background
                        .clone()
                        .unwrap_or_else(|| Background::Single(self.options.default_color.clone())),
                },
                options: ChartOptions {
                    show_legend: graph.show_legend,
                    ..ChartOptions::default()
                },
            };
            match chart.draw(&spec) {
                Ok(drawing) => {
                    return Ok(CardView::Chart(ChartView {
                        title,
                        spec,
                        drawing,
                    }))
                }
                Err(e) => {
                    tracing::debug!(
                        backend = chart.name(),
                        error = %e,
                        "chart declined, using callouts"
                    );
                }
            }
        }

        let callouts = graph
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| Callout {
                value: dataset
                    .data
                    .get(i)
                    .copied()
                    .flatten()
                    .and_then(serde_json::Number::from_f64)
                    .map(|n| number_text(&n))
                    .unwrap_or_default(),
                label: label.clone(),
            })
            .collect();

        Ok(CardView::Callouts(CalloutView { title, callouts }))
    }

    fn matrix(&self, matrix: &PivotMatrix) -> Result<CardView, Issue> {
        if matrix.rows.is_empty() {
            return Err(Issue::EmptyData(NO_DATA));
        }
        let locale = self.options.locale;
        let show_row_totals = matrix.rows.iter().any(|r| r.row_total.is_some());

        let mut headers = Vec::with_capacity(matrix.columns.len() + 2);
        headers.push(
            matrix
                .row_label
                .clone()
                .unwrap_or_else(|| self.options.row_header.clone()),
        );
        headers.extend(matrix.columns.iter().cloned());
        if show_row_totals {
            headers.push("Total".to_string());
        }

        let rows = matrix
            .rows
            .iter()
            .map(|r| {
                let mut cells = Vec::with_capacity(matrix.columns.len() + 2);
                cells.push(r.row.clone());
                cells.extend(
                    (0..matrix.columns.len()).map(|i| format_number(r.values.get(i), locale)),
                );
                if show_row_totals {
                    let total = match &r.row_total {
                        Some(total) => format_number(Some(total), locale),
                        None => {
                            let sum: f64 = r
                                .values
                                .iter()
                                .take(matrix.columns.len())
                                .map(|v| numeric_value(Some(v)))
                                .sum();
                            format_number(Some(&Value::from(sum)), locale)
                        }
                    };
                    cells.push(total);
                }
                TableRow::new(cells)
            })
            .collect();

        let footer = matrix.col_totals.as_ref().map(|col_totals| {
            let mut cells = Vec::with_capacity(matrix.columns.len() + 2);
            cells.push("Total".to_string());
            cells.extend(
                (0..matrix.columns.len()).map(|i| format_number(col_totals.get(i), locale)),
            );
            if show_row_totals {
                let grand = match &matrix.grand_total {
                    Some(grand) => format_number(Some(grand), locale),
                    None => {
                        let sum: f64 = col_totals.iter().map(|v| numeric_value(Some(v))).sum();
                        format_number(Some(&Value::from(sum)), locale)
                    }
                };
                cells.push(grand);
            }
            TableRow::new(cells)
        });

        Ok(CardView::Table(TableView {
            kind: TableKind::Matrix,
            title: matrix
                .measure_label
                .clone()
                .filter(|_| matrix.show_data_title),
            caption: matrix.col_label.clone(),
            headers,
            rows,
            footer,
            summary: None,
        }))
    }

    fn flat(&self, flat: &PivotFlat) -> Result<CardView, Issue> {
        if flat.entries.is_empty() {
            return Err(Issue::EmptyData(NO_DATA));
        }
        let locale = self.options.locale;

        let rows = flat
            .entries
            .iter()
            .map(|(label, value)| {
                TableRow::new(vec![label.clone(), format_number(Some(value), locale)])
            })
            .collect();
        let footer = flat.total.as_ref().map(|total| {
            TableRow::new(vec!["Total".to_string(), format_number(Some(total), locale)])
        });
        let headers = if flat.measure_label.is_some() || flat.row_label.is_some() {
            vec![
                flat.row_label
                    .clone()
                    .unwrap_or_else(|| self.options.row_header.clone()),
                flat.measure_label
                    .clone()
                    .unwrap_or_else(|| DEFAULT_MEASURE_HEADER.to_string()),
            ]
        } else {
            Vec::new()
        };

        Ok(CardView::Table(TableView {
            kind: TableKind::Flat,
            title: flat.measure_label.clone().filter(|_| flat.show_data_title),
            caption: None,
            headers,
            rows,
            footer,
            summary: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartError, TextBarChart};
    use crate::surface::HtmlSurface;
    use crate::view::{Drawing, Notice, NoticeLevel};
    use serde_json::json;

    fn view_of(value: Value) -> CardView {
        ResultRenderer::default().view(&ResultPayload::from_value(&value))
    }

    fn table_of(value: Value) -> TableView {
        match view_of(value) {
            CardView::Table(table) => table,
            other => panic!("expected table, got {:?}", other),
        }
    }

    fn notice(level: NoticeLevel, message: &str) -> CardView {
        CardView::Notice(Notice {
            level,
            message: message.to_string(),
        })
    }

    struct Refusing;

    impl ChartCapability for Refusing {
        fn name(&self) -> &str {
            "refusing"
        }

        fn draw(&self, _spec: &ChartSpec) -> Result<Drawing, ChartError> {
            Err(ChartError::Empty)
        }
    }

    // -- dispatch --------------------------------------------------------

    #[test]
    fn test_error_wins_over_type() {
        for kind in ["list", "graph", "pivot", "kanban"] {
            assert_eq!(
                view_of(json!({"type": kind, "error": "boom"})),
                notice(NoticeLevel::Warning, "boom")
            );
        }
    }

    #[test]
    fn test_unsupported_type() {
        assert_eq!(
            view_of(json!({"type": "kanban"})),
            notice(NoticeLevel::Warning, "Unsupported data type: kanban")
        );
    }

    #[test]
    fn test_render_into_surface() {
        let mut surface = HtmlSurface::new();
        ResultRenderer::default().render_value(&mut surface, &json!({"type": "kanban"}));
        assert!(surface.as_str().contains(">Unsupported data type: kanban</div>"));
    }

    // -- list ------------------------------------------------------------

    #[test]
    fn test_list_empty_data() {
        assert_eq!(
            view_of(json!({"type": "list", "fields": ["name"], "data": []})),
            notice(NoticeLevel::Info, NO_DATA)
        );
        assert_eq!(
            view_of(json!({"type": "list", "fields": ["name"]})),
            notice(NoticeLevel::Info, NO_DATA)
        );
    }

    #[test]
    fn test_list_empty_data_has_no_table_markup() {
        let mut surface = HtmlSurface::new();
        ResultRenderer::default()
            .render_value(&mut surface, &json!({"type": "list", "data": []}));
        assert!(!surface.as_str().contains("<table"));
    }

    #[test]
    fn test_list_without_usable_fields() {
        assert_eq!(
            view_of(json!({"type": "list", "fields": [null], "data": [{"a": 1}]})),
            notice(NoticeLevel::Warning, NO_FIELDS)
        );
    }

    #[test]
    fn test_list_headers_match_non_null_fields() {
        let table = table_of(json!({
            "type": "list",
            "fields": ["name", null, {"name": "partner_id", "string": "Partner"}, {"name": "qty"}],
            "data": [{"name": "A"}],
            "count": 1
        }));
        assert_eq!(table.headers, vec!["name", "Partner", "qty"]);
        assert_eq!(table.rows[0].cells.len(), 3);
    }

    #[test]
    fn test_list_cells() {
        let table = table_of(json!({
            "type": "list",
            "fields": [
                {"name": "name"},
                {"name": "partner_id"},
                {"name": "user_id"},
                {"name": "active"},
                {"name": "note"},
                {"name": "missing"}
            ],
            "data": [{
                "name": "SO001",
                "partner_id": [3, "Acme"],
                "user_id": [4],
                "active": false,
                "note": null
            }],
            "count": 1
        }));
        assert_eq!(table.rows[0].cells, vec!["SO001", "Acme", "4", "", "", ""]);
    }

    #[test]
    fn test_list_count_comes_from_payload() {
        let table = table_of(json!({
            "type": "list",
            "fields": ["name"],
            "data": [{"name": "a"}, {"name": "b"}],
            "count": 250
        }));
        assert_eq!(table.summary.as_deref(), Some("Total: 250 record(s)"));
    }

    #[test]
    fn test_list_float_count_is_used() {
        let table = table_of(json!({
            "type": "list",
            "fields": ["name"],
            "data": [{"name": "a"}],
            "count": 42.0
        }));
        assert_eq!(table.summary.as_deref(), Some("Total: 42 record(s)"));
    }

    #[test]
    fn test_list_summary_can_be_hidden() {
        let table = table_of(json!({
            "type": "list",
            "fields": ["name"],
            "data": [{"name": "a"}],
            "show_record_count": false
        }));
        assert!(table.summary.is_none());
    }

    // -- graph -----------------------------------------------------------

    fn graph_payload() -> Value {
        json!({
            "type": "graph",
            "data": {
                "labels": ["Jan", "Feb", "Mar"],
                "datasets": [{"label": "Orders", "data": [3, 7.5, 12]}]
            }
        })
    }

    #[test]
    fn test_graph_without_dataset() {
        assert_eq!(
            view_of(json!({"type": "graph", "data": {"labels": ["a"], "datasets": []}})),
            notice(NoticeLevel::Info, NO_CHART_DATA)
        );
    }

    #[test]
    fn test_graph_callouts_without_capability() {
        let CardView::Callouts(view) = view_of(graph_payload()) else {
            panic!("expected callouts");
        };
        assert_eq!(view.title.as_deref(), Some("Orders"));
        assert_eq!(view.callouts.len(), 3);
        assert_eq!(view.callouts[0].label, "Jan");
        assert_eq!(view.callouts[0].value, "3");
        assert_eq!(view.callouts[1].value, "7.5");
        assert_eq!(view.callouts[2].label, "Mar");
        assert_eq!(view.callouts[2].value, "12");
    }

    #[test]
    fn test_graph_default_title() {
        let CardView::Callouts(view) = view_of(json!({
            "type": "graph",
            "data": {"labels": ["a"], "datasets": [{"data": [1]}]}
        })) else {
            panic!("expected callouts");
        };
        assert_eq!(view.title.as_deref(), Some("Chart"));
    }

    #[test]
    fn test_graph_hidden_data_title() {
        let mut payload = graph_payload();
        payload["show_data_title"] = json!(false);

        let CardView::Callouts(view) = view_of(payload.clone()) else {
            panic!("expected callouts");
        };
        assert!(view.title.is_none());

        let renderer = ResultRenderer::default().with_chart(TextBarChart::new());
        let CardView::Chart(chart) = renderer.view(&ResultPayload::from_value(&payload)) else {
            panic!("expected chart");
        };
        assert!(chart.title.is_none());
        assert_eq!(chart.spec.series.label, "Orders");
    }

    #[test]
    fn test_graph_with_capability() {
        let renderer = ResultRenderer::default().with_chart(TextBarChart::new());
        assert!(renderer.has_chart());
        let CardView::Chart(chart) = renderer.view(&ResultPayload::from_value(&graph_payload()))
        else {
            panic!("expected chart");
        };
        assert_eq!(chart.spec.chart_type, "bar");
        assert_eq!(
            chart.spec.series.background,
            Background::Single("#1f77b4".to_string())
        );
        assert!(chart.spec.options.begin_at_zero);
        assert!(!chart.spec.options.animated);
        assert!(matches!(chart.drawing, Drawing::Text(_)));
    }

    #[test]
    fn test_graph_falls_back_when_capability_declines() {
        let renderer = ResultRenderer::default().with_chart(Refusing);
        let view = renderer.view(&ResultPayload::from_value(&graph_payload()));
        assert!(matches!(view, CardView::Callouts(v) if v.callouts.len() == 3));
    }

    // -- pivot -----------------------------------------------------------

    #[test]
    fn test_matrix_without_col_totals_has_no_footer() {
        let table = table_of(json!({
            "type": "pivot",
            "data": {
                "columns": [{"label": "Q1"}, {"label": "Q2"}],
                "rows": [{"row": "East", "values": [1000, 2000.4]}]
            }
        }));
        assert!(table.footer.is_none());
        assert_eq!(table.headers, vec!["Rows", "Q1", "Q2"]);
        assert_eq!(table.rows[0].cells, vec!["East", "1,000", "2,000"]);
    }

    #[test]
    fn test_matrix_row_totals_when_any_row_has_one() {
        let table = table_of(json!({
            "type": "pivot",
            "row_label": "Region",
            "data": {
                "columns": [{"label": "Q1"}, {"label": "Q2"}],
                "rows": [
                    {"row": "East", "values": [1, 2], "row_total": 10},
                    {"row": "West", "values": [3, null]}
                ]
            }
        }));
        assert_eq!(table.headers, vec!["Region", "Q1", "Q2", "Total"]);
        assert_eq!(table.rows[0].cells, vec!["East", "1", "2", "10"]);
        assert_eq!(table.rows[1].cells, vec!["West", "3", "0", "3"]);
    }

    #[test]
    fn test_matrix_row_sum_ignores_undisplayed_cells() {
        let table = table_of(json!({
            "type": "pivot",
            "data": {
                "columns": [{"label": "Q1"}],
                "rows": [
                    {"row": "East", "values": [5], "row_total": 5},
                    {"row": "West", "values": [3, 400]}
                ]
            }
        }));
        assert_eq!(table.rows[1].cells, vec!["West", "3", "3"]);
    }

    #[test]
    fn test_matrix_footer_and_grand_total() {
        let table = table_of(json!({
            "type": "pivot",
            "data": {
                "columns": [{"label": "Q1"}, {"label": "Q2"}],
                "rows": [{"row": "East", "values": [1500, 2500], "row_total": 4000}],
                "col_totals": [1500, 2500]
            }
        }));
        let footer = table.footer.unwrap();
        assert_eq!(footer.cells, vec!["Total", "1,500", "2,500", "4,000"]);

        let table = table_of(json!({
            "type": "pivot",
            "data": {
                "columns": [{"label": "Q1"}],
                "rows": [{"row": "East", "values": [1], "row_total": 1}],
                "col_totals": [1],
                "grand_total": 99
            }
        }));
        assert_eq!(table.footer.unwrap().cells, vec!["Total", "1", "99"]);
    }

    #[test]
    fn test_matrix_footer_without_row_totals_has_no_grand_cell() {
        let table = table_of(json!({
            "type": "pivot",
            "data": {
                "columns": [{"label": "Q1"}],
                "rows": [{"row": "East", "values": [1]}],
                "col_totals": [1],
                "grand_total": 1
            }
        }));
        assert_eq!(table.footer.unwrap().cells, vec!["Total", "1"]);
    }

    #[test]
    fn test_matrix_labels() {
        let table = table_of(json!({
            "type": "pivot",
            "measure_label": "Amount",
            "col_label": "Quarter",
            "data": {"columns": [], "rows": [{"row": "East", "values": []}]}
        }));
        assert_eq!(table.title.as_deref(), Some("Amount"));
        assert_eq!(table.caption.as_deref(), Some("Quarter"));
    }

    #[test]
    fn test_matrix_hidden_data_title() {
        let table = table_of(json!({
            "type": "pivot",
            "measure_label": "Amount",
            "show_data_title": false,
            "data": {"columns": [], "rows": [{"row": "East", "values": []}]}
        }));
        assert!(table.title.is_none());
    }

    #[test]
    fn test_matrix_custom_row_header() {
        let renderer = ResultRenderer::new(RenderOptions::new().row_header("Lignes"));
        let payload = ResultPayload::from_value(&json!({
            "type": "pivot",
            "data": {"columns": [{"label": "Q1"}], "rows": [{"row": "East", "values": [1]}]}
        }));
        let CardView::Table(table) = renderer.view(&payload) else {
            panic!("expected table");
        };
        assert_eq!(table.headers[0], "Lignes");
    }

    #[test]
    fn test_flat_pivot_total_only_when_supplied() {
        let table = table_of(json!({
            "type": "pivot",
            "data": [{"row": "A", "value": 1234.5}, {"row": "B", "value": "n/a"}]
        }));
        assert_eq!(table.rows[0].cells, vec!["A", "1,235"]);
        assert_eq!(table.rows[1].cells, vec!["B", "n/a"]);
        assert!(table.footer.is_none());

        let table = table_of(json!({
            "type": "pivot",
            "data": [{"row": "A", "value": 1}],
            "total": 5000
        }));
        assert_eq!(table.footer.unwrap().cells, vec!["Total", "5,000"]);
    }

    #[test]
    fn test_flat_pivot_labels() {
        let table = table_of(json!({
            "type": "pivot",
            "data": [{"row": "Mitchell", "value": 1200}],
            "measure_label": "Untaxed Amount",
            "row_label": "Salesperson"
        }));
        assert_eq!(table.title.as_deref(), Some("Untaxed Amount"));
        assert_eq!(table.headers, vec!["Salesperson", "Untaxed Amount"]);

        let table = table_of(json!({
            "type": "pivot",
            "data": [{"row": "Mitchell", "value": 1200}],
            "measure_label": "Untaxed Amount",
            "show_data_title": false
        }));
        assert!(table.title.is_none());
        assert_eq!(table.headers, vec!["Rows", "Untaxed Amount"]);
    }

    #[test]
    fn test_empty_pivot() {
        assert_eq!(
            view_of(json!({"type": "pivot", "data": []})),
            notice(NoticeLevel::Info, NO_DATA)
        );
        assert_eq!(
            view_of(json!({"type": "pivot"})),
            notice(NoticeLevel::Info, NO_DATA)
        );
    }
}
