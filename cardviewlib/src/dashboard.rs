//! Dashboards: several cards, each backed by a saved filter.
//!
//! A `DashboardController` renders a dashboard definition when it has been
//! configured with a `DashboardStrategy`; without one it stays in plain form
//! mode and renders nothing. The stock strategy, `FetchStrategy`, asks a
//! `FilterSource` for each line's payload and renders it with the shared
//! `ResultRenderer`.
//!
//! Lines are independent. A line without a filter, a failed fetch or a
//! malformed payload only affects its own card.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CardviewError, Issue, NO_FILTER};
use crate::payload::ResultPayload;
use crate::renderer::ResultRenderer;
use crate::surface::Surface;
use crate::view::{Card, CardView, DashboardView};
use crate::Result;

/// Per-line options forwarded to the remote aggregation untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_chart_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_aggregator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot_row_groupby: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot_column_groupby: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot_measures: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot_sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot_sort_order: Option<String>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self == &Overrides::default()
    }
}

fn default_sequence() -> i64 {
    10
}

fn default_width() -> u32 {
    6
}

fn default_height() -> u32 {
    400
}

/// One dashboard line (card).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDefinition {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_sequence")]
    pub sequence: i64,
    /// Grid width in twelfths (1-12)
    #[serde(default = "default_width")]
    pub width: u32,
    /// Card height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub filter_id: Option<i64>,
    #[serde(flatten)]
    pub overrides: Overrides,
}

/// A dashboard as stored: a name and its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardDefinition {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub lines: Vec<LineDefinition>,
}

impl DashboardDefinition {
    /// Load a definition from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CardviewError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| CardviewError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Lines in display order: by sequence, then id.
    pub fn ordered_lines(&self) -> Vec<&LineDefinition> {
        let mut lines: Vec<&LineDefinition> = self.lines.iter().collect();
        lines.sort_by_key(|line| (line.sequence, line.id));
        lines
    }
}

/// Everything the remote side needs to compute one line's results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterRequest {
    pub filter_id: i64,
    pub line_id: i64,
    pub dashboard_id: i64,
    pub overrides: Overrides,
}

/// The collaborator that executes saved filters.
pub trait FilterSource {
    /// Fetch the raw result payload for `request`.
    fn fetch(&self, request: &FilterRequest) -> Result<Value>;
}

impl<F> FilterSource for F
where
    F: Fn(&FilterRequest) -> Result<Value>,
{
    fn fetch(&self, request: &FilterRequest) -> Result<Value> {
        self(request)
    }
}

/// Serves payloads from JSON files in a directory.
///
/// `<filter_id>-<line_id>.json` is preferred when present, so that two lines
/// sharing a filter with different overrides can be told apart; otherwise
/// `<filter_id>.json` is used.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn locate(&self, request: &FilterRequest) -> Option<PathBuf> {
        [
            format!("{}-{}.json", request.filter_id, request.line_id),
            format!("{}.json", request.filter_id),
        ]
        .into_iter()
        .map(|name| self.root.join(name))
        .find(|path| path.is_file())
    }
}

impl FilterSource for DirectorySource {
    fn fetch(&self, request: &FilterRequest) -> Result<Value> {
        let path = self
            .locate(request)
            .ok_or_else(|| CardviewError::PayloadNotFound {
                filter_id: request.filter_id,
                dir: self.root.clone(),
            })?;
        let content = fs::read_to_string(&path).map_err(|source| CardviewError::FileRead {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| CardviewError::Json { path, source })
    }
}

/// How a controller in dashboard mode produces its cards.
pub trait DashboardStrategy {
    fn load(&self, definition: &DashboardDefinition, renderer: &ResultRenderer) -> DashboardView;
}

/// Fetch every line from a `FilterSource` and render it.
#[derive(Debug, Clone)]
pub struct FetchStrategy<S> {
    source: S,
}

impl<S: FilterSource> FetchStrategy<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    fn load_line(
        &self,
        definition: &DashboardDefinition,
        line: &LineDefinition,
        renderer: &ResultRenderer,
    ) -> CardView {
        let Some(filter_id) = line.filter_id else {
            tracing::debug!(line = line.id, "line has no filter");
            return Issue::InvalidShape(NO_FILTER).into_view();
        };

        let request = FilterRequest {
            filter_id,
            line_id: line.id,
            dashboard_id: definition.id,
            overrides: line.overrides.clone(),
        };
        tracing::debug!(filter = filter_id, line = line.id, "fetching filter data");

        match self.source.fetch(&request) {
            Ok(value) => {
                let payload = ResultPayload::from_value(&value);
                tracing::debug!(line = line.id, kind = payload.kind(), "rendering card");
                renderer.view(&payload)
            }
            Err(e) => {
                tracing::warn!(
                    filter = filter_id,
                    line = line.id,
                    error = %e,
                    "failed to load filter data"
                );
                Issue::TransportFailure(e.to_string()).into_view()
            }
        }
    }
}

impl<S: FilterSource> DashboardStrategy for FetchStrategy<S> {
    fn load(&self, definition: &DashboardDefinition, renderer: &ResultRenderer) -> DashboardView {
        let cards = definition
            .ordered_lines()
            .into_iter()
            .map(|line| Card {
                line_id: line.id,
                name: line.name.clone(),
                width: line.width.clamp(1, 12),
                height: line.height,
                view: self.load_line(definition, line, renderer),
            })
            .collect();

        DashboardView {
            id: definition.id,
            name: definition.name.clone(),
            cards,
        }
    }
}

/// A form controller that renders dashboards when given a strategy.
pub struct DashboardController<'a> {
    renderer: ResultRenderer,
    strategy: Option<Box<dyn DashboardStrategy + 'a>>,
}

impl<'a> DashboardController<'a> {
    /// Controller in plain form mode.
    pub fn new(renderer: ResultRenderer) -> Self {
        Self {
            renderer,
            strategy: None,
        }
    }

    /// Builder: switch to dashboard mode with `strategy`.
    pub fn with_strategy(mut self, strategy: impl DashboardStrategy + 'a) -> Self {
        self.strategy = Some(Box::new(strategy));
        self
    }

    pub fn is_dashboard_mode(&self) -> bool {
        self.strategy.is_some()
    }

    pub fn renderer(&self) -> &ResultRenderer {
        &self.renderer
    }

    /// Build the dashboard view. `None` in plain form mode.
    pub fn open(&self, definition: &DashboardDefinition) -> Option<DashboardView> {
        let strategy = self.strategy.as_ref()?;
        tracing::debug!(
            dashboard = definition.id,
            lines = definition.lines.len(),
            "loading dashboard"
        );
        Some(strategy.load(definition, &self.renderer))
    }

    /// Render the dashboard into `target`. Returns whether anything was
    /// rendered.
    pub fn render<T: Surface + ?Sized>(
        &self,
        target: &mut T,
        definition: &DashboardDefinition,
    ) -> bool {
        match self.open(definition) {
            Some(view) => {
                target.present_dashboard(&view);
                true
            }
            None => false,
        }
    }
}
