//! # cardviewlib
//!
//! Renders dashboard cards from the result payloads of saved filters.
//!
//! ## Overview
//!
//! A dashboard card shows the results of one saved filter, computed by a
//! remote collaborator and returned as a tagged JSON payload. This library
//! turns such payloads into presentation-ready views:
//!
//! - **list**: a table of records, with relational values resolved to their
//!   display names and a record-count summary
//! - **graph**: a chart drawn by an optional chart capability, or numeric
//!   callouts when none is available
//! - **pivot**: a matrix (with optional row/column totals) or a flat
//!   label → value table, numbers grouped by thousands
//! - **error**: the upstream message, shown verbatim
//!
//! Nothing here panics or fails on bad input: malformed payloads degrade to
//! an inline notice for that card only.
//!
//! ## Pipeline
//!
//! 1. `ResultPayload::from_value` decodes the JSON once into a tagged union
//! 2. `ResultRenderer::view` builds a `CardView` (formatted strings only)
//! 3. a `Surface` (HTML, JSON, or a terminal surface provided by the CLI)
//!    lays the view out
//!
//! ## Example
//!
//! ```rust
//! use cardviewlib::{HtmlSurface, RenderOptions, ResultRenderer};
//! use serde_json::json;
//!
//! let renderer = ResultRenderer::new(RenderOptions::new());
//! let mut surface = HtmlSurface::new();
//!
//! renderer.render_value(&mut surface, &json!({
//!     "type": "pivot",
//!     "data": [{"row": "East", "value": 1234.6}],
//!     "total": 1234.6
//! }));
//!
//! assert!(surface.as_str().contains("1,235"));
//! ```

pub mod chart;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod options;
pub mod payload;
pub mod renderer;
pub mod surface;
pub mod view;

pub use chart::{
    ChartCapability, ChartError, ChartJs, ChartOptions, ChartSpec, Series, TextBarChart,
};
pub use dashboard::{
    DashboardController, DashboardDefinition, DashboardStrategy, DirectorySource, FetchStrategy,
    FilterRequest, FilterSource, LineDefinition, Overrides,
};
pub use error::{CardviewError, Issue};
pub use format::{display_value, format_number};
pub use options::{NumberLocale, RenderOptions};
pub use payload::{
    Background, Dataset, FieldDescriptor, GraphPayload, ListPayload, PivotFlat, PivotMatrix,
    PivotPayload, PivotRow, ResultPayload,
};
pub use renderer::ResultRenderer;
pub use surface::{HtmlSurface, JsonSurface, Surface};
pub use view::{
    Callout, CalloutView, Card, CardView, ChartView, DashboardView, Drawing, Notice, NoticeLevel,
    TableKind, TableRow, TableView,
};

/// Result type for cardviewlib operations
pub type Result<T> = std::result::Result<T, CardviewError>;
