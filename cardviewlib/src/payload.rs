//! Result payload decoding.
//!
//! Payloads are produced by the remote filter computation and their shape
//! cannot be trusted. `ResultPayload::from_value` reads the JSON exactly once
//! with optional lookups everywhere and yields a tagged union; the renderer
//! then matches on it exhaustively. Malformed parts decode to empty shapes
//! rather than failing.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::format::{display_value, plain_text};

/// A decoded result payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultPayload {
    /// Records with their field descriptors
    List(ListPayload),
    /// One labelled numeric series
    Graph(GraphPayload),
    /// Cross-tabulation, matrix or flat
    Pivot(PivotPayload),
    /// The remote side reported an error. Takes precedence over `type`.
    Error(String),
    /// `type` was missing or not one of the known shapes
    Unsupported(String),
}

/// A list column descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDescriptor {
    /// Plain string: both key and label
    Name(String),
    /// Structured descriptor `{name, string}`
    Described {
        name: Option<String>,
        label: Option<String>,
    },
}

impl FieldDescriptor {
    /// Key used to look the value up in a record.
    pub fn key(&self) -> &str {
        match self {
            FieldDescriptor::Name(name) => name,
            FieldDescriptor::Described { name, .. } => name.as_deref().unwrap_or(""),
        }
    }

    /// Column header text.
    pub fn label(&self) -> &str {
        match self {
            FieldDescriptor::Name(name) => name,
            FieldDescriptor::Described { name, label } => label
                .as_deref()
                .or(name.as_deref())
                .unwrap_or("Unnamed"),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(FieldDescriptor::Name(s.clone())),
            Value::Object(map) => Some(FieldDescriptor::Described {
                name: non_empty_str(map.get("name")),
                label: non_empty_str(map.get("string")),
            }),
            _ => Some(FieldDescriptor::Described {
                name: None,
                label: None,
            }),
        }
    }
}

/// `type = "list"`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListPayload {
    /// Usable field descriptors, nulls already dropped
    pub fields: Vec<FieldDescriptor>,
    /// Records in display order
    pub records: Vec<Map<String, Value>>,
    /// Total matching records on the server (may exceed `records.len()`)
    pub count: Option<i64>,
    /// Whether the summary line is wanted
    pub show_record_count: bool,
}

/// Series background: one color for all points or one per point.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum Background {
    Single(String),
    PerPoint(Vec<String>),
}

/// First dataset of a graph payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub label: Option<String>,
    pub data: Vec<Option<f64>>,
    pub background: Option<Background>,
}

/// `type = "graph"`
#[derive(Debug, Clone, PartialEq)]
pub struct GraphPayload {
    pub chart_type: Option<String>,
    pub labels: Vec<String>,
    pub dataset: Option<Dataset>,
    pub show_legend: bool,
    /// Whether the dataset label is shown as the card title
    pub show_data_title: bool,
}

/// `type = "pivot"`
#[derive(Debug, Clone, PartialEq)]
pub enum PivotPayload {
    Matrix(PivotMatrix),
    Flat(PivotFlat),
}

/// One row of a pivot matrix. Cells keep their raw JSON so that
/// non-numeric values can be shown unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PivotRow {
    pub row: String,
    pub values: Vec<Value>,
    pub row_total: Option<Value>,
}

/// 2-D pivot: measure by row group and column group.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
    pub col_totals: Option<Vec<Value>>,
    pub grand_total: Option<Value>,
    pub measure_label: Option<String>,
    pub row_label: Option<String>,
    pub col_label: Option<String>,
    pub show_data_title: bool,
}

/// 1-D pivot: one value per row group.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotFlat {
    pub entries: Vec<(String, Value)>,
    pub total: Option<Value>,
    pub measure_label: Option<String>,
    pub row_label: Option<String>,
    pub show_data_title: bool,
}

impl ResultPayload {
    /// Decode a payload. Never fails: unusable input maps to the closest
    /// empty shape or to `Unsupported`.
    pub fn from_value(value: &Value) -> Self {
        if let Some(message) = error_message(value.get("error")) {
            return ResultPayload::Error(message);
        }

        let kind = match value.get("type") {
            Some(Value::String(s)) => s.as_str(),
            Some(Value::Null) | None => {
                return ResultPayload::Unsupported("undefined".to_string())
            }
            Some(other) => return ResultPayload::Unsupported(plain_text(other)),
        };

        match kind {
            "list" => ResultPayload::List(decode_list(value)),
            "graph" => ResultPayload::Graph(decode_graph(value)),
            "pivot" => ResultPayload::Pivot(decode_pivot(value)),
            other => ResultPayload::Unsupported(other.to_string()),
        }
    }

    /// Short name of the decoded shape, for logging.
    pub fn kind(&self) -> &str {
        match self {
            ResultPayload::List(_) => "list",
            ResultPayload::Graph(_) => "graph",
            ResultPayload::Pivot(_) => "pivot",
            ResultPayload::Error(_) => "error",
            ResultPayload::Unsupported(kind) => kind,
        }
    }
}

impl<'de> Deserialize<'de> for ResultPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(ResultPayload::from_value(&value))
    }
}

/// An error field counts when it is truthy.
fn error_message(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(plain_text(other)),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn array<'a>(value: Option<&'a Value>) -> &'a [Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn flag(value: Option<&Value>, default: bool) -> bool {
    value.and_then(Value::as_bool).unwrap_or(default)
}

fn decode_list(value: &Value) -> ListPayload {
    let fields = array(value.get("fields"))
        .iter()
        .filter_map(FieldDescriptor::from_value)
        .collect();
    let records = array(value.get("data"))
        .iter()
        .map(|record| record.as_object().cloned().unwrap_or_default())
        .collect();

    ListPayload {
        fields,
        records,
        count: record_count(value.get("count")),
        show_record_count: flag(value.get("show_record_count"), true),
    }
}

/// Any finite number is a count; `42.0` is as good as `42`.
fn record_count(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        _ => None,
    }
}

fn decode_graph(value: &Value) -> GraphPayload {
    let data = value.get("data");
    let labels = array(data.and_then(|d| d.get("labels")))
        .iter()
        .map(|label| display_value(Some(label)))
        .collect();
    let dataset = array(data.and_then(|d| d.get("datasets")))
        .first()
        .filter(|d| d.is_object())
        .map(decode_dataset);

    GraphPayload {
        chart_type: non_empty_str(value.get("chart_type")),
        labels,
        dataset,
        show_legend: flag(value.get("show_legend"), true),
        show_data_title: flag(value.get("show_data_title"), true),
    }
}

fn decode_dataset(value: &Value) -> Dataset {
    let background = match value.get("backgroundColor") {
        Some(Value::String(s)) if !s.is_empty() => Some(Background::Single(s.clone())),
        Some(Value::Array(colors)) if !colors.is_empty() => Some(Background::PerPoint(
            colors.iter().map(plain_text).collect(),
        )),
        _ => None,
    };

    Dataset {
        label: non_empty_str(value.get("label")),
        data: array(value.get("data"))
            .iter()
            .map(|v| match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            })
            .collect(),
        background,
    }
}

fn decode_pivot(value: &Value) -> PivotPayload {
    let is_matrix = |v: &Value| {
        v.get("columns").is_some_and(Value::is_array) && v.get("rows").is_some_and(Value::is_array)
    };

    let nested = value.get("data").filter(|d| is_matrix(d));
    match nested.or_else(|| Some(value).filter(|v| is_matrix(v))) {
        Some(container) => PivotPayload::Matrix(decode_matrix(container, value)),
        None => PivotPayload::Flat(decode_flat(value)),
    }
}

/// Read a key from the matrix container first, then from the payload root.
fn lookup<'a>(container: &'a Value, root: &'a Value, key: &str) -> Option<&'a Value> {
    container
        .get(key)
        .filter(|v| !v.is_null())
        .or_else(|| root.get(key).filter(|v| !v.is_null()))
}

fn decode_matrix(container: &Value, root: &Value) -> PivotMatrix {
    let columns = array(container.get("columns"))
        .iter()
        .map(|c| match c {
            Value::Object(map) => display_value(map.get("label")),
            other => display_value(Some(other)),
        })
        .collect();
    let rows = array(container.get("rows"))
        .iter()
        .map(|r| PivotRow {
            row: display_value(r.get("row")),
            values: array(r.get("values")).to_vec(),
            row_total: r.get("row_total").filter(|v| !v.is_null()).cloned(),
        })
        .collect();

    PivotMatrix {
        columns,
        rows,
        col_totals: lookup(container, root, "col_totals")
            .and_then(Value::as_array)
            .cloned(),
        grand_total: lookup(container, root, "grand_total").cloned(),
        measure_label: non_empty_str(lookup(container, root, "measure_label")),
        row_label: non_empty_str(lookup(container, root, "row_label")),
        col_label: non_empty_str(lookup(container, root, "col_label")),
        show_data_title: flag(lookup(container, root, "show_data_title"), true),
    }
}

fn decode_flat(value: &Value) -> PivotFlat {
    let entries = array(value.get("data"))
        .iter()
        .filter(|e| e.is_object())
        .map(|e| {
            (
                display_value(e.get("row")),
                e.get("value").cloned().unwrap_or(Value::Null),
            )
        })
        .collect();
    let total = value
        .get("total")
        .filter(|v| !v.is_null())
        .or_else(|| value.get("grand_total").filter(|v| !v.is_null()))
        .cloned();

    PivotFlat {
        entries,
        total,
        measure_label: non_empty_str(value.get("measure_label")),
        row_label: non_empty_str(value.get("row_label")),
        show_data_title: flag(value.get("show_data_title"), true),
    }
}
