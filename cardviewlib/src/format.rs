//! Value formatting shared by all result shapes.

use serde_json::{Number, Value};

use crate::options::NumberLocale;

/// Format a pivot cell or total.
///
/// - absent or `null` becomes `"0"`
/// - anything that does not parse as a finite number is passed through as-is
/// - numbers are rounded to the nearest integer (half away from zero) and
///   grouped by thousands according to `locale`
pub fn format_number(value: Option<&Value>, locale: NumberLocale) -> String {
    match value {
        None | Some(Value::Null) => "0".to_string(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => group_thousands(f, locale),
            None => n.to_string(),
        },
        Some(Value::String(s)) => match parse_number(s) {
            Some(f) => group_thousands(f, locale),
            None => s.clone(),
        },
        Some(other) => plain_text(other),
    }
}

/// Round `value` and insert the locale's thousands separator.
pub fn group_thousands(value: f64, locale: NumberLocale) -> String {
    let rounded = value.round();
    if rounded == 0.0 {
        return "0".to_string();
    }
    let digits = format!("{:.0}", rounded.abs());
    let sep = locale.thousands_separator();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * sep.len() + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(ch);
    }
    out
}

/// Numeric reading of a cell used for aggregation. Absent, null and
/// non-numeric values count as zero.
pub fn numeric_value(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_number(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Display text of a list cell.
///
/// Relational values arrive as `[id, display_name]` pairs: the display name
/// wins when present, otherwise the id. Structured values show their
/// `display_name`, then `name`, then their JSON text. Absent, `null` and
/// `false` render as an empty string.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::Array(items)) => {
            let pick = if items.len() > 1 {
                items.get(1)
            } else {
                items.first()
            };
            display_value(pick)
        }
        Some(Value::Object(map)) => {
            for key in ["display_name", "name"] {
                let text = display_value(map.get(key));
                if !text.is_empty() {
                    return text;
                }
            }
            Value::Object(map.clone()).to_string()
        }
        Some(other) => plain_text(other),
    }
}

/// Text of a scalar as it would be printed raw: strings without quotes,
/// whole numbers without a trailing `.0`.
pub fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        other => other.to_string(),
    }
}

/// Print a JSON number the short way.
pub fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}
