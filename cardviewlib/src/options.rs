//! Rendering options.
//!
//! Everything here is presentation configuration: none of it changes which
//! data the remote side computes (that is what `Overrides` are for).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CardviewError;

/// Default series color when a graph payload carries none.
pub const DEFAULT_CHART_COLOR: &str = "#1f77b4";

/// Default header of the row-label column of a pivot matrix.
pub const DEFAULT_ROW_HEADER: &str = "Rows";

/// Thousands grouping used when formatting pivot numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberLocale {
    /// `1,234,567`
    #[default]
    En,
    /// `1 234 567` with a narrow no-break space
    Fr,
    /// `1234567`
    Plain,
}

impl NumberLocale {
    /// Separator inserted between groups of three digits.
    pub fn thousands_separator(&self) -> &'static str {
        match self {
            NumberLocale::En => ",",
            NumberLocale::Fr => "\u{202f}",
            NumberLocale::Plain => "",
        }
    }
}

impl FromStr for NumberLocale {
    type Err = CardviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "en_us" | "en-us" => Ok(NumberLocale::En),
            "fr" | "fr_fr" | "fr-fr" => Ok(NumberLocale::Fr),
            "plain" | "none" => Ok(NumberLocale::Plain),
            _ => Err(CardviewError::InvalidOption {
                option: "locale",
                value: s.to_string(),
            }),
        }
    }
}

/// Options controlling how payloads become views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Number grouping for pivot cells and totals
    pub locale: NumberLocale,
    /// Series color used when the payload has none
    pub default_color: String,
    /// Placeholder header for the pivot row-label column
    pub row_header: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            locale: NumberLocale::default(),
            default_color: DEFAULT_CHART_COLOR.to_string(),
            row_header: DEFAULT_ROW_HEADER.to_string(),
        }
    }
}

impl RenderOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the number locale
    pub fn locale(mut self, locale: NumberLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Builder: set the fallback series color
    pub fn default_color(mut self, color: impl Into<String>) -> Self {
        self.default_color = color.into();
        self
    }

    /// Builder: set the pivot row header placeholder
    pub fn row_header(mut self, header: impl Into<String>) -> Self {
        self.row_header = header.into();
        self
    }
}
